use bevy::{input::mouse::MouseMotion, prelude::*};
use serde::Deserialize;

/// Pitch is clamped to this many degrees either side of the horizon.
pub const PITCH_LIMIT: f32 = 90.0;

pub struct FlyCameraPlugin;

impl Plugin for FlyCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, fly_camera_system.in_set(FlyCameraSet));
    }
}

/// System set containing the camera update, so gameplay systems can order
/// themselves after the camera has moved for the frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlyCameraSet;

/// Free-fly camera state and settings, placed on the camera entity.
///
/// Controls:
/// - Right-click + drag: look around (yaw/pitch)
/// - WASD: move forward/back/left/right (view-relative)
///
/// Angles are stored in degrees. Positive yaw turns right and positive pitch
/// looks down, matching screen-space mouse motion.
#[derive(Component, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FlyCamera {
    /// Mouse look sensitivity (degrees per pixel).
    pub sensitivity: f32,
    /// Movement speed (units per second).
    pub speed: f32,
    /// Whether camera controls are enabled.
    pub enabled: bool,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            sensitivity: 0.5,
            speed: 30.0,
            enabled: true,
            yaw: 0.0,
            pitch: -20.7,
        }
    }
}

/// Movement keys held this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveKeys {
    pub fn from_input(keyboard: &ButtonInput<KeyCode>) -> Self {
        Self {
            forward: keyboard.pressed(KeyCode::KeyW),
            back: keyboard.pressed(KeyCode::KeyS),
            left: keyboard.pressed(KeyCode::KeyA),
            right: keyboard.pressed(KeyCode::KeyD),
        }
    }
}

impl FlyCamera {
    /// Accumulate mouse-look motion and clamp the pitch.
    pub fn look(&mut self, mouse_delta: Vec2) {
        self.yaw += self.sensitivity * mouse_delta.x;
        self.pitch += self.sensitivity * mouse_delta.y;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Orientation from yaw around world up, then pitch around local right. Roll is always zero.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            -self.yaw.to_radians(),
            -self.pitch.to_radians(),
            0.0,
        )
    }

    /// Camera-local translation for the held keys. Each key adds its own
    /// `speed * dt` step, so diagonals are not normalized.
    pub fn local_motion(&self, keys: MoveKeys, dt: f32) -> Vec3 {
        let step = self.speed * dt;
        let mut motion = Vec3::ZERO;
        if keys.forward {
            motion += Vec3::NEG_Z * step;
        }
        if keys.back {
            motion += Vec3::Z * step;
        }
        if keys.left {
            motion += Vec3::NEG_X * step;
        }
        if keys.right {
            motion += Vec3::X * step;
        }
        motion
    }

    /// Advance one frame. Returns the new orientation and the world-space
    /// translation to apply.
    pub fn step(&mut self, dt: f32, mouse_delta: Vec2, right_held: bool, keys: MoveKeys) -> (Quat, Vec3) {
        if right_held {
            self.look(mouse_delta);
        }
        let rotation = self.rotation();
        (rotation, rotation * self.local_motion(keys, dt))
    }
}

fn fly_camera_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    time: Res<Time>,
    mut camera_query: Query<(&mut FlyCamera, &mut Transform)>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    let right_held = mouse.pressed(MouseButton::Right);
    let keys = MoveKeys::from_input(&keyboard);
    let dt = time.delta_secs();

    for (mut camera, mut transform) in &mut camera_query {
        if !camera.enabled {
            continue;
        }
        let (rotation, motion) = camera.step(dt, mouse_delta, right_held, keys);
        transform.rotation = rotation;
        transform.translation += motion;
    }
}
