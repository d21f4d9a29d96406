use bevy::{
    prelude::*,
    window::{CursorOptions, PrimaryWindow},
};
use bevy_infinite_grid::{InfiniteGrid, InfiniteGridPlugin};
use gizmo_camera::FlyCamera;

use crate::{
    gizmo::{ResizeBox, ResizeHandle, axis_base_color},
    resize::GizmoAxis,
    settings::{GizmoSettings, SceneSettings, WindowSettings},
};

const AMBIENT_BRIGHTNESS: f32 = 400.0;
const SUN_ILLUMINANCE: f32 = 10_000.0;
const BACK_LIGHT_ILLUMINANCE: f32 = 1_000.0;
const ICOSPHERE_SUBDIVISIONS: u32 = 2;
/// Handles are unit-diameter spheres, sized by `GizmoSettings::handle_scale`.
const HANDLE_RADIUS: f32 = 0.5;

/// Fly-camera state the scene camera spawns with.
#[derive(Resource, Clone, Default)]
pub struct CameraTemplate(pub FlyCamera);

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InfiniteGridPlugin)
            .init_resource::<CameraTemplate>()
            .init_resource::<SceneSettings>()
            .init_resource::<GizmoSettings>()
            .init_resource::<WindowSettings>()
            .add_systems(Startup, (spawn_scene, configure_window));
    }
}

fn grey(value: f32) -> Color {
    Color::srgb(value, value, value)
}

fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scene: Res<SceneSettings>,
    gizmo: Res<GizmoSettings>,
    template: Res<CameraTemplate>,
) {
    let fog_color = Color::srgb(scene.fog_color.x, scene.fog_color.y, scene.fog_color.z);
    commands.insert_resource(ClearColor(fog_color));

    // Camera backs away along its own view axis so the box starts in view.
    let fly_camera = template.0.clone();
    let rotation = fly_camera.rotation();
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: scene.fov.to_radians(),
            ..default()
        }),
        Transform::from_translation(rotation * Vec3::Z * scene.camera_distance)
            .with_rotation(rotation),
        AmbientLight {
            color: grey(scene.ambient),
            brightness: AMBIENT_BRIGHTNESS,
            ..default()
        },
        DistanceFog {
            color: fog_color,
            falloff: FogFalloff::Linear {
                start: scene.fog_start,
                end: scene.fog_end,
            },
            ..default()
        },
        fly_camera,
    ));

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            shadows_enabled: true,
            color: Color::srgb(1.1, 1.1, 1.0),
            illuminance: SUN_ILLUMINANCE,
            ..default()
        },
        Transform::default().looking_to(scene.sun_direction, Vec3::Y),
    ));
    commands.spawn((
        Name::new("Back Light"),
        DirectionalLight {
            shadows_enabled: false,
            color: grey(0.1),
            illuminance: BACK_LIGHT_ILLUMINANCE,
            ..default()
        },
        Transform::default().looking_to(scene.back_light_direction, Vec3::Y),
    ));

    commands.spawn((
        Name::new("Box"),
        ResizeBox,
        Mesh3d(meshes.add(Cuboid::new(1.0, 1.0, 1.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            ..default()
        })),
        Transform::IDENTITY,
    ));

    let sphere = meshes.add(handle_mesh());
    let axis_materials = [0, 1, 2].map(|index| {
        let axis = GizmoAxis::ALL[index * 2];
        materials.add(StandardMaterial {
            base_color: axis_base_color(axis),
            ..default()
        })
    });

    for axis in GizmoAxis::ALL {
        commands.spawn((
            Name::new(format!("Handle {}", axis.label())),
            ResizeHandle(axis),
            Mesh3d(sphere.clone()),
            MeshMaterial3d(axis_materials[axis.index()].clone()),
            Transform::from_translation(axis.unit() * gizmo.handle_offset)
                .with_scale(Vec3::splat(gizmo.handle_scale)),
        ));
    }

    if scene.show_grid {
        commands.spawn((
            Name::new("Grid"),
            InfiniteGrid,
            Transform::from_xyz(0.0, scene.grid_height, 0.0),
        ));
    }

    info!("Scene ready: box with {} handles", GizmoAxis::ALL.len());
}

fn handle_mesh() -> Mesh {
    match Sphere::new(HANDLE_RADIUS).mesh().ico(ICOSPHERE_SUBDIVISIONS) {
        Ok(mesh) => mesh,
        Err(err) => {
            warn!("Failed to build icosphere, using UV sphere: {err}");
            Sphere::new(HANDLE_RADIUS).mesh().uv(32, 18)
        }
    }
}

/// Maximize the window and park a visible cursor at its centre.
fn configure_window(
    window_settings: Res<WindowSettings>,
    mut windows: Query<(&mut Window, &mut CursorOptions), With<PrimaryWindow>>,
) {
    let Ok((mut window, mut cursor_options)) = windows.single_mut() else {
        return;
    };
    if window_settings.maximized {
        window.set_maximized(true);
    }
    cursor_options.visible = true;
    let center = window.size() / 2.0;
    window.set_cursor_position(Some(center));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_mesh_is_unit_diameter() {
        let mesh = handle_mesh();
        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|positions| positions.as_float3())
            .unwrap();
        assert!(!positions.is_empty());
        for position in positions {
            assert!((Vec3::from(*position).length() - 0.5).abs() < 1e-4);
        }
    }
}
