use bevy::prelude::*;

/// Maps a window cursor into camera space and back into the world.
///
/// Cursor positions are window-logical pixels, origin top-left.
pub trait ScreenProjector {
    /// World ray through the cursor, starting on the near plane.
    fn screen_ray(&self, cursor: Vec2) -> Option<Ray3d>;

    /// Camera forward direction in world space.
    fn forward(&self) -> Vec3;

    /// Camera position in world space.
    fn eye(&self) -> Vec3;

    /// World point under `cursor` at the given view-space depth.
    fn unproject(&self, cursor: Vec2, depth: f32) -> Option<Vec3> {
        let ray = self.screen_ray(cursor)?;
        let forward = self.forward();
        let along = ray.direction.dot(forward);
        if along <= f32::EPSILON {
            return None;
        }
        // The ray origin already sits at near-plane depth.
        let origin_depth = (ray.origin - self.eye()).dot(forward);
        let distance = (depth - origin_depth).max(0.0) / along;
        Some(ray.get_point(distance))
    }
}

/// Normalize a window cursor by the window size and rescale it into the
/// camera's render-target space.
pub fn render_target_cursor(cursor: Vec2, window_size: Vec2, target_size: Vec2) -> Option<Vec2> {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return None;
    }
    Some(cursor / window_size * target_size)
}

/// A live Bevy camera viewed through the primary window.
pub struct CameraProjector<'a> {
    pub camera: &'a Camera,
    pub transform: GlobalTransform,
    pub window_size: Vec2,
}

impl<'a> CameraProjector<'a> {
    /// Projector for an unparented camera. Reads the local `Transform` so a
    /// camera moved earlier in the frame is seen before propagation.
    pub fn new(camera: &'a Camera, transform: &Transform, window_size: Vec2) -> Self {
        Self {
            camera,
            transform: GlobalTransform::from(*transform),
            window_size,
        }
    }
}

impl ScreenProjector for CameraProjector<'_> {
    fn screen_ray(&self, cursor: Vec2) -> Option<Ray3d> {
        let target_size = self.camera.logical_viewport_size().unwrap_or(self.window_size);
        let viewport_cursor = render_target_cursor(cursor, self.window_size, target_size)?;
        self.camera
            .viewport_to_world(&self.transform, viewport_cursor)
            .ok()
    }

    fn forward(&self) -> Vec3 {
        self.transform.forward().as_vec3()
    }

    fn eye(&self) -> Vec3 {
        self.transform.translation()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Orthographic stand-in: the camera sits at `eye` looking down -Z, and
    /// one cursor pixel maps to `units_per_pixel` world units on X/Y.
    pub(crate) struct FlatProjector {
        pub eye: Vec3,
        pub near: f32,
        pub units_per_pixel: f32,
    }

    impl Default for FlatProjector {
        fn default() -> Self {
            Self {
                eye: Vec3::new(0.0, 0.0, 10.0),
                near: 0.1,
                units_per_pixel: 0.01,
            }
        }
    }

    impl ScreenProjector for FlatProjector {
        fn screen_ray(&self, cursor: Vec2) -> Option<Ray3d> {
            let offset = Vec3::new(cursor.x, -cursor.y, 0.0) * self.units_per_pixel;
            let origin = self.eye + offset + Vec3::NEG_Z * self.near;
            Some(Ray3d::new(origin, Dir3::NEG_Z))
        }

        fn forward(&self) -> Vec3 {
            Vec3::NEG_Z
        }

        fn eye(&self) -> Vec3 {
            self.eye
        }
    }

    #[test]
    fn unproject_lands_at_requested_depth() {
        let projector = FlatProjector::default();
        let point = projector.unproject(Vec2::new(100.0, 50.0), 10.0).unwrap();
        assert!((point - Vec3::new(1.0, -0.5, 0.0)).length() < 1e-4);
    }

    #[test]
    fn depth_inside_near_plane_clamps_to_ray_origin() {
        let projector = FlatProjector::default();
        let point = projector.unproject(Vec2::ZERO, 0.0).unwrap();
        assert!((point - Vec3::new(0.0, 0.0, 9.9)).length() < 1e-4);
    }

    #[test]
    fn cursor_is_rescaled_into_render_target() {
        let cursor = render_target_cursor(
            Vec2::new(512.0, 384.0),
            Vec2::new(1024.0, 768.0),
            Vec2::new(2048.0, 1536.0),
        );
        assert_eq!(cursor, Some(Vec2::new(1024.0, 768.0)));
        assert_eq!(render_target_cursor(Vec2::ONE, Vec2::ZERO, Vec2::ONE), None);
    }
}
