use bevy::{
    ecs::system::SystemParam,
    picking::{
        hover::HoverMap,
        mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility},
    },
    prelude::*,
    window::{CursorOptions, PrimaryWindow},
};

use crate::{
    projection::{CameraProjector, ScreenProjector},
    settings::GizmoSettings,
};

/// Picks are refused while the cursor is hidden or hovering UI.
pub fn pick_allowed(cursor_visible: bool, over_ui: bool) -> bool {
    cursor_visible && !over_ui
}

/// Whether any pointer in `hover_map` is over an entity `is_ui` accepts.
pub fn hovers_ui(hover_map: &HoverMap, is_ui: impl Fn(Entity) -> bool) -> bool {
    hover_map
        .values()
        .any(|pointer_map| pointer_map.keys().any(|&entity| is_ui(entity)))
}

/// Nearest hit within `max_distance`. `hits` must be sorted nearest first.
pub fn nearest_within<T: Copy>(hits: impl IntoIterator<Item = (T, f32)>, max_distance: f32) -> Option<T> {
    hits.into_iter()
        .next()
        .filter(|(_, distance)| *distance <= max_distance)
        .map(|(target, _)| target)
}

/// Scene queries for the primary window and the 3D camera: cursor lookup,
/// unprojection and mesh picking.
#[derive(SystemParam)]
pub struct ScenePicker<'w, 's> {
    windows: Query<'w, 's, (&'static Window, &'static CursorOptions), With<PrimaryWindow>>,
    // The fly camera is unparented, so its local transform is already final
    // when this runs after `FlyCameraSet`.
    cameras: Query<'w, 's, (&'static Camera, &'static Transform), With<Camera3d>>,
    ui_nodes: Query<'w, 's, (), With<Node>>,
    hover_map: Option<Res<'w, HoverMap>>,
    settings: Res<'w, GizmoSettings>,
    ray_cast: MeshRayCast<'w, 's>,
}

impl ScenePicker<'_, '_> {
    /// Cursor position in window-logical pixels, if it is inside the window.
    pub fn cursor(&self) -> Option<Vec2> {
        let (window, _) = self.windows.single().ok()?;
        window.cursor_position()
    }

    pub fn projector(&self) -> Option<CameraProjector<'_>> {
        let (window, _) = self.windows.single().ok()?;
        let (camera, transform) = self.cameras.single().ok()?;
        Some(CameraProjector::new(camera, transform, window.size()))
    }

    /// Whether any pointer currently hovers a UI node.
    pub fn over_ui(&self) -> bool {
        self.hover_map
            .as_deref()
            .is_some_and(|hover_map| hovers_ui(hover_map, |entity| self.ui_nodes.contains(entity)))
    }

    /// Whether a click may pick scene geometry right now.
    pub fn pick_allowed(&self) -> bool {
        let Ok((_, cursor_options)) = self.windows.single() else {
            return false;
        };
        pick_allowed(cursor_options.visible, self.over_ui())
    }

    /// Nearest visible mesh under `cursor`, within the configured pick distance.
    pub fn pick(&mut self, cursor: Vec2) -> Option<Entity> {
        if !self.pick_allowed() {
            return None;
        }
        let ray = self.projector()?.screen_ray(cursor)?;

        let settings = MeshRayCastSettings::default()
            .with_visibility(RayCastVisibility::Visible)
            .always_early_exit();
        let hits = self.ray_cast.cast_ray(ray, &settings);
        let hit = nearest_within(
            hits.iter().map(|(entity, hit)| (*entity, hit.distance)),
            self.settings.pick_distance,
        );
        if let Some(entity) = hit {
            debug!("Picked {entity}");
        }
        hit
    }
}
