pub mod gizmo;
pub mod hud;
pub mod picking;
pub mod projection;
pub mod resize;
pub mod scene;
pub mod settings;

use bevy::{
    input::{ButtonState, keyboard::KeyboardInput},
    prelude::*,
};
use gizmo_camera::FlyCameraPlugin;
use settings::{DemoSettings, SettingsSource};

/// The resize-gizmo demo: fly camera, box with six drag handles, HUD.
#[derive(Default)]
pub struct GizmoTestPlugin {
    pub settings: DemoSettings,
    pub source: SettingsSource,
}

impl GizmoTestPlugin {
    /// Plugin configured from the settings file named by the environment.
    pub fn from_env() -> Self {
        let (settings, source) = DemoSettings::load_or_default(&DemoSettings::path());
        Self { settings, source }
    }
}

impl Plugin for GizmoTestPlugin {
    fn build(&self, app: &mut App) {
        // Settings go in first so plugin resources built from the world see them.
        app.insert_resource(self.settings.window.clone())
            .insert_resource(self.settings.scene.clone())
            .insert_resource(self.settings.gizmo.clone())
            .insert_resource(scene::CameraTemplate(self.settings.camera.clone()))
            .insert_resource(self.source.clone())
            .add_plugins((
                FlyCameraPlugin,
                scene::ScenePlugin,
                gizmo::ResizeGizmoPlugin,
                hud::HudPlugin,
            ))
            .add_systems(Startup, settings::report_settings_source)
            .add_systems(Update, exit_on_escape)
            .add_systems(Last, log_asset_summary);
    }
}

fn exit_on_escape(mut key_events: MessageReader<KeyboardInput>, mut app_exit: MessageWriter<AppExit>) {
    for event in key_events.read() {
        if event.state == ButtonState::Pressed && event.key_code == KeyCode::Escape {
            info!("Escape pressed, exiting");
            app_exit.write(AppExit::Success);
        }
    }
}

fn log_asset_summary(
    mut exits: MessageReader<AppExit>,
    meshes: Res<Assets<Mesh>>,
    materials: Res<Assets<StandardMaterial>>,
) {
    if exits.read().next().is_none() {
        return;
    }
    info!(
        "Shutting down with {} meshes and {} materials loaded",
        meshes.len(),
        materials.len()
    );
}
