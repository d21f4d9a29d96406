use std::path::{Path, PathBuf};

use bevy::prelude::*;
use gizmo_camera::FlyCamera;
use serde::Deserialize;

/// Environment variable naming an optional JSON settings file.
pub const SETTINGS_ENV: &str = "GIZMO_TEST_SETTINGS";
/// Settings file read when [`SETTINGS_ENV`] is unset.
pub const DEFAULT_SETTINGS_PATH: &str = "gizmo_test.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How the held-drag frame samples the cursor before unprojecting.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragProjection {
    /// Unproject the live cursor every frame.
    #[default]
    LiveCursor,
    /// Unproject the cursor stored on the previous frame, so the resize
    /// trails the mouse by one frame and the first held frame is a no-op.
    StoredCursor,
}

/// Tunables for picking and resizing.
#[derive(Resource, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GizmoSettings {
    /// Maximum ray length when picking handles.
    pub pick_distance: f32,
    /// View-space depth at which the cursor is unprojected while dragging.
    pub drag_depth: f32,
    pub drag_projection: DragProjection,
    /// Distance from the box centre to each handle at startup.
    pub handle_offset: f32,
    pub handle_scale: f32,
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            pick_distance: 100.0,
            drag_depth: 10.0,
            drag_projection: DragProjection::LiveCursor,
            handle_offset: 1.5,
            handle_scale: 0.1,
        }
    }
}

#[derive(Resource, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub maximized: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "GizmoTest".to_string(),
            width: 1024,
            height: 768,
            resizable: true,
            maximized: true,
        }
    }
}

impl WindowSettings {
    pub fn window(&self) -> Window {
        Window {
            title: self.title.clone(),
            resolution: (self.width, self.height).into(),
            resizable: self.resizable,
            ..default()
        }
    }
}

/// Camera, lighting and fog for the demo scene.
#[derive(Resource, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SceneSettings {
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Distance the camera backs away from the origin along its own view axis.
    pub camera_distance: f32,
    pub ambient: f32,
    pub fog_color: Vec3,
    pub fog_start: f32,
    pub fog_end: f32,
    pub sun_direction: Vec3,
    pub back_light_direction: Vec3,
    pub show_grid: bool,
    pub grid_height: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            fov: 50.0,
            camera_distance: 10.0,
            ambient: 0.25,
            fog_color: Vec3::new(0.2, 0.2, 0.3),
            fog_start: 200.0,
            fog_end: 350.0,
            sun_direction: Vec3::new(1.5, 3.5, -1.5),
            back_light_direction: Vec3::new(-1.5, -3.5, 1.5),
            show_grid: true,
            grid_height: -5.0,
        }
    }
}

/// Everything configurable about the demo, as read from the settings file.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct DemoSettings {
    pub window: WindowSettings,
    pub scene: SceneSettings,
    pub gizmo: GizmoSettings,
    pub camera: FlyCamera,
}

impl DemoSettings {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Path from [`SETTINGS_ENV`], falling back to [`DEFAULT_SETTINGS_PATH`].
    pub fn path() -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH))
    }

    /// Load settings, falling back to defaults. A missing file is not an
    /// error; an unreadable or malformed one is reported through the
    /// returned [`SettingsSource`].
    pub fn load_or_default(path: &Path) -> (Self, SettingsSource) {
        if !path.exists() {
            return (Self::default(), SettingsSource::Defaults);
        }
        match Self::from_path(path) {
            Ok(settings) => (settings, SettingsSource::File(path.to_path_buf())),
            Err(err) => (
                Self::default(),
                SettingsSource::Fallback {
                    path: path.to_path_buf(),
                    error: err.to_string(),
                },
            ),
        }
    }
}

/// Where the running settings came from. Settings are read before the app
/// (and its logger) exists, so the outcome is logged once at startup.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub enum SettingsSource {
    #[default]
    Defaults,
    File(PathBuf),
    Fallback { path: PathBuf, error: String },
}

pub(crate) fn report_settings_source(source: Res<SettingsSource>) {
    match &*source {
        SettingsSource::Defaults => debug!("Using default settings"),
        SettingsSource::File(path) => info!("Settings loaded from {}", path.display()),
        SettingsSource::Fallback { path, error } => {
            warn!("Failed to load settings '{}': {error}", path.display());
        }
    }
}
