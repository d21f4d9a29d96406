use bevy::prelude::*;

use crate::{
    gizmo::ResizeBox,
    resize::{GizmoAxis, ResizeDrag},
};

const CONTROLS: &str = "RMB drag: look   WASD: move   LMB drag handle: resize   Esc: quit";

/// Text node showing controls and the current box size.
#[derive(Component)]
pub struct HudText;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud)
            .add_systems(Update, update_hud);
    }
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("Hud"),
        Node {
            position_type: PositionType::Absolute,
            top: px(8),
            left: px(8),
            padding: UiRect::all(px(6)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
        children![(
            HudText,
            Text::new(hud_text(Vec3::ONE, None)),
            TextFont {
                font_size: 14.0,
                ..default()
            },
        )],
    ));
}

pub fn hud_text(size: Vec3, axis: Option<GizmoAxis>) -> String {
    let drag = axis.map_or_else(String::new, |axis| format!("   Dragging {}", axis.label()));
    format!(
        "{CONTROLS}\nSize: {:.2} x {:.2} x {:.2}{drag}",
        size.x, size.y, size.z
    )
}

fn update_hud(
    drag: Res<ResizeDrag>,
    boxes: Query<&Transform, With<ResizeBox>>,
    mut text_query: Query<&mut Text, With<HudText>>,
) {
    let Ok(mut text) = text_query.single_mut() else {
        return;
    };
    let Ok(box_transform) = boxes.single() else {
        return;
    };
    let new_text = hud_text(box_transform.scale, drag.axis);
    if text.0 != new_text {
        text.0 = new_text;
    }
}
