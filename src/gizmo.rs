use bevy::{ecs::system::SystemParam, prelude::*};
use gizmo_camera::FlyCameraSet;

use crate::{
    picking::ScenePicker,
    projection::ScreenProjector,
    resize::{GizmoAxis, ResizeDrag, apply_resize},
    settings::GizmoSettings,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const COLOR_X: Color = Color::srgb(1.0, 0.2, 0.2);
const COLOR_Y: Color = Color::srgb(0.2, 1.0, 0.2);
const COLOR_Z: Color = Color::srgb(0.2, 0.4, 1.0);
const COLOR_X_BRIGHT: Color = Color::srgb(1.0, 0.5, 0.5);
const COLOR_Y_BRIGHT: Color = Color::srgb(0.5, 1.0, 0.5);
const COLOR_Z_BRIGHT: Color = Color::srgb(0.5, 0.7, 1.0);

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// The resizable box. Its scale is the box size.
#[derive(Component)]
pub struct ResizeBox;

/// A draggable handle sitting on one face of the [`ResizeBox`].
#[derive(Component, Clone, Copy, Debug)]
pub struct ResizeHandle(pub GizmoAxis);

impl FromWorld for ResizeDrag {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<GizmoSettings>()
            .cloned()
            .unwrap_or_default();
        ResizeDrag::new(settings.drag_depth, settings.drag_projection)
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct ResizeGizmoPlugin;

impl Plugin for ResizeGizmoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ResizeDrag>().add_systems(
            Update,
            (
                begin_resize_drag,
                update_resize_drag,
                end_resize_drag,
                draw_resize_gizmo,
            )
                .chain()
                .after(FlyCameraSet),
        );
    }
}

// ---------------------------------------------------------------------------
// Drag handling
// ---------------------------------------------------------------------------

/// The box and its handles, as written by a resize.
#[derive(SystemParam)]
struct ResizeTargets<'w, 's> {
    boxes: Query<
        'w,
        's,
        &'static mut Transform,
        (With<ResizeBox>, Without<ResizeHandle>, Without<Camera3d>),
    >,
    handles: Query<
        'w,
        's,
        (&'static ResizeHandle, &'static mut Transform),
        (Without<ResizeBox>, Without<Camera3d>),
    >,
}

fn begin_resize_drag(
    mouse: Res<ButtonInput<MouseButton>>,
    mut picker: ScenePicker,
    handles: Query<&ResizeHandle>,
    mut drag: ResMut<ResizeDrag>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(cursor) = picker.cursor() else {
        drag.release();
        return;
    };
    let picked = picker.pick(cursor);
    let Some(projector) = picker.projector() else {
        drag.release();
        return;
    };
    press_drag(&mut drag, picked, &handles, cursor, &projector);
}

/// Start a session if `picked` is a resize handle, otherwise go idle.
fn press_drag(
    drag: &mut ResizeDrag,
    picked: Option<Entity>,
    handles: &Query<&ResizeHandle>,
    cursor: Vec2,
    projector: &impl ScreenProjector,
) {
    let hit = picked
        .and_then(|entity| handles.get(entity).ok())
        .map(|handle| handle.0);
    drag.press(hit, cursor, projector);
    if let Some(axis) = drag.axis {
        info!("Grabbed {} handle", axis.label());
    }
}

fn update_resize_drag(
    mouse: Res<ButtonInput<MouseButton>>,
    picker: ScenePicker,
    mut drag: ResMut<ResizeDrag>,
    mut targets: ResizeTargets,
) {
    let Some(cursor) = picker.cursor() else {
        return;
    };
    let Some(projector) = picker.projector() else {
        return;
    };
    hold_drag(&mouse, &mut drag, &mut targets, cursor, &projector);
}

/// Apply one held frame of the active session to the box and handles.
fn hold_drag(
    mouse: &ButtonInput<MouseButton>,
    drag: &mut ResizeDrag,
    targets: &mut ResizeTargets,
    cursor: Vec2,
    projector: &impl ScreenProjector,
) {
    // The press frame only snapshots the cursor.
    if !drag.is_dragging()
        || !mouse.pressed(MouseButton::Left)
        || mouse.just_pressed(MouseButton::Left)
    {
        return;
    }
    let Ok(mut box_transform) = targets.boxes.single_mut() else {
        return;
    };
    let Some(step) = drag.hold(box_transform.scale, cursor, projector) else {
        return;
    };
    if step.is_noop() {
        return;
    }
    apply_resize(
        &step,
        &mut box_transform,
        targets
            .handles
            .iter_mut()
            .map(|(handle, transform)| (handle.0, transform.into_inner())),
    );
}

fn end_resize_drag(mouse: Res<ButtonInput<MouseButton>>, mut drag: ResMut<ResizeDrag>) {
    if !mouse.just_released(MouseButton::Left) {
        return;
    }
    if let Some(axis) = drag.axis {
        info!("Released {} handle", axis.label());
        drag.release();
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw_resize_gizmo(
    mut gizmos: Gizmos,
    drag: Res<ResizeDrag>,
    boxes: Query<&GlobalTransform, With<ResizeBox>>,
    handles: Query<(&ResizeHandle, &GlobalTransform)>,
) {
    let Ok(box_tf) = boxes.single() else {
        return;
    };
    let center = box_tf.translation();

    for (handle, handle_tf) in &handles {
        gizmos.line(center, handle_tf.translation(), axis_color(handle.0, drag.axis));
    }

    if let Some(axis) = drag.axis {
        gizmos.cube(*box_tf, axis_color(axis, drag.axis));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Base colour for handles on `axis`.
pub fn axis_base_color(axis: GizmoAxis) -> Color {
    match axis.index() {
        0 => COLOR_X,
        1 => COLOR_Y,
        _ => COLOR_Z,
    }
}

fn axis_color(axis: GizmoAxis, active: Option<GizmoAxis>) -> Color {
    if active != Some(axis) {
        return axis_base_color(axis);
    }
    match axis.index() {
        0 => COLOR_X_BRIGHT,
        1 => COLOR_Y_BRIGHT,
        _ => COLOR_Z_BRIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{projection::tests::FlatProjector, settings::DragProjection};
    use bevy::input::{ButtonState, InputPlugin, mouse::MouseButtonInput};

    /// Cursor and pick result fed to the drag systems in place of a window.
    #[derive(Resource)]
    struct Pointer {
        cursor: Vec2,
        picked: Option<Entity>,
    }

    fn press_at_pointer(
        mouse: Res<ButtonInput<MouseButton>>,
        pointer: Res<Pointer>,
        handles: Query<&ResizeHandle>,
        mut drag: ResMut<ResizeDrag>,
    ) {
        if mouse.just_pressed(MouseButton::Left) {
            press_drag(
                &mut drag,
                pointer.picked,
                &handles,
                pointer.cursor,
                &FlatProjector::default(),
            );
        }
    }

    fn hold_at_pointer(
        mouse: Res<ButtonInput<MouseButton>>,
        pointer: Res<Pointer>,
        mut drag: ResMut<ResizeDrag>,
        mut targets: ResizeTargets,
    ) {
        hold_drag(
            &mouse,
            &mut drag,
            &mut targets,
            pointer.cursor,
            &FlatProjector::default(),
        );
    }

    struct DragApp {
        app: App,
        gizmo_box: Entity,
        handles: Vec<(GizmoAxis, Entity)>,
    }

    impl DragApp {
        fn new() -> Self {
            let mut app = App::new();
            app.add_plugins((MinimalPlugins, InputPlugin))
                .insert_resource(ResizeDrag::new(10.0, DragProjection::LiveCursor))
                .insert_resource(Pointer {
                    cursor: Vec2::ZERO,
                    picked: None,
                })
                .add_systems(
                    Update,
                    (press_at_pointer, hold_at_pointer, end_resize_drag).chain(),
                );
            let gizmo_box = app.world_mut().spawn((ResizeBox, Transform::default())).id();
            let handles = GizmoAxis::ALL
                .iter()
                .map(|&axis| {
                    let entity = app
                        .world_mut()
                        .spawn((ResizeHandle(axis), Transform::from_translation(axis.unit() * 1.5)))
                        .id();
                    (axis, entity)
                })
                .collect();
            Self {
                app,
                gizmo_box,
                handles,
            }
        }

        fn handle(&self, axis: GizmoAxis) -> Entity {
            self.handles
                .iter()
                .find(|(a, _)| *a == axis)
                .map(|(_, entity)| *entity)
                .unwrap()
        }

        fn translation(&self, entity: Entity) -> Vec3 {
            self.app.world().get::<Transform>(entity).unwrap().translation
        }

        fn box_transform(&self) -> Transform {
            *self.app.world().get::<Transform>(self.gizmo_box).unwrap()
        }

        fn point_at(&mut self, cursor: Vec2, picked: Option<Entity>) {
            let mut pointer = self.app.world_mut().resource_mut::<Pointer>();
            pointer.cursor = cursor;
            pointer.picked = picked;
        }

        fn left_button(&mut self, state: ButtonState) {
            self.app.world_mut().write_message(MouseButtonInput {
                button: MouseButton::Left,
                state,
                window: Entity::PLACEHOLDER,
            });
        }

        fn drag(&self) -> &ResizeDrag {
            self.app.world().resource::<ResizeDrag>()
        }
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn dragging_a_handle_resizes_the_box() {
        let mut app = DragApp::new();
        let x_pos = app.handle(GizmoAxis::XPos);

        app.point_at(Vec2::ZERO, Some(x_pos));
        app.left_button(ButtonState::Pressed);
        app.app.update();
        assert_eq!(app.drag().axis, Some(GizmoAxis::XPos));
        assert_eq!(app.box_transform(), Transform::default());

        app.point_at(Vec2::new(200.0, 0.0), Some(x_pos));
        app.app.update();
        let box_transform = app.box_transform();
        assert!(approx(box_transform.scale, Vec3::new(3.0, 1.0, 1.0)));
        assert!(approx(box_transform.translation, Vec3::new(1.0, 0.0, 0.0)));
        assert!(approx(app.translation(x_pos), Vec3::new(3.5, 0.0, 0.0)));
        assert!(approx(
            app.translation(app.handle(GizmoAxis::XNeg)),
            Vec3::new(-1.5, 0.0, 0.0)
        ));
        assert!(approx(
            app.translation(app.handle(GizmoAxis::ZPos)),
            Vec3::new(1.0, 0.0, 1.5)
        ));

        // Holding still changes nothing.
        app.app.update();
        assert_eq!(app.box_transform(), box_transform);

        app.point_at(Vec2::new(400.0, 0.0), Some(x_pos));
        app.left_button(ButtonState::Released);
        app.app.update();
        assert!(!app.drag().is_dragging());
        assert_eq!(app.box_transform(), box_transform);
    }

    #[test]
    fn pressing_the_box_itself_starts_no_drag() {
        let mut app = DragApp::new();
        let gizmo_box = app.gizmo_box;

        app.point_at(Vec2::ZERO, Some(gizmo_box));
        app.left_button(ButtonState::Pressed);
        app.app.update();
        assert!(!app.drag().is_dragging());

        app.point_at(Vec2::new(300.0, 0.0), Some(gizmo_box));
        app.app.update();
        assert_eq!(app.box_transform(), Transform::default());
        assert!(approx(
            app.translation(app.handle(GizmoAxis::XPos)),
            Vec3::new(1.5, 0.0, 0.0)
        ));
    }

    #[test]
    fn drag_session_follows_gizmo_settings() {
        let mut world = World::new();
        world.insert_resource(GizmoSettings {
            drag_depth: 4.0,
            drag_projection: DragProjection::StoredCursor,
            ..default()
        });
        let drag = ResizeDrag::from_world(&mut world);
        assert_eq!(drag.depth, 4.0);
        assert_eq!(drag.projection, DragProjection::StoredCursor);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn only_the_active_axis_is_highlighted() {
        assert_eq!(axis_color(GizmoAxis::XPos, None), COLOR_X);
        assert_eq!(axis_color(GizmoAxis::XPos, Some(GizmoAxis::XPos)), COLOR_X_BRIGHT);
        assert_eq!(axis_color(GizmoAxis::XNeg, Some(GizmoAxis::XPos)), COLOR_X);
        assert_eq!(axis_color(GizmoAxis::ZNeg, Some(GizmoAxis::ZNeg)), COLOR_Z_BRIGHT);
    }

    #[test]
    fn release_clears_drag_in_app() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, InputPlugin))
            .insert_resource(ResizeDrag {
                axis: Some(GizmoAxis::YNeg),
                ..ResizeDrag::new(10.0, default())
            })
            .add_systems(Update, end_resize_drag);

        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();
        assert!(app.world().resource::<ResizeDrag>().is_dragging());

        app.world_mut()
            .write_message(MouseButtonInput {
                button: MouseButton::Left,
                state: ButtonState::Released,
                window: Entity::PLACEHOLDER,
            });
        app.update();
        assert!(!app.world().resource::<ResizeDrag>().is_dragging());
    }
}
