//! Axis-drag resize state machine.
//!
//! A drag converts cursor motion into a world-space delta by unprojecting the
//! cursor at a fixed view depth, then grows or shrinks the box along the
//! grabbed handle's axis. The opposite face stays put: the box centre moves by
//! half the applied amount and the dragged handle by the full amount.

use bevy::prelude::*;

use crate::{projection::ScreenProjector, settings::DragProjection};

/// Smallest allowed box size along any axis.
pub const MIN_BOX_SCALE: f32 = 1.0;

/// One of the six signed cardinal axes, one per handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GizmoAxis {
    XPos,
    XNeg,
    YPos,
    YNeg,
    ZPos,
    ZNeg,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 6] = [
        GizmoAxis::XPos,
        GizmoAxis::XNeg,
        GizmoAxis::YPos,
        GizmoAxis::YNeg,
        GizmoAxis::ZPos,
        GizmoAxis::ZNeg,
    ];

    /// Component index: 0 for X, 1 for Y, 2 for Z.
    pub fn index(self) -> usize {
        match self {
            GizmoAxis::XPos | GizmoAxis::XNeg => 0,
            GizmoAxis::YPos | GizmoAxis::YNeg => 1,
            GizmoAxis::ZPos | GizmoAxis::ZNeg => 2,
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            GizmoAxis::XPos | GizmoAxis::YPos | GizmoAxis::ZPos => 1.0,
            GizmoAxis::XNeg | GizmoAxis::YNeg | GizmoAxis::ZNeg => -1.0,
        }
    }

    /// Signed unit vector pointing out of the face this handle sits on.
    pub fn unit(self) -> Vec3 {
        let mut unit = Vec3::ZERO;
        unit[self.index()] = self.sign();
        unit
    }

    pub fn opposite(self) -> Self {
        match self {
            GizmoAxis::XPos => GizmoAxis::XNeg,
            GizmoAxis::XNeg => GizmoAxis::XPos,
            GizmoAxis::YPos => GizmoAxis::YNeg,
            GizmoAxis::YNeg => GizmoAxis::YPos,
            GizmoAxis::ZPos => GizmoAxis::ZNeg,
            GizmoAxis::ZNeg => GizmoAxis::ZPos,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GizmoAxis::XPos => "X+",
            GizmoAxis::XNeg => "X-",
            GizmoAxis::YPos => "Y+",
            GizmoAxis::YNeg => "Y-",
            GizmoAxis::ZPos => "Z+",
            GizmoAxis::ZNeg => "Z-",
        }
    }
}

/// Result of one resize increment along `axis`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ResizeStep {
    pub axis: GizmoAxis,
    /// New box scale component along the axis.
    pub scale: f32,
    /// Amount actually applied after clamping, along `axis.unit()`.
    pub translate: f32,
}

impl ResizeStep {
    /// How far the box centre moves.
    pub fn box_offset(&self) -> Vec3 {
        self.axis.unit() * self.translate * 0.5
    }

    pub fn is_noop(&self) -> bool {
        self.translate == 0.0
    }
}

/// Grow (or shrink) `box_scale` along `axis` by the component of `delta`
/// pointing out of that face, never below [`MIN_BOX_SCALE`].
pub fn resize_step(axis: GizmoAxis, box_scale: Vec3, delta: Vec3) -> ResizeStep {
    let old = box_scale[axis.index()];
    let amount = axis.sign() * delta[axis.index()];
    let scale = (old + amount).max(MIN_BOX_SCALE);
    ResizeStep {
        axis,
        scale,
        translate: scale - old,
    }
}

/// World offset for `handle` when the box is resized along `dragged` by
/// `translate`: the dragged handle tracks its face, the opposite handle
/// stays, cross-axis handles follow the box centre.
pub fn handle_offset(dragged: GizmoAxis, handle: GizmoAxis, translate: f32) -> Vec3 {
    let unit = dragged.unit();
    if handle == dragged {
        unit * translate
    } else if handle == dragged.opposite() {
        Vec3::ZERO
    } else {
        unit * translate * 0.5
    }
}

/// Write `step` into the box transform and the handle transforms.
pub fn apply_resize<'a>(
    step: &ResizeStep,
    box_transform: &mut Transform,
    handles: impl IntoIterator<Item = (GizmoAxis, &'a mut Transform)>,
) {
    box_transform.scale[step.axis.index()] = step.scale;
    box_transform.translation += step.box_offset();
    for (axis, transform) in handles {
        transform.translation += handle_offset(step.axis, axis, step.translate);
    }
}

/// Drag session: idle while `axis` is `None`.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct ResizeDrag {
    pub axis: Option<GizmoAxis>,
    pub last_cursor: Vec2,
    /// World point of the previous sample. `None` until the cursor first
    /// unprojects in this session.
    pub last_projected: Option<Vec3>,
    pub depth: f32,
    pub projection: DragProjection,
}

impl ResizeDrag {
    pub fn new(depth: f32, projection: DragProjection) -> Self {
        Self {
            axis: None,
            last_cursor: Vec2::ZERO,
            last_projected: None,
            depth,
            projection,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.axis.is_some()
    }

    /// Mouse press. `hit` is the axis of the handle under the cursor, if any.
    /// A press always replaces the previous session, and a handle hit latches
    /// its axis even if the cursor cannot be unprojected yet.
    pub fn press(&mut self, hit: Option<GizmoAxis>, cursor: Vec2, projector: &impl ScreenProjector) {
        self.axis = hit;
        self.last_cursor = cursor;
        self.last_projected = hit.and_then(|_| projector.unproject(cursor, self.depth));
    }

    /// Mouse held. Returns the increment to apply, or `None` when idle or
    /// when the cursor cannot be unprojected this frame.
    pub fn hold(
        &mut self,
        box_scale: Vec3,
        cursor: Vec2,
        projector: &impl ScreenProjector,
    ) -> Option<ResizeStep> {
        let axis = self.axis?;
        let sample = match self.projection {
            DragProjection::LiveCursor => cursor,
            DragProjection::StoredCursor => self.last_cursor,
        };
        let projected = projector.unproject(sample, self.depth)?;
        self.last_cursor = cursor;
        // The first sample of a session only sets the reference point.
        let delta = self
            .last_projected
            .replace(projected)
            .map_or(Vec3::ZERO, |previous| projected - previous);
        Some(resize_step(axis, box_scale, delta))
    }

    pub fn release(&mut self) {
        self.axis = None;
    }
}
