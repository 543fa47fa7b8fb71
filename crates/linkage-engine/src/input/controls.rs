use glam::Vec3;

use crate::transform::ViewVolume;

/// A change requested of a scene, independent of where it came from.
///
/// Angles are degrees. Scenes ignore events that do not apply to them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlEvent {
    /// Pointer drag since the previous drag event; `dy` grows upwards.
    Drag { dx: f32, dy: f32 },

    SetAnimate(bool),

    SetJointAngle { joint: usize, degrees: f32 },
    NudgeJoint { joint: usize, degrees: f32 },
    SetOffset { joint: usize, offset: Vec3 },

    SetXAngle(f32),
    NudgeXAngle(f32),

    SetTranslation(Vec3),
    NudgeTranslation(Vec3),

    SetViewVolume(ViewVolume),
    /// Multiplies every side of the view volume.
    ScaleViewVolume(f32),

    /// Switches between a scene's alternate views, where it has any.
    ToggleView,

    Reset,
}
