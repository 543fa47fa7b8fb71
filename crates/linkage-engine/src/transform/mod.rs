//! Transform composition.
//!
//! Matrices are column-major and applied as `M * v`. A part's clip-space
//! matrix is `projection * camera * parent-local * … * child-local`, rebuilt
//! from the current poses every frame.

mod camera;
mod compose;
mod joint;

pub use camera::{look_at, orbit, orthographic, ViewVolume};
pub use compose::{compose, rotation, translation, TransformChain};
pub use joint::{Hierarchy, HierarchyError, Joint, JointPose, JointTransform};
