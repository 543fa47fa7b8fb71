//! Drawing parts through a graphics context.
//!
//! - `ShaderProgram`: compiled program + resolved `ShaderBinding`, shared via `Rc`
//! - `RenderablePart`: a `GeometryBuffer` drawn with one program
//! - `builtin`: bundled WGSL programs and their `ShadingMode`
//!
//! Convention:
//! - positions, normals and colors are tightly packed `f32` triples
//! - matrices are column-major `glam::Mat4`, applied as `M * v`

mod binder;
pub mod builtin;
mod part;
mod program;
mod target;

pub use binder::ShaderBinding;
pub use builtin::ShadingMode;
pub use part::{Light, RenderablePart};
pub use program::ShaderProgram;
pub use target::RenderTarget;
