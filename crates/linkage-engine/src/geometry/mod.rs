//! Models and their GPU-resident buffers.
//!
//! - `Model`: immutable, validated vertex data in up to three primitive groups
//! - `ModelCatalog`: models by name
//! - `GeometryBuffer`: a model uploaded to a graphics context
//! - `primitives`: procedural builders for the bundled models

mod buffer;
mod model;
pub mod primitives;

pub use buffer::{GeometryBuffer, GroupBuffers};
pub use model::{Model, ModelCatalog, ModelError, PrimitiveGroup};
