//! GPU device + surface management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue, configures the window
//! surface and keeps a depth texture matching the surface size.

mod gpu;
mod surface;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
