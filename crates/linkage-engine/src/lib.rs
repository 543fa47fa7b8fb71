//! Linkage engine crate.
//!
//! Renders articulated scenes: rigid parts uploaded to the GPU once and
//! redrawn every frame under a transform composed from projection, camera and
//! per-joint factors.
//!
//! Layering, bottom-up:
//! - `gfx`: GL-style graphics context capability (wgpu and headless backends)
//! - `geometry`: models and their GPU buffers
//! - `render`: slot binding and renderable parts
//! - `transform`: matrix chains, joint poses, camera helpers
//! - `scene`: scene orchestration and the bundled scenes
//! - `device`, `window`, `core`, `input`, `time`, `logging`: platform runtime

pub mod error;

pub mod gfx;
pub mod geometry;
pub mod render;
pub mod transform;
pub mod scene;

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
