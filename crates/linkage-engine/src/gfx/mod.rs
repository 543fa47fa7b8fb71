//! Graphics context capability.
//!
//! The scene layer talks to the GPU through a small GL-style surface:
//! vertex buffers, programs with named attribute/uniform slots, and
//! `draw_arrays`. Binding state lives inside the context and is mutated by
//! every draw; exclusive access is expressed by `&mut`.
//!
//! Backends:
//! - `WgpuContext` records draws and encodes them into one render pass on `flush`
//! - `HeadlessContext` records draws without a GPU (tests, headless runs)

mod error;
mod headless;
mod reflect;
mod wgpu_context;

use std::borrow::Cow;

use glam::{Mat4, Vec3};

pub use error::GfxError;
pub use headless::{ContextStats, DrawRecord, HeadlessContext, HeadlessProvider, UniformValue};
pub use reflect::{reflect_program, ProgramLayout, UniformBlock, UniformMember, VertexInput};
pub use wgpu_context::{WgpuContext, WgpuProvider};

/// Handle to a vertex buffer owned by a context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BufferId(pub(crate) u32);

/// Handle to a compiled program owned by a context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ProgramId(pub(crate) u32);

/// Vertex attribute slot (the shader's `@location`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct AttribSlot(pub u32);

/// Uniform slot: byte offset of a member inside the program's uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformSlot {
    pub offset: u32,
    pub kind: UniformKind,
}

/// Uniform member types understood by the contexts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Float,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    pub fn byte_size(self) -> usize {
        match self {
            UniformKind::Float => 4,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UniformKind::Float => "f32",
            UniformKind::Vec3 => "vec3<f32>",
            UniformKind::Vec4 => "vec4<f32>",
            UniformKind::Mat4 => "mat4x4<f32>",
        }
    }
}

/// Primitive kinds, each drawn with its own topology.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveKind {
    Points,
    Lines,
    Triangles,
}

impl PrimitiveKind {
    /// Fixed draw order used by every part.
    pub const DRAW_ORDER: [PrimitiveKind; 3] =
        [PrimitiveKind::Points, PrimitiveKind::Lines, PrimitiveKind::Triangles];

    pub fn label(self) -> &'static str {
        match self {
            PrimitiveKind::Points => "points",
            PrimitiveKind::Lines => "lines",
            PrimitiveKind::Triangles => "triangles",
        }
    }
}

/// WGSL program source. Entry points must be `vs_main` and `fs_main`.
#[derive(Debug, Clone)]
pub struct ProgramSource {
    pub label: Cow<'static, str>,
    pub wgsl: Cow<'static, str>,
}

impl ProgramSource {
    pub const VERTEX_ENTRY: &'static str = "vs_main";
    pub const FRAGMENT_ENTRY: &'static str = "fs_main";

    pub fn new(label: impl Into<Cow<'static, str>>, wgsl: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            wgsl: wgsl.into(),
        }
    }
}

/// GL-style drawing surface.
///
/// Attribute bindings are cleared after every `draw_arrays`; a draw must bind
/// everything it reads.
pub trait GraphicsContext {
    /// Allocates a vertex buffer holding `data` (tightly packed `f32`s).
    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> Result<BufferId, GfxError>;

    /// Frees a buffer. Freeing an unknown or already-freed buffer is misuse.
    fn delete_buffer(&mut self, buffer: BufferId) -> Result<(), GfxError>;

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttribSlot>;

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformSlot>;

    fn use_program(&mut self, program: ProgramId) -> Result<(), GfxError>;

    fn set_uniform_mat4(&mut self, slot: UniformSlot, value: &Mat4) -> Result<(), GfxError>;

    fn set_uniform_vec3(&mut self, slot: UniformSlot, value: Vec3) -> Result<(), GfxError>;

    /// Attaches `buffer` to `slot`; `components` floats per vertex.
    fn bind_attribute(
        &mut self,
        slot: AttribSlot,
        buffer: BufferId,
        components: u32,
    ) -> Result<(), GfxError>;

    /// Draws `count` vertices of `kind` with the current program and bindings.
    fn draw_arrays(&mut self, kind: PrimitiveKind, count: u32) -> Result<(), GfxError>;
}

/// Turns program source into a program handle.
pub trait ProgramCompiler {
    fn compile(&mut self, source: &ProgramSource) -> Result<ProgramId, GfxError>;

    fn delete_program(&mut self, program: ProgramId) -> Result<(), GfxError>;
}

/// Full capability set a scene needs.
pub trait RenderContext: GraphicsContext + ProgramCompiler {}

impl<T: GraphicsContext + ProgramCompiler + ?Sized> RenderContext for T {}

/// Supplies a rendering context for a named surface.
///
/// `None` means the surface has no usable context; callers treat it as an
/// initialization failure for that scene only.
pub trait ContextProvider {
    type Context: RenderContext;

    fn context(&mut self, surface: &str) -> Option<Self::Context>;
}
