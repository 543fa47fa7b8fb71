//! Recording backend with no GPU.
//!
//! Keeps the same handle and binding rules as `WgpuContext` and records every
//! draw call so tests can assert on what would have been drawn.

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::{Mat4, Vec3};

use crate::error::MisuseError;

use super::reflect::{reflect_program, ProgramLayout};
use super::{
    AttribSlot, BufferId, ContextProvider, GfxError, GraphicsContext, PrimitiveKind, ProgramCompiler,
    ProgramId, ProgramSource, UniformKind, UniformSlot,
};

/// A uniform value as last written by the caller.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Vec3(Vec3),
    Mat4(Mat4),
}

/// Allocation counters.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ContextStats {
    pub buffers_created: usize,
    pub buffers_deleted: usize,
    pub programs_compiled: usize,
    pub programs_deleted: usize,
}

impl ContextStats {
    pub fn live_buffers(&self) -> usize {
        self.buffers_created - self.buffers_deleted
    }
}

/// One recorded `draw_arrays` call.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub program: ProgramId,
    pub kind: PrimitiveKind,
    pub count: u32,
    /// Bound attributes at draw time, sorted by slot.
    pub attributes: Vec<(AttribSlot, BufferId)>,
    /// Named uniform values at draw time.
    pub uniforms: Vec<(String, UniformValue)>,
}

impl DrawRecord {
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn matrix(&self, name: &str) -> Option<Mat4> {
        match self.uniform(name)? {
            UniformValue::Mat4(m) => Some(m),
            UniformValue::Vec3(_) => None,
        }
    }

    pub fn vector(&self, name: &str) -> Option<Vec3> {
        match self.uniform(name)? {
            UniformValue::Vec3(v) => Some(v),
            UniformValue::Mat4(_) => None,
        }
    }

    /// Clip-space matrix the draw was issued with.
    pub fn to_clip(&self) -> Option<Mat4> {
        self.matrix("to_clipping_space")
    }

    pub fn buffer_at(&self, slot: AttribSlot) -> Option<BufferId> {
        self.attributes
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, b)| *b)
    }
}

#[derive(Debug)]
struct HeadlessProgram {
    label: String,
    layout: ProgramLayout,
    values: BTreeMap<u32, UniformValue>,
}

/// Graphics context that records instead of drawing.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    next_id: u32,
    /// Live buffers with their length in floats.
    buffers: HashMap<BufferId, usize>,
    programs: HashMap<ProgramId, HeadlessProgram>,
    current: Option<ProgramId>,
    bound: BTreeMap<AttribSlot, BufferId>,
    stats: ContextStats,
    draws: Vec<DrawRecord>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ContextStats {
        self.stats
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Returns and forgets the draws recorded so far.
    pub fn take_draws(&mut self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.draws)
    }

    pub fn is_live(&self, buffer: BufferId) -> bool {
        self.buffers.contains_key(&buffer)
    }

    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current
    }

    /// Length in floats of a live buffer.
    pub fn buffer_len(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.get(&buffer).copied()
    }

    pub fn program_label(&self, program: ProgramId) -> Option<&str> {
        self.programs.get(&program).map(|p| p.label.as_str())
    }

    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn current_program_mut(&mut self) -> Result<&mut HeadlessProgram, GfxError> {
        let id = self.current.ok_or(MisuseError::NoProgramBound)?;
        self.programs
            .get_mut(&id)
            .ok_or_else(|| MisuseError::UnknownProgram(id).into())
    }

    fn write_uniform(
        &mut self,
        slot: UniformSlot,
        expected: UniformKind,
        value: UniformValue,
    ) -> Result<(), GfxError> {
        if slot.kind != expected {
            return Err(GfxError::UniformType {
                offset: slot.offset,
                expected: slot.kind.name(),
                found: expected.name(),
            });
        }
        let program = self.current_program_mut()?;
        program.values.insert(slot.offset, value);
        Ok(())
    }
}

impl GraphicsContext for HeadlessContext {
    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> Result<BufferId, GfxError> {
        if data.is_empty() {
            return Err(GfxError::InvalidBufferSize {
                label: label.to_string(),
                len: 0,
            });
        }
        let id = BufferId(self.alloc_id());
        self.buffers.insert(id, data.len());
        self.stats.buffers_created += 1;
        log::trace!("headless: buffer {id:?} `{label}` ({} floats)", data.len());
        Ok(id)
    }

    fn delete_buffer(&mut self, buffer: BufferId) -> Result<(), GfxError> {
        if self.buffers.remove(&buffer).is_none() {
            return Err(MisuseError::StaleBuffer(buffer).into());
        }
        self.bound.retain(|_, b| *b != buffer);
        self.stats.buffers_deleted += 1;
        Ok(())
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttribSlot> {
        let p = self.programs.get(&program)?;
        p.layout.attribute(name).map(|a| AttribSlot(a.location))
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformSlot> {
        let p = self.programs.get(&program)?;
        p.layout.uniform(name).map(|m| UniformSlot {
            offset: m.offset,
            kind: m.kind,
        })
    }

    fn use_program(&mut self, program: ProgramId) -> Result<(), GfxError> {
        if !self.programs.contains_key(&program) {
            return Err(MisuseError::UnknownProgram(program).into());
        }
        self.current = Some(program);
        Ok(())
    }

    fn set_uniform_mat4(&mut self, slot: UniformSlot, value: &Mat4) -> Result<(), GfxError> {
        self.write_uniform(slot, UniformKind::Mat4, UniformValue::Mat4(*value))
    }

    fn set_uniform_vec3(&mut self, slot: UniformSlot, value: Vec3) -> Result<(), GfxError> {
        self.write_uniform(slot, UniformKind::Vec3, UniformValue::Vec3(value))
    }

    fn bind_attribute(
        &mut self,
        slot: AttribSlot,
        buffer: BufferId,
        components: u32,
    ) -> Result<(), GfxError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(MisuseError::StaleBuffer(buffer).into());
        }
        let program = self.current_program_mut()?;
        match program.layout.attribute_at(slot.0) {
            Some(input) if input.components == components => {}
            Some(_) | None => return Err(GfxError::UnknownAttribute(slot.0)),
        }
        self.bound.insert(slot, buffer);
        Ok(())
    }

    fn draw_arrays(&mut self, kind: PrimitiveKind, count: u32) -> Result<(), GfxError> {
        let bound = std::mem::take(&mut self.bound);
        let program_id = self.current.ok_or(MisuseError::NoProgramBound)?;
        let program = self
            .programs
            .get(&program_id)
            .ok_or(MisuseError::UnknownProgram(program_id))?;

        if let Some(stale) = bound.values().find(|b| !self.buffers.contains_key(b)) {
            return Err(MisuseError::StaleBuffer(*stale).into());
        }

        let uniforms = program
            .layout
            .uniforms
            .iter()
            .flat_map(|block| block.members.iter())
            .filter_map(|m| {
                program
                    .values
                    .get(&m.offset)
                    .map(|v| (m.name.clone(), *v))
            })
            .collect();

        log::trace!(
            "headless: draw {} x{count} with `{}`",
            kind.label(),
            program.label
        );

        self.draws.push(DrawRecord {
            program: program_id,
            kind,
            count,
            attributes: bound.into_iter().collect(),
            uniforms,
        });
        Ok(())
    }
}

impl ProgramCompiler for HeadlessContext {
    fn compile(&mut self, source: &ProgramSource) -> Result<ProgramId, GfxError> {
        let layout = reflect_program(source)?;
        let id = ProgramId(self.alloc_id());
        self.programs.insert(
            id,
            HeadlessProgram {
                label: source.label.to_string(),
                layout,
                values: BTreeMap::new(),
            },
        );
        self.stats.programs_compiled += 1;
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) -> Result<(), GfxError> {
        if self.programs.remove(&program).is_none() {
            return Err(MisuseError::UnknownProgram(program).into());
        }
        if self.current == Some(program) {
            self.current = None;
        }
        self.stats.programs_deleted += 1;
        Ok(())
    }
}

/// Hands out fresh `HeadlessContext`s, optionally refusing named surfaces.
#[derive(Debug, Default, Clone)]
pub struct HeadlessProvider {
    refused: HashSet<String>,
}

impl HeadlessProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `context(surface)` return `None` for this surface.
    pub fn refusing(mut self, surface: impl Into<String>) -> Self {
        self.refused.insert(surface.into());
        self
    }
}

impl ContextProvider for HeadlessProvider {
    type Context = HeadlessContext;

    fn context(&mut self, surface: &str) -> Option<HeadlessContext> {
        if self.refused.contains(surface) {
            return None;
        }
        Some(HeadlessContext::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::builtin;

    fn flat(ctx: &mut HeadlessContext) -> ProgramId {
        ctx.compile(&builtin::color_per_vertex()).unwrap()
    }

    // ── buffers ───────────────────────────────────────────────────────────

    #[test]
    fn create_and_delete_updates_stats() {
        let mut ctx = HeadlessContext::new();
        let a = ctx.create_vertex_buffer("a", &[0.0; 9]).unwrap();
        let b = ctx.create_vertex_buffer("b", &[0.0; 3]).unwrap();
        assert_ne!(a, b);
        assert_eq!(ctx.buffer_len(a), Some(9));

        ctx.delete_buffer(a).unwrap();
        let stats = ctx.stats();
        assert_eq!(stats.buffers_created, 2);
        assert_eq!(stats.buffers_deleted, 1);
        assert_eq!(stats.live_buffers(), 1);
        assert!(!ctx.is_live(a));
    }

    #[test]
    fn double_delete_is_stale() {
        let mut ctx = HeadlessContext::new();
        let a = ctx.create_vertex_buffer("a", &[1.0, 2.0, 3.0]).unwrap();
        ctx.delete_buffer(a).unwrap();
        let err = ctx.delete_buffer(a).unwrap_err();
        assert_eq!(err, GfxError::Misuse(MisuseError::StaleBuffer(a)));
    }

    #[test]
    fn empty_buffer_rejected() {
        let mut ctx = HeadlessContext::new();
        assert!(matches!(
            ctx.create_vertex_buffer("empty", &[]),
            Err(GfxError::InvalidBufferSize { len: 0, .. })
        ));
    }

    // ── draws ─────────────────────────────────────────────────────────────

    #[test]
    fn draw_records_bindings_and_uniforms() {
        let mut ctx = HeadlessContext::new();
        let program = flat(&mut ctx);
        let buf = ctx.create_vertex_buffer("pos", &[0.0; 9]).unwrap();

        ctx.use_program(program).unwrap();
        let pos = ctx.attribute_location(program, "position").unwrap();
        let clip = ctx.uniform_location(program, "to_clipping_space").unwrap();
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        ctx.set_uniform_mat4(clip, &m).unwrap();
        ctx.bind_attribute(pos, buf, 3).unwrap();
        ctx.draw_arrays(PrimitiveKind::Triangles, 3).unwrap();

        let draw = &ctx.draws()[0];
        assert_eq!(draw.kind, PrimitiveKind::Triangles);
        assert_eq!(draw.count, 3);
        assert_eq!(draw.buffer_at(pos), Some(buf));
        assert_eq!(draw.to_clip(), Some(m));
    }

    #[test]
    fn bindings_cleared_after_draw() {
        let mut ctx = HeadlessContext::new();
        let program = flat(&mut ctx);
        let buf = ctx.create_vertex_buffer("pos", &[0.0; 3]).unwrap();
        ctx.use_program(program).unwrap();
        ctx.bind_attribute(AttribSlot(0), buf, 3).unwrap();
        ctx.draw_arrays(PrimitiveKind::Points, 1).unwrap();
        ctx.draw_arrays(PrimitiveKind::Points, 1).unwrap();

        assert_eq!(ctx.draws()[0].attributes.len(), 1);
        assert!(ctx.draws()[1].attributes.is_empty());
    }

    #[test]
    fn draw_without_program_is_misuse() {
        let mut ctx = HeadlessContext::new();
        let err = ctx.draw_arrays(PrimitiveKind::Lines, 2).unwrap_err();
        assert_eq!(err, GfxError::Misuse(MisuseError::NoProgramBound));
    }

    #[test]
    fn binding_freed_buffer_is_stale() {
        let mut ctx = HeadlessContext::new();
        let program = flat(&mut ctx);
        let buf = ctx.create_vertex_buffer("pos", &[0.0; 3]).unwrap();
        ctx.delete_buffer(buf).unwrap();
        ctx.use_program(program).unwrap();
        let err = ctx.bind_attribute(AttribSlot(0), buf, 3).unwrap_err();
        assert_eq!(err, GfxError::Misuse(MisuseError::StaleBuffer(buf)));
    }

    #[test]
    fn uniform_type_mismatch() {
        let mut ctx = HeadlessContext::new();
        let program = flat(&mut ctx);
        ctx.use_program(program).unwrap();
        let clip = ctx.uniform_location(program, "to_clipping_space").unwrap();
        let err = ctx.set_uniform_vec3(clip, Vec3::ONE).unwrap_err();
        assert!(matches!(err, GfxError::UniformType { offset: 0, .. }));
    }

    #[test]
    fn undeclared_attribute_rejected() {
        let mut ctx = HeadlessContext::new();
        let program = flat(&mut ctx);
        let buf = ctx.create_vertex_buffer("x", &[0.0; 3]).unwrap();
        ctx.use_program(program).unwrap();
        let err = ctx.bind_attribute(AttribSlot(7), buf, 3).unwrap_err();
        assert_eq!(err, GfxError::UnknownAttribute(7));
    }

    // ── programs ──────────────────────────────────────────────────────────

    #[test]
    fn deleting_current_program_unbinds_it() {
        let mut ctx = HeadlessContext::new();
        let program = flat(&mut ctx);
        ctx.use_program(program).unwrap();
        ctx.delete_program(program).unwrap();
        assert_eq!(ctx.current_program(), None);
        assert_eq!(ctx.stats().programs_deleted, 1);
        assert!(ctx.use_program(program).is_err());
    }

    // ── provider ──────────────────────────────────────────────────────────

    #[test]
    fn provider_refuses_configured_surface() {
        let mut provider = HeadlessProvider::new().refusing("left");
        assert!(provider.context("left").is_none());
        assert!(provider.context("right").is_some());
    }
}
