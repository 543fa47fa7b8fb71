//! `wgpu` backend.
//!
//! GL-style calls are recorded as commands: each `draw_arrays` snapshots the
//! program, topology, bound buffers and the program's uniform block. `flush`
//! packs every snapshot into one dynamic-offset uniform buffer and encodes the
//! frame as a single render pass with depth testing.

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU64;

use glam::{Mat4, Vec3};

use crate::device::Gpu;
use crate::error::MisuseError;
use crate::render::RenderTarget;

use super::reflect::{reflect_program, ProgramLayout};
use super::{
    AttribSlot, BufferId, ContextProvider, GfxError, GraphicsContext, PrimitiveKind, ProgramCompiler,
    ProgramId, ProgramSource, UniformKind, UniformSlot,
};

/// Zeroed data read by shader inputs that have no buffer bound.
const FALLBACK_BYTES: u64 = 16;

struct GpuProgram {
    label: String,
    layout: ProgramLayout,
    module: wgpu::ShaderModule,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,
    /// CPU copy of the uniform block, snapshotted by every draw.
    uniform_data: Vec<u8>,
}

struct DrawCommand {
    program: ProgramId,
    kind: PrimitiveKind,
    count: u32,
    /// Bound buffers keyed by shader location.
    attributes: BTreeMap<u32, wgpu::Buffer>,
    uniforms: Vec<u8>,
}

/// Draws recorded for the frame being built, plus the attribute bindings of
/// the draw in progress.
#[derive(Default)]
struct FrameQueue {
    commands: Vec<DrawCommand>,
    bound: BTreeMap<u32, BufferId>,
}

impl FrameQueue {
    fn len(&self) -> usize {
        self.commands.len()
    }

    fn bind(&mut self, location: u32, buffer: BufferId) {
        self.bound.insert(location, buffer);
    }

    fn unbind_buffer(&mut self, buffer: BufferId) {
        self.bound.retain(|_, b| *b != buffer);
    }

    /// Bindings of the draw being issued; cleared for the next one.
    fn take_bound(&mut self) -> BTreeMap<u32, BufferId> {
        std::mem::take(&mut self.bound)
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Hands the recorded draws to a flush and starts an empty frame.
    fn take(&mut self) -> Vec<DrawCommand> {
        self.bound.clear();
        std::mem::take(&mut self.commands)
    }

    /// Drops everything recorded so far; returns how many draws were dropped.
    fn discard(&mut self) -> usize {
        self.take().len()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    program: ProgramId,
    kind: PrimitiveKind,
    /// Bit `i` set when location `i` has a bound buffer.
    bound_mask: u32,
}

/// Graphics context backed by a `wgpu` device.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    uniform_align: u64,

    next_id: u32,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    programs: HashMap<ProgramId, GpuProgram>,
    current: Option<ProgramId>,
    frame: FrameQueue,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    fallback: wgpu::Buffer,
    uniform_ring: Option<wgpu::Buffer>,
    uniform_capacity: u64,
}

impl WgpuContext {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let uniform_align = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let fallback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("linkage fallback attribute"),
            size: FALLBACK_BYTES,
            usage: wgpu::BufferUsages::VERTEX,
            // Buffers are zero-initialized by wgpu.
            mapped_at_creation: false,
        });

        Self {
            device,
            queue,
            color_format,
            depth_format,
            uniform_align,
            next_id: 0,
            buffers: HashMap::new(),
            programs: HashMap::new(),
            current: None,
            frame: FrameQueue::default(),
            pipelines: HashMap::new(),
            fallback,
            uniform_ring: None,
            uniform_capacity: 0,
        }
    }

    /// Number of draws recorded since the last flush.
    pub fn pending_draws(&self) -> usize {
        self.frame.len()
    }

    /// Drops draws recorded for a frame that was never presented.
    ///
    /// Call before recording a new frame: when surface acquisition fails the
    /// flush never runs and the previous frame's draws would otherwise be
    /// encoded together with the next one.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.frame.discard();
        if dropped > 0 {
            log::debug!("discarded {dropped} draws from an unpresented frame");
        }
        dropped
    }

    /// Encodes every recorded draw into one render pass on `target`.
    ///
    /// The color attachment is cleared to `clear` and the depth attachment to
    /// 1.0 first, so a flush with no draws still clears the frame.
    pub fn flush(&mut self, target: &mut RenderTarget<'_>, clear: wgpu::Color) {
        let commands = self.frame.take();

        for cmd in &commands {
            let key = PipelineKey {
                program: cmd.program,
                kind: cmd.kind,
                bound_mask: cmd.attributes.keys().fold(0u32, |m, loc| m | (1 << loc)),
            };
            if !self.pipelines.contains_key(&key) {
                if let Some(pipeline) = self.build_pipeline(key) {
                    self.pipelines.insert(key, pipeline);
                }
            }
        }

        // Pack uniform snapshots at aligned offsets.
        let mut offsets = Vec::with_capacity(commands.len());
        let mut staging: Vec<u8> = Vec::new();
        for cmd in &commands {
            let offset = align_up(staging.len() as u64, self.uniform_align);
            staging.resize(offset as usize, 0);
            staging.extend_from_slice(&cmd.uniforms);
            offsets.push(offset);
        }
        if !staging.is_empty() {
            self.ensure_uniform_capacity(staging.len() as u64);
            if let Some(ring) = &self.uniform_ring {
                self.queue.write_buffer(ring, 0, &staging);
            }
        }

        let bind_groups = self.uniform_bind_groups(&commands);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("linkage scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (cmd, offset) in commands.iter().zip(&offsets) {
            if cmd.count == 0 {
                continue;
            }
            let key = PipelineKey {
                program: cmd.program,
                kind: cmd.kind,
                bound_mask: cmd.attributes.keys().fold(0u32, |m, loc| m | (1 << loc)),
            };
            let (Some(pipeline), Some(program)) =
                (self.pipelines.get(&key), self.programs.get(&cmd.program))
            else {
                continue;
            };

            rpass.set_pipeline(pipeline);
            if let Some(bg) = bind_groups.get(&cmd.program) {
                rpass.set_bind_group(0, bg, &[*offset as u32]);
            }
            for (slot, input) in program.layout.attributes.iter().enumerate() {
                let buffer = cmd.attributes.get(&input.location).unwrap_or(&self.fallback);
                rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
            }
            rpass.draw(0..cmd.count, 0..1);
        }

        log::trace!("flushed {} draws", commands.len());
    }

    fn ensure_uniform_capacity(&mut self, required: u64) {
        if self.uniform_ring.is_some() && required <= self.uniform_capacity {
            return;
        }
        let capacity = required.next_power_of_two().max(4096);
        self.uniform_ring = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("linkage uniform ring"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.uniform_capacity = capacity;
    }

    fn uniform_bind_groups(&self, commands: &[DrawCommand]) -> HashMap<ProgramId, wgpu::BindGroup> {
        let mut groups = HashMap::new();
        let Some(ring) = &self.uniform_ring else {
            return groups;
        };
        for cmd in commands {
            if groups.contains_key(&cmd.program) {
                continue;
            }
            let Some(program) = self.programs.get(&cmd.program) else { continue };
            let (Some(bgl), Some(block)) = (&program.bind_group_layout, &program.layout.uniforms)
            else {
                continue;
            };
            let bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("linkage uniform bind group"),
                layout: bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: block.binding,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: ring,
                        offset: 0,
                        size: NonZeroU64::new(u64::from(block.size)),
                    }),
                }],
            });
            groups.insert(cmd.program, bg);
        }
        groups
    }

    fn build_pipeline(&self, key: PipelineKey) -> Option<wgpu::RenderPipeline> {
        let program = self.programs.get(&key.program)?;

        let attrs: Vec<[wgpu::VertexAttribute; 1]> = program
            .layout
            .attributes
            .iter()
            .map(|input| {
                [wgpu::VertexAttribute {
                    format: vertex_format(input.components),
                    offset: 0,
                    shader_location: input.location,
                }]
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = program
            .layout
            .attributes
            .iter()
            .zip(&attrs)
            .map(|(input, attr)| {
                let bound = key.bound_mask & (1 << input.location) != 0;
                wgpu::VertexBufferLayout {
                    array_stride: if bound {
                        u64::from(input.components) * 4
                    } else {
                        FALLBACK_BYTES
                    },
                    step_mode: if bound {
                        wgpu::VertexStepMode::Vertex
                    } else {
                        wgpu::VertexStepMode::Instance
                    },
                    attributes: attr,
                }
            })
            .collect();

        log::debug!(
            "building pipeline for `{}` ({}, mask {:#b})",
            program.label,
            key.kind.label(),
            key.bound_mask
        );

        Some(self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("linkage pipeline"),
            layout: Some(&program.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &program.module,
                entry_point: Some(ProgramSource::VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.module,
                entry_point: Some(ProgramSource::FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: topology(key.kind),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: self.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }))
    }

    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn current_program_mut(&mut self) -> Result<&mut GpuProgram, GfxError> {
        let id = self.current.ok_or(MisuseError::NoProgramBound)?;
        self.programs
            .get_mut(&id)
            .ok_or_else(|| MisuseError::UnknownProgram(id).into())
    }

    fn write_uniform(
        &mut self,
        slot: UniformSlot,
        found: UniformKind,
        bytes: &[u8],
    ) -> Result<(), GfxError> {
        if slot.kind != found {
            return Err(GfxError::UniformType {
                offset: slot.offset,
                expected: slot.kind.name(),
                found: found.name(),
            });
        }
        let program = self.current_program_mut()?;
        let start = slot.offset as usize;
        let Some(dst) = program.uniform_data.get_mut(start..start + bytes.len()) else {
            return Err(GfxError::UniformType {
                offset: slot.offset,
                expected: "member inside the uniform block",
                found: found.name(),
            });
        };
        dst.copy_from_slice(bytes);
        Ok(())
    }
}

impl GraphicsContext for WgpuContext {
    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> Result<BufferId, GfxError> {
        if data.is_empty() {
            return Err(GfxError::InvalidBufferSize {
                label: label.to_string(),
                len: 0,
            });
        }
        use wgpu::util::DeviceExt;
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = BufferId(self.alloc_id());
        self.buffers.insert(id, buffer);
        Ok(id)
    }

    fn delete_buffer(&mut self, buffer: BufferId) -> Result<(), GfxError> {
        // Recorded draws hold their own reference; the allocation goes away
        // once the last one is flushed.
        if self.buffers.remove(&buffer).is_none() {
            return Err(MisuseError::StaleBuffer(buffer).into());
        }
        self.frame.unbind_buffer(buffer);
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
        let cols = value.to_cols_array();
        self.write_uniform(slot, UniformKind::Mat4, bytemuck::cast_slice(&cols))
    }

    fn set_uniform_vec3(&mut self, slot: UniformSlot, value: Vec3) -> Result<(), GfxError> {
        let v = value.to_array();
        self.write_uniform(slot, UniformKind::Vec3, bytemuck::cast_slice(&v))
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
            Some(input) if input.components == components && slot.0 < 32 => {}
            _ => return Err(GfxError::UnknownAttribute(slot.0)),
        }
        self.frame.bind(slot.0, buffer);
        Ok(())
    }

    fn draw_arrays(&mut self, kind: PrimitiveKind, count: u32) -> Result<(), GfxError> {
        let bound = self.frame.take_bound();
        let program_id = self.current.ok_or(MisuseError::NoProgramBound)?;
        let program = self
            .programs
            .get(&program_id)
            .ok_or(MisuseError::UnknownProgram(program_id))?;

        let mut attributes = BTreeMap::new();
        for (location, id) in bound {
            let buffer = self
                .buffers
                .get(&id)
                .ok_or(MisuseError::StaleBuffer(id))?;
            attributes.insert(location, buffer.clone());
        }

        self.frame.push(DrawCommand {
            program: program_id,
            kind,
            count,
            attributes,
            uniforms: program.uniform_data.clone(),
        });
        Ok(())
    }
}

impl ProgramCompiler for WgpuContext {
    fn compile(&mut self, source: &ProgramSource) -> Result<ProgramId, GfxError> {
        let layout = reflect_program(source)?;

        if let Some(block) = &layout.uniforms {
            if block.group != 0 {
                return Err(GfxError::Compile {
                    label: source.label.to_string(),
                    message: format!("uniform block must be in @group(0), found {}", block.group),
                });
            }
        }

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(source.label.as_ref()),
                source: wgpu::ShaderSource::Wgsl(source.wgsl.clone()),
            });

        let bind_group_layout = layout.uniforms.as_ref().map(|block| {
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("linkage uniform bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: block.binding,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: NonZeroU64::new(u64::from(block.size)),
                        },
                        count: None,
                    }],
                })
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> =
            bind_group_layout.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("linkage pipeline layout"),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            });

        let uniform_data = vec![0u8; layout.uniform_size()];
        let id = ProgramId(self.alloc_id());
        log::debug!("compiled program `{}` as {id:?}", source.label);

        self.programs.insert(
            id,
            GpuProgram {
                label: source.label.to_string(),
                layout,
                module,
                bind_group_layout,
                pipeline_layout,
                uniform_data,
            },
        );
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) -> Result<(), GfxError> {
        if self.programs.remove(&program).is_none() {
            return Err(MisuseError::UnknownProgram(program).into());
        }
        self.pipelines.retain(|key, _| key.program != program);
        if self.current == Some(program) {
            self.current = None;
        }
        Ok(())
    }
}

/// Hands out a `WgpuContext` for the window surface it was created for.
pub struct WgpuProvider {
    surface: String,
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
}

impl WgpuProvider {
    pub fn new(gpu: &Gpu<'_>, surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            device: gpu.device().clone(),
            queue: gpu.queue().clone(),
            color_format: gpu.surface_format(),
            depth_format: gpu.depth_format(),
        }
    }
}

impl ContextProvider for WgpuProvider {
    type Context = WgpuContext;

    fn context(&mut self, surface: &str) -> Option<WgpuContext> {
        if surface != self.surface {
            log::debug!("no wgpu surface named `{surface}` (have `{}`)", self.surface);
            return None;
        }
        Some(WgpuContext::new(
            self.device.clone(),
            self.queue.clone(),
            self.color_format,
            self.depth_format,
        ))
    }
}

fn align_up(value: u64, align: u64) -> u64 {
    if align <= 1 {
        return value;
    }
    value.div_ceil(align) * align
}

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn topology(kind: PrimitiveKind) -> wgpu::PrimitiveTopology {
    match kind {
        PrimitiveKind::Points => wgpu::PrimitiveTopology::PointList,
        PrimitiveKind::Lines => wgpu::PrimitiveTopology::LineList,
        PrimitiveKind::Triangles => wgpu::PrimitiveTopology::TriangleList,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(program: u32, kind: PrimitiveKind, count: u32) -> DrawCommand {
        DrawCommand {
            program: ProgramId(program),
            kind,
            count,
            attributes: BTreeMap::new(),
            uniforms: vec![0; 64],
        }
    }

    // ── frame queue ───────────────────────────────────────────────────────

    #[test]
    fn discard_drops_unpresented_draws_and_bindings() {
        let mut frame = FrameQueue::default();
        frame.bind(0, BufferId(7));
        let bound = frame.take_bound();
        assert_eq!(bound.get(&0), Some(&BufferId(7)));
        frame.push(command(1, PrimitiveKind::Triangles, 36));
        frame.push(command(1, PrimitiveKind::Lines, 24));
        frame.bind(1, BufferId(9));

        assert_eq!(frame.discard(), 2);
        assert_eq!(frame.len(), 0);
        assert!(frame.take_bound().is_empty());

        // The next frame starts from nothing.
        frame.push(command(2, PrimitiveKind::Points, 8));
        let next = frame.take();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].program, ProgramId(2));
        assert_eq!(frame.len(), 0);
    }

    #[test]
    fn bindings_do_not_leak_into_next_draw() {
        let mut frame = FrameQueue::default();
        frame.bind(0, BufferId(1));
        frame.bind(2, BufferId(2));
        frame.unbind_buffer(BufferId(2));
        let first = frame.take_bound();
        assert_eq!(first.len(), 1);
        assert!(frame.take_bound().is_empty());
    }

    // ── helpers ───────────────────────────────────────────────────────────

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
        assert_eq!(align_up(13, 1), 13);
    }

    #[test]
    fn topology_per_kind() {
        assert_eq!(topology(PrimitiveKind::Points), wgpu::PrimitiveTopology::PointList);
        assert_eq!(topology(PrimitiveKind::Lines), wgpu::PrimitiveTopology::LineList);
        assert_eq!(
            topology(PrimitiveKind::Triangles),
            wgpu::PrimitiveTopology::TriangleList
        );
    }

    #[test]
    fn vertex_format_by_components() {
        assert_eq!(vertex_format(1), wgpu::VertexFormat::Float32);
        assert_eq!(vertex_format(3), wgpu::VertexFormat::Float32x3);
        assert_eq!(vertex_format(4), wgpu::VertexFormat::Float32x4);
    }
}
