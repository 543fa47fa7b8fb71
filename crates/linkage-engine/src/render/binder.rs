use crate::error::MissingSlot;
use crate::geometry::GroupBuffers;
use crate::gfx::{AttribSlot, GfxError, GraphicsContext, ProgramId, UniformSlot};

use super::builtin::ShadingMode;

/// Attribute names looked up in every program.
pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";
pub const COLOR: &str = "color";

/// Uniform names looked up in every program.
pub const TO_CLIPPING_SPACE: &str = "to_clipping_space";
pub const TO_CAMERA_SPACE: &str = "to_camera_space";
pub const LIGHT_POSITION: &str = "light_position";
pub const LIGHT_COLOR: &str = "light_color";

/// Slots of one program, resolved once after compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBinding {
    pub program: ProgramId,
    pub mode: ShadingMode,

    pub position: AttribSlot,
    pub normal: Option<AttribSlot>,
    pub color: Option<AttribSlot>,

    pub to_clipping_space: UniformSlot,
    pub to_camera_space: Option<UniformSlot>,
    pub light_position: Option<UniformSlot>,
    pub light_color: Option<UniformSlot>,
}

impl ShaderBinding {
    /// Looks up every slot `mode` needs.
    ///
    /// `position` and `to_clipping_space` are always required; colored light
    /// also requires `normal` and `to_camera_space`. Other slots may be absent.
    pub fn resolve<C>(ctx: &C, program: ProgramId, mode: ShadingMode) -> Result<Self, MissingSlot>
    where
        C: GraphicsContext + ?Sized,
    {
        let missing = |name| MissingSlot { program, name };
        let lit = mode == ShadingMode::ColoredLight;

        let position = ctx
            .attribute_location(program, POSITION)
            .ok_or_else(|| missing(POSITION))?;
        let to_clipping_space = ctx
            .uniform_location(program, TO_CLIPPING_SPACE)
            .ok_or_else(|| missing(TO_CLIPPING_SPACE))?;

        let normal = ctx.attribute_location(program, NORMAL);
        let to_camera_space = ctx.uniform_location(program, TO_CAMERA_SPACE);
        if lit {
            normal.ok_or_else(|| missing(NORMAL))?;
            to_camera_space.ok_or_else(|| missing(TO_CAMERA_SPACE))?;
        }

        Ok(Self {
            program,
            mode,
            position,
            normal,
            color: ctx.attribute_location(program, COLOR),
            to_clipping_space,
            to_camera_space,
            light_position: ctx.uniform_location(program, LIGHT_POSITION),
            light_color: ctx.uniform_location(program, LIGHT_COLOR),
        })
    }

    /// Binds the group's buffers to their slots and draws the whole group.
    ///
    /// The program must already be in use. Arrays whose slot is not declared
    /// by the program are skipped.
    pub fn bind_and_draw<C>(&self, ctx: &mut C, group: &GroupBuffers) -> Result<(), GfxError>
    where
        C: GraphicsContext + ?Sized,
    {
        if group.element_count == 0 {
            return Ok(());
        }

        ctx.bind_attribute(self.position, group.positions, 3)?;
        if let (Some(slot), Some(buffer)) = (self.normal, group.normals) {
            ctx.bind_attribute(slot, buffer, 3)?;
        }
        if let (Some(slot), Some(buffer)) = (self.color, group.colors) {
            ctx.bind_attribute(slot, buffer, 3)?;
        }

        log::trace!("draw {} x{}", group.kind.label(), group.element_count);
        ctx.draw_arrays(group.kind, group.element_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{primitives, GeometryBuffer};
    use crate::gfx::{HeadlessContext, PrimitiveKind, ProgramCompiler, ProgramSource};
    use crate::render::builtin;

    // ── resolve ───────────────────────────────────────────────────────────

    #[test]
    fn flat_program_tolerates_missing_normal() {
        let mut ctx = HeadlessContext::new();
        let program = ctx.compile(&builtin::color_per_vertex()).unwrap();
        let binding = ShaderBinding::resolve(&ctx, program, ShadingMode::Flat).unwrap();
        assert_eq!(binding.position, AttribSlot(0));
        assert!(binding.normal.is_none());
        assert!(binding.color.is_some());
    }

    #[test]
    fn lit_mode_requires_normal() {
        let mut ctx = HeadlessContext::new();
        let program = ctx.compile(&builtin::color_per_vertex()).unwrap();
        let err = ShaderBinding::resolve(&ctx, program, ShadingMode::ColoredLight).unwrap_err();
        assert_eq!(err, MissingSlot { program, name: NORMAL });
    }

    #[test]
    fn missing_position_is_binding_failure() {
        let mut ctx = HeadlessContext::new();
        let src = ProgramSource::new(
            "no-position",
            "struct U { to_clipping_space: mat4x4<f32> };
            @group(0) @binding(0) var<uniform> u: U;
            @vertex fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
                return u.to_clipping_space * vec4<f32>(pos, 1.0);
            }
            @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        );
        let program = ctx.compile(&src).unwrap();
        let err = ShaderBinding::resolve(&ctx, program, ShadingMode::Flat).unwrap_err();
        assert_eq!(err.name, POSITION);
    }

    #[test]
    fn lit_program_resolves_light_uniforms() {
        let mut ctx = HeadlessContext::new();
        let program = ctx.compile(&builtin::colored_light()).unwrap();
        let binding = ShaderBinding::resolve(&ctx, program, ShadingMode::ColoredLight).unwrap();
        assert!(binding.light_position.is_some());
        assert!(binding.light_color.is_some());
        assert_eq!(binding.to_camera_space.map(|s| s.offset), Some(64));
    }

    // ── bind_and_draw ─────────────────────────────────────────────────────

    #[test]
    fn draw_sized_to_element_count() {
        let mut ctx = HeadlessContext::new();
        let program = ctx.compile(&builtin::color_per_vertex()).unwrap();
        let binding = ShaderBinding::resolve(&ctx, program, ShadingMode::Flat).unwrap();
        let geometry =
            GeometryBuffer::upload(&mut ctx, &primitives::axes_model("axes", 1.0)).unwrap();

        ctx.use_program(program).unwrap();
        let lines = geometry.group(PrimitiveKind::Lines).unwrap();
        binding.bind_and_draw(&mut ctx, lines).unwrap();

        let draw = &ctx.draws()[0];
        assert_eq!(draw.count, 6);
        assert_eq!(draw.buffer_at(binding.position), Some(lines.positions));
        assert_eq!(draw.buffer_at(binding.color.unwrap()), lines.colors);

        geometry.release(&mut ctx);
    }
}
