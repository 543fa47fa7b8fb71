use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::geometry::{GeometryBuffer, Model};
use crate::gfx::{GfxError, GraphicsContext};

use super::builtin::ShadingMode;
use super::program::ShaderProgram;

/// Point light used by colored-light parts, in camera space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            color: Vec3::ONE,
        }
    }
}

/// One model on the GPU paired with the program that draws it.
///
/// A part is ready as soon as it exists; `release` consumes it.
#[derive(Debug)]
pub struct RenderablePart {
    name: String,
    geometry: GeometryBuffer,
    program: Rc<ShaderProgram>,
    light: Light,
}

impl RenderablePart {
    pub fn new(name: impl Into<String>, geometry: GeometryBuffer, program: Rc<ShaderProgram>) -> Self {
        Self {
            name: name.into(),
            geometry,
            program,
            light: Light::default(),
        }
    }

    /// Uploads `model` and wraps it into a part named after the model.
    pub fn upload<C>(ctx: &mut C, model: &Model, program: Rc<ShaderProgram>) -> Result<Self, GfxError>
    where
        C: GraphicsContext + ?Sized,
    {
        let geometry = GeometryBuffer::upload(ctx, model)?;
        Ok(Self::new(model.name(), geometry, program))
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = light;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    pub fn program(&self) -> &Rc<ShaderProgram> {
        &self.program
    }

    /// Draws every non-empty group in order points, lines, triangles.
    ///
    /// `to_camera` is only read by programs that declare a camera-space
    /// matrix; when omitted the identity is used.
    pub fn render<C>(
        &self,
        ctx: &mut C,
        to_clip: &Mat4,
        to_camera: Option<&Mat4>,
    ) -> Result<(), GfxError>
    where
        C: GraphicsContext + ?Sized,
    {
        let binding = self.program.binding();

        ctx.use_program(binding.program)?;
        ctx.set_uniform_mat4(binding.to_clipping_space, to_clip)?;

        if let Some(slot) = binding.to_camera_space {
            ctx.set_uniform_mat4(slot, to_camera.unwrap_or(&Mat4::IDENTITY))?;
        }
        if binding.mode == ShadingMode::ColoredLight {
            if let Some(slot) = binding.light_position {
                ctx.set_uniform_vec3(slot, self.light.position)?;
            }
            if let Some(slot) = binding.light_color {
                ctx.set_uniform_vec3(slot, self.light.color)?;
            }
        }

        for group in self.geometry.groups() {
            binding.bind_and_draw(ctx, group)?;
        }
        Ok(())
    }

    /// Frees the part's buffers. The shared program is left alone.
    pub fn release<C>(self, ctx: &mut C) -> usize
    where
        C: GraphicsContext + ?Sized,
    {
        log::debug!("releasing part `{}`", self.name);
        self.geometry.release(ctx)
    }
}
