use std::rc::Rc;

use glam::Mat4;

use crate::error::{MisuseError, SceneError};
use crate::geometry::ModelCatalog;
use crate::gfx::RenderContext;
use crate::render::{Light, RenderablePart, ShaderProgram, ShadingMode};

/// Whether a scene can still render.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Lifecycle {
    Live,
    TornDown,
}

/// Resources and state shared by every scene: parts in draw order, the
/// programs drawing them, the animate flag and the lifecycle.
#[derive(Debug)]
pub struct SceneCore {
    name: String,
    parts: Vec<RenderablePart>,
    programs: Vec<Rc<ShaderProgram>>,
    animate: bool,
    lifecycle: Lifecycle,
}

impl SceneCore {
    fn new(name: String, animate: bool) -> Self {
        Self {
            name,
            parts: Vec::new(),
            programs: Vec::new(),
            animate,
            lifecycle: Lifecycle::Live,
        }
    }

    /// Builds a core with `build`, which compiles programs and uploads parts.
    ///
    /// If `build` fails, everything it already allocated is released before
    /// the error is returned; no partially-built scene escapes.
    pub fn assemble<C, T, F>(
        ctx: &mut C,
        name: impl Into<String>,
        animate: bool,
        build: F,
    ) -> Result<(Self, T), SceneError>
    where
        C: RenderContext + ?Sized,
        F: FnOnce(&mut SceneCore, &mut C) -> Result<T, SceneError>,
    {
        let mut core = Self::new(name.into(), animate);
        match build(&mut core, ctx) {
            Ok(extra) => {
                log::info!(
                    "scene `{}` ready: {} parts, {} programs",
                    core.name,
                    core.parts.len(),
                    core.programs.len()
                );
                Ok((core, extra))
            }
            Err(err) => {
                log::warn!("scene `{}` failed to initialize: {err}", core.name);
                core.release_all(ctx);
                Err(err)
            }
        }
    }

    /// Returns the program for `mode`, compiling it on first use.
    pub fn program<C>(&mut self, ctx: &mut C, mode: ShadingMode) -> Result<Rc<ShaderProgram>, SceneError>
    where
        C: RenderContext + ?Sized,
    {
        if let Some(existing) = self.programs.iter().find(|p| p.mode() == mode) {
            return Ok(Rc::clone(existing));
        }
        let program = ShaderProgram::builtin(ctx, mode)?;
        self.programs.push(Rc::clone(&program));
        Ok(program)
    }

    /// Uploads catalog model `model` drawn with `mode` and returns its index
    /// in draw order.
    pub fn add_part<C>(
        &mut self,
        ctx: &mut C,
        catalog: &ModelCatalog,
        model: &str,
        mode: ShadingMode,
        light: Light,
    ) -> Result<usize, SceneError>
    where
        C: RenderContext + ?Sized,
    {
        let model = catalog.get(model)?;
        let program = self.program(ctx, mode)?;
        let part = RenderablePart::upload(ctx, model, program)?.with_light(light);
        log::debug!(
            "scene `{}`: part `{}` uploaded ({} buffers)",
            self.name,
            part.name(),
            part.geometry().handle_count()
        );
        self.parts.push(part);
        Ok(self.parts.len() - 1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parts(&self) -> &[RenderablePart] {
        &self.parts
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Live
    }

    pub fn animate_active(&self) -> bool {
        self.animate
    }

    /// Turning animation on after teardown has no effect.
    pub fn set_animate(&mut self, enabled: bool) {
        self.animate = enabled && self.is_live();
    }

    /// Fails once the scene has been torn down.
    pub fn ensure_live(&self) -> Result<(), MisuseError> {
        match self.lifecycle {
            Lifecycle::Live => Ok(()),
            Lifecycle::TornDown => Err(MisuseError::RenderAfterTeardown(self.name.clone())),
        }
    }

    /// Renders part `index` under `to_clip` (and `to_camera` for lit parts).
    ///
    /// `index` must come from [`add_part`](Self::add_part) on this core.
    pub fn draw<C>(
        &self,
        ctx: &mut C,
        index: usize,
        to_clip: &Mat4,
        to_camera: Option<&Mat4>,
    ) -> Result<(), SceneError>
    where
        C: RenderContext + ?Sized,
    {
        self.ensure_live()?;
        let part = &self.parts[index];
        log::trace!("scene `{}`: drawing `{}`", self.name, part.name());
        part.render(ctx, to_clip, to_camera)?;
        Ok(())
    }

    /// Releases every part and program, clears the animate flag and marks
    /// the scene torn down.
    pub fn teardown<C>(&mut self, ctx: &mut C) -> Result<(), SceneError>
    where
        C: RenderContext + ?Sized,
    {
        if self.lifecycle == Lifecycle::TornDown {
            return Err(MisuseError::DoubleTeardown(self.name.clone()).into());
        }
        let freed = self.release_all(ctx);
        log::info!("scene `{}` torn down ({freed} buffers freed)", self.name);
        Ok(())
    }

    fn release_all<C>(&mut self, ctx: &mut C) -> usize
    where
        C: RenderContext + ?Sized,
    {
        let freed = self.parts.drain(..).map(|part| part.release(ctx)).sum();
        for program in self.programs.drain(..) {
            if let Err(err) = program.delete(ctx) {
                log::warn!("scene `{}`: deleting program `{}`: {err}", self.name, program.label());
            }
        }
        self.animate = false;
        self.lifecycle = Lifecycle::TornDown;
        freed
    }
}

impl Drop for SceneCore {
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Live && !self.parts.is_empty() {
            log::warn!("scene `{}` dropped without teardown", self.name);
        }
    }
}
