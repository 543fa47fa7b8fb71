use std::rc::Rc;

use crate::error::SceneError;
use crate::gfx::{GfxError, ProgramId, ProgramSource, RenderContext};

use super::binder::ShaderBinding;
use super::builtin::ShadingMode;

/// A compiled program together with its resolved slots.
///
/// Shared by every part drawn with it.
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    binding: ShaderBinding,
}

impl ShaderProgram {
    /// Compiles `source` and resolves the slots `mode` requires.
    ///
    /// A program missing a required slot is deleted again before the
    /// binding failure is returned.
    pub fn compile<C>(
        ctx: &mut C,
        source: &ProgramSource,
        mode: ShadingMode,
    ) -> Result<Rc<Self>, SceneError>
    where
        C: RenderContext + ?Sized,
    {
        let id = ctx.compile(source)?;
        match ShaderBinding::resolve(&*ctx, id, mode) {
            Ok(binding) => {
                log::debug!("program `{}` ready ({mode:?})", source.label);
                Ok(Rc::new(Self {
                    label: source.label.to_string(),
                    binding,
                }))
            }
            Err(missing) => {
                log::warn!("program `{}`: {missing}", source.label);
                if let Err(err) = ctx.delete_program(id) {
                    log::warn!("deleting program `{}`: {err}", source.label);
                }
                Err(missing.into())
            }
        }
    }

    /// Compiles the bundled program for `mode`.
    pub fn builtin<C>(ctx: &mut C, mode: ShadingMode) -> Result<Rc<Self>, SceneError>
    where
        C: RenderContext + ?Sized,
    {
        Self::compile(ctx, &mode.source(), mode)
    }

    pub fn id(&self) -> ProgramId {
        self.binding.program
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn mode(&self) -> ShadingMode {
        self.binding.mode
    }

    pub fn binding(&self) -> &ShaderBinding {
        &self.binding
    }

    pub fn delete<C>(&self, ctx: &mut C) -> Result<(), GfxError>
    where
        C: RenderContext + ?Sized,
    {
        log::debug!("deleting program `{}`", self.label);
        ctx.delete_program(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InitError, MissingSlot};
    use crate::gfx::HeadlessContext;

    #[test]
    fn builtin_programs_compile() {
        let mut ctx = HeadlessContext::new();
        let flat = ShaderProgram::builtin(&mut ctx, ShadingMode::Flat).unwrap();
        let lit = ShaderProgram::builtin(&mut ctx, ShadingMode::ColoredLight).unwrap();
        assert_ne!(flat.id(), lit.id());
        assert_eq!(lit.mode(), ShadingMode::ColoredLight);
        assert_eq!(ctx.live_program_count(), 2);
    }

    #[test]
    fn binding_failure_deletes_program() {
        let mut ctx = HeadlessContext::new();
        let err = ShaderProgram::compile(
            &mut ctx,
            &ShadingMode::Flat.source(),
            ShadingMode::ColoredLight,
        )
        .unwrap_err();

        assert!(matches!(err, SceneError::Binding(MissingSlot { name: "normal", .. })));
        assert_eq!(ctx.live_program_count(), 0);
    }

    #[test]
    fn compile_failure_is_init_error() {
        let mut ctx = HeadlessContext::new();
        let src = ProgramSource::new("bad", "@vertex fn vs_main(");
        let err = ShaderProgram::compile(&mut ctx, &src, ShadingMode::Flat).unwrap_err();
        assert!(matches!(err, SceneError::Init(InitError::Compile { label, .. }) if label == "bad"));
    }
}
