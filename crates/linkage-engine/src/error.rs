//! Error taxonomy shared by the scene layer.
//!
//! - `InitError`: the scene could not be constructed; nothing renders.
//! - `MissingSlot`: a required shader slot is absent (binding failure).
//! - `MisuseError`: a contract violation by the caller (render after teardown,
//!   stale handles). Never retried.
//!
//! `SceneError` is the union returned by scene construction and frames.

use thiserror::Error;

use crate::geometry::ModelError;
use crate::gfx::{BufferId, GfxError, ProgramId};
use crate::transform::HierarchyError;

/// Scene construction failures. Reported once; the scene is never returned.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("no usable rendering context for surface `{0}`")]
    ContextUnavailable(String),

    #[error("model `{0}` not found in catalog")]
    MissingModel(String),

    #[error("shader program `{label}` failed to compile: {message}")]
    Compile { label: String, message: String },

    #[error(transparent)]
    InvalidModel(#[from] ModelError),

    #[error(transparent)]
    InvalidHierarchy(#[from] HierarchyError),
}

/// A required attribute or uniform is not declared by the program.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("required shader slot `{name}` is missing from program {program:?}")]
pub struct MissingSlot {
    pub program: ProgramId,
    pub name: &'static str,
}

/// Programmer contract violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MisuseError {
    #[error("scene `{0}` rendered after teardown")]
    RenderAfterTeardown(String),

    #[error("scene `{0}` torn down twice")]
    DoubleTeardown(String),

    #[error("buffer {0:?} is not live (already released or never allocated)")]
    StaleBuffer(BufferId),

    #[error("program {0:?} is not live")]
    UnknownProgram(ProgramId),

    #[error("draw issued with no program in use")]
    NoProgramBound,
}

/// Everything a scene operation can fail with.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Binding(#[from] MissingSlot),

    #[error(transparent)]
    Misuse(#[from] MisuseError),

    #[error(transparent)]
    Gfx(GfxError),
}

impl From<GfxError> for SceneError {
    fn from(err: GfxError) -> Self {
        // Surface misuse detected by the context as misuse, not a backend failure.
        match err {
            GfxError::Misuse(m) => SceneError::Misuse(m),
            GfxError::Compile { label, message } => {
                SceneError::Init(InitError::Compile { label, message })
            }
            other => SceneError::Gfx(other),
        }
    }
}

impl SceneError {
    /// Returns the misuse variant, if this error is one.
    pub fn as_misuse(&self) -> Option<&MisuseError> {
        match self {
            SceneError::Misuse(m) => Some(m),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gfx_misuse_maps_to_scene_misuse() {
        let err: SceneError = GfxError::Misuse(MisuseError::NoProgramBound).into();
        assert_eq!(err.as_misuse(), Some(&MisuseError::NoProgramBound));
    }

    #[test]
    fn compile_failure_is_an_init_error() {
        let err: SceneError = GfxError::Compile {
            label: "flat".into(),
            message: "expected `;`".into(),
        }
        .into();
        assert!(matches!(err, SceneError::Init(InitError::Compile { .. })));
    }

    #[test]
    fn display_names_the_surface() {
        let err = InitError::ContextUnavailable("robot".into());
        assert_eq!(err.to_string(), "no usable rendering context for surface `robot`");
    }
}
