use thiserror::Error;

use crate::error::MisuseError;

/// Failures reported by a graphics context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GfxError {
    /// The caller broke a handle or binding contract.
    #[error(transparent)]
    Misuse(#[from] MisuseError),

    /// Shader source was rejected.
    #[error("shader program `{label}` failed to compile: {message}")]
    Compile { label: String, message: String },

    /// Uniform write did not match the slot's declared type.
    #[error("uniform at offset {offset} is {expected}, not {found}")]
    UniformType {
        offset: u32,
        expected: &'static str,
        found: &'static str,
    },

    /// Attribute slot is not declared by the program in use.
    #[error("attribute location {0} is not declared by the current program")]
    UnknownAttribute(u32),

    /// Vertex data is empty or its size is not representable.
    #[error("vertex buffer `{label}` has invalid size ({len} floats)")]
    InvalidBufferSize { label: String, len: usize },
}
