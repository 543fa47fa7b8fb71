//! Bundled WGSL programs.

use crate::gfx::ProgramSource;

/// How a part is shaded; decides which slots are required.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShadingMode {
    /// Per-vertex color, no lighting.
    Flat,
    /// Diffuse per-fragment lighting from one colored point light.
    ColoredLight,
}

impl ShadingMode {
    /// The bundled program for this mode.
    pub fn source(self) -> ProgramSource {
        match self {
            ShadingMode::Flat => color_per_vertex(),
            ShadingMode::ColoredLight => colored_light(),
        }
    }
}

pub fn color_per_vertex() -> ProgramSource {
    ProgramSource::new(
        "color_per_vertex",
        include_str!("shaders/color_per_vertex.wgsl"),
    )
}

pub fn colored_light() -> ProgramSource {
    ProgramSource::new("colored_light", include_str!("shaders/colored_light.wgsl"))
}
