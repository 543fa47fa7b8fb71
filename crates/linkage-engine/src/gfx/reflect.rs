//! WGSL reflection.
//!
//! Slot names are resolved from the shader itself: vertex inputs of `vs_main`
//! by name → `@location`, members of the `var<uniform>` struct by name →
//! byte offset. Both backends share this so slot numbering always agrees.

use naga::{AddressSpace, Binding, ShaderStage, TypeInner, VectorSize};

use super::{GfxError, ProgramSource, UniformKind};

/// One vertex shader input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexInput {
    pub name: String,
    pub location: u32,
    pub components: u32,
}

/// One member of the uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub kind: UniformKind,
}

/// The program's single uniform buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    /// Struct span in bytes (already padded to the struct alignment).
    pub size: u32,
    pub members: Vec<UniformMember>,
}

/// Reflected interface of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramLayout {
    /// Vertex inputs sorted by location.
    pub attributes: Vec<VertexInput>,
    pub uniforms: Option<UniformBlock>,
}

impl ProgramLayout {
    pub fn attribute(&self, name: &str) -> Option<&VertexInput> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_at(&self, location: u32) -> Option<&VertexInput> {
        self.attributes.iter().find(|a| a.location == location)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformMember> {
        self.uniforms
            .as_ref()
            .and_then(|block| block.members.iter().find(|m| m.name == name))
    }

    /// Size of the CPU-side uniform block, zero when the program has none.
    pub fn uniform_size(&self) -> usize {
        self.uniforms.as_ref().map_or(0, |b| b.size as usize)
    }
}

/// Parses `source` and extracts its attribute and uniform tables.
///
/// Only one `var<uniform>` is supported; a program declaring more is rejected.
pub fn reflect_program(source: &ProgramSource) -> Result<ProgramLayout, GfxError> {
    let compile_err = |message: String| GfxError::Compile {
        label: source.label.to_string(),
        message,
    };

    let module = naga::front::wgsl::parse_str(&source.wgsl)
        .map_err(|e| compile_err(e.emit_to_string(&source.wgsl)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| compile_err(e.emit_to_string(&source.wgsl)))?;

    let vertex = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == ShaderStage::Vertex && ep.name == ProgramSource::VERTEX_ENTRY)
        .ok_or_else(|| compile_err(format!("missing @vertex fn {}", ProgramSource::VERTEX_ENTRY)))?;

    let has_fragment = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == ShaderStage::Fragment && ep.name == ProgramSource::FRAGMENT_ENTRY);
    if !has_fragment {
        return Err(compile_err(format!(
            "missing @fragment fn {}",
            ProgramSource::FRAGMENT_ENTRY
        )));
    }

    let mut attributes = Vec::new();
    for arg in &vertex.function.arguments {
        match (&arg.binding, &module.types[arg.ty].inner) {
            (Some(Binding::Location { location, .. }), inner) => {
                if let (Some(name), Some(components)) = (&arg.name, vector_components(inner)) {
                    attributes.push(VertexInput {
                        name: name.clone(),
                        location: *location,
                        components,
                    });
                }
            }
            (None, TypeInner::Struct { members, .. }) => {
                for member in members {
                    let Some(Binding::Location { location, .. }) = member.binding else {
                        continue;
                    };
                    let inner = &module.types[member.ty].inner;
                    if let (Some(name), Some(components)) = (&member.name, vector_components(inner))
                    {
                        attributes.push(VertexInput {
                            name: name.clone(),
                            location,
                            components,
                        });
                    }
                }
            }
            _ => {}
        }
    }
    attributes.sort_by_key(|a| a.location);

    let mut uniforms = None;
    for (_, var) in module.global_variables.iter() {
        if var.space != AddressSpace::Uniform {
            continue;
        }
        if uniforms.is_some() {
            return Err(compile_err("more than one var<uniform> declared".to_string()));
        }
        let Some(rb) = &var.binding else { continue };
        let TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            return Err(compile_err("var<uniform> must be a struct".to_string()));
        };

        let members = members
            .iter()
            .filter_map(|m| {
                let kind = uniform_kind(&module.types[m.ty].inner)?;
                Some(UniformMember {
                    name: m.name.clone()?,
                    offset: m.offset,
                    kind,
                })
            })
            .collect();

        uniforms = Some(UniformBlock {
            group: rb.group,
            binding: rb.binding,
            size: *span,
            members,
        });
    }

    log::trace!(
        "reflected `{}`: {} attributes, uniform block {} bytes",
        source.label,
        attributes.len(),
        uniforms.as_ref().map_or(0, |b: &UniformBlock| b.size)
    );

    Ok(ProgramLayout {
        attributes,
        uniforms,
    })
}

fn vector_components(inner: &TypeInner) -> Option<u32> {
    match inner {
        TypeInner::Scalar(_) => Some(1),
        TypeInner::Vector { size, .. } => Some(match size {
            VectorSize::Bi => 2,
            VectorSize::Tri => 3,
            VectorSize::Quad => 4,
        }),
        _ => None,
    }
}

fn uniform_kind(inner: &TypeInner) -> Option<UniformKind> {
    match inner {
        TypeInner::Scalar(_) => Some(UniformKind::Float),
        TypeInner::Vector {
            size: VectorSize::Tri,
            ..
        } => Some(UniformKind::Vec3),
        TypeInner::Vector {
            size: VectorSize::Quad,
            ..
        } => Some(UniformKind::Vec4),
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            ..
        } => Some(UniformKind::Mat4),
        _ => None,
    }
}
