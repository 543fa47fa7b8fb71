use std::collections::BTreeMap;

use thiserror::Error;

use crate::error::InitError;
use crate::gfx::PrimitiveKind;

/// Attribute arrays of a model that do not fit together.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("{kind} positions of `{model}` hold {len} floats, not a multiple of 3")]
    PositionsNotTriples {
        model: String,
        kind: &'static str,
        len: usize,
    },

    #[error("{attribute} of the {kind} group in `{model}` holds {found} floats, expected {expected}")]
    LengthMismatch {
        model: String,
        kind: &'static str,
        attribute: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("normals are only allowed on triangles (`{model}`, {kind})")]
    NormalsOnNonTriangles { model: String, kind: &'static str },

    #[error("`{model}` declares the {kind} group twice")]
    DuplicateGroup { model: String, kind: &'static str },
}

/// Vertex data for one primitive kind.
///
/// Positions are xyz triples; normals and colors, when present, run parallel
/// to them (one xyz / rgb triple per vertex).
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveGroup {
    kind: PrimitiveKind,
    positions: Vec<f32>,
    normals: Option<Vec<f32>>,
    colors: Option<Vec<f32>>,
}

impl PrimitiveGroup {
    pub fn new(kind: PrimitiveKind, positions: Vec<f32>) -> Self {
        Self {
            kind,
            positions,
            normals: None,
            colors: None,
        }
    }

    pub fn points(positions: Vec<f32>) -> Self {
        Self::new(PrimitiveKind::Points, positions)
    }

    pub fn lines(positions: Vec<f32>) -> Self {
        Self::new(PrimitiveKind::Lines, positions)
    }

    pub fn triangles(positions: Vec<f32>) -> Self {
        Self::new(PrimitiveKind::Triangles, positions)
    }

    pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_colors(mut self, colors: Vec<f32>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[f32]> {
        self.normals.as_deref()
    }

    pub fn colors(&self) -> Option<&[f32]> {
        self.colors.as_deref()
    }

    /// Number of vertices drawn for this group.
    pub fn element_count(&self) -> usize {
        self.positions.len() / 3
    }

    fn validate(&self, model: &str) -> Result<(), ModelError> {
        let kind = self.kind.label();
        let len = self.positions.len();
        if len % 3 != 0 {
            return Err(ModelError::PositionsNotTriples {
                model: model.to_string(),
                kind,
                len,
            });
        }
        if self.normals.is_some() && self.kind != PrimitiveKind::Triangles {
            return Err(ModelError::NormalsOnNonTriangles {
                model: model.to_string(),
                kind,
            });
        }
        let arrays = [("normals", &self.normals), ("colors", &self.colors)];
        for (attribute, array) in arrays {
            if let Some(data) = array {
                if data.len() != len {
                    return Err(ModelError::LengthMismatch {
                        model: model.to_string(),
                        kind,
                        attribute,
                        expected: len,
                        found: data.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Immutable model: up to one group per primitive kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    points: Option<PrimitiveGroup>,
    lines: Option<PrimitiveGroup>,
    triangles: Option<PrimitiveGroup>,
}

impl Model {
    /// Validates and assembles a model from its groups.
    pub fn new(
        name: impl Into<String>,
        groups: impl IntoIterator<Item = PrimitiveGroup>,
    ) -> Result<Self, ModelError> {
        let mut model = Model {
            name: name.into(),
            points: None,
            lines: None,
            triangles: None,
        };
        for group in groups {
            group.validate(&model.name)?;
            let slot = match group.kind {
                PrimitiveKind::Points => &mut model.points,
                PrimitiveKind::Lines => &mut model.lines,
                PrimitiveKind::Triangles => &mut model.triangles,
            };
            if slot.is_some() {
                return Err(ModelError::DuplicateGroup {
                    model: model.name,
                    kind: group.kind.label(),
                });
            }
            *slot = Some(group);
        }
        Ok(model)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self, kind: PrimitiveKind) -> Option<&PrimitiveGroup> {
        match kind {
            PrimitiveKind::Points => self.points.as_ref(),
            PrimitiveKind::Lines => self.lines.as_ref(),
            PrimitiveKind::Triangles => self.triangles.as_ref(),
        }
    }

    /// Groups in draw order.
    pub fn groups(&self) -> impl Iterator<Item = &PrimitiveGroup> {
        PrimitiveKind::DRAW_ORDER
            .into_iter()
            .filter_map(|kind| self.group(kind))
    }

    pub fn element_count(&self, kind: PrimitiveKind) -> usize {
        self.group(kind).map_or(0, PrimitiveGroup::element_count)
    }
}

/// Models by name.
#[derive(Debug, Default, Clone)]
pub struct ModelCatalog {
    models: BTreeMap<String, Model>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model, replacing any previous model of the same name.
    pub fn insert(&mut self, model: Model) {
        self.models.insert(model.name.clone(), model);
    }

    pub fn with(mut self, model: Model) -> Self {
        self.insert(model);
        self
    }

    pub fn get(&self, name: &str) -> Result<&Model, InitError> {
        self.models
            .get(name)
            .ok_or_else(|| InitError::MissingModel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
