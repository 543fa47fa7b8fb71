use crate::gfx::{BufferId, GfxError, GraphicsContext, PrimitiveKind};

use super::model::{Model, PrimitiveGroup};

/// GPU handles of one primitive group.
#[derive(Debug)]
pub struct GroupBuffers {
    pub kind: PrimitiveKind,
    pub element_count: u32,
    pub positions: BufferId,
    pub normals: Option<BufferId>,
    pub colors: Option<BufferId>,
}

impl GroupBuffers {
    pub fn handles(&self) -> impl Iterator<Item = BufferId> {
        std::iter::once(self.positions)
            .chain(self.normals)
            .chain(self.colors)
    }
}

/// GPU-resident copy of a model.
///
/// Holds buffers only for non-empty groups. `release` consumes the value, so
/// a buffer set cannot be freed twice or drawn after being freed.
#[derive(Debug)]
pub struct GeometryBuffer {
    model: String,
    groups: Vec<GroupBuffers>,
    released: bool,
}

impl GeometryBuffer {
    /// Copies every non-empty group of `model` into context buffers.
    ///
    /// On failure the buffers allocated so far are freed before returning.
    pub fn upload<C>(ctx: &mut C, model: &Model) -> Result<Self, GfxError>
    where
        C: GraphicsContext + ?Sized,
    {
        let mut buffer = GeometryBuffer {
            model: model.name().to_string(),
            groups: Vec::new(),
            released: false,
        };

        for group in model.groups() {
            if group.element_count() == 0 {
                continue;
            }
            match upload_group(ctx, model.name(), group) {
                Ok(handles) => buffer.groups.push(handles),
                Err(err) => {
                    log::warn!("upload of `{}` failed: {err}", model.name());
                    buffer.release(ctx);
                    return Err(err);
                }
            }
        }

        log::debug!(
            "uploaded `{}`: {} groups, {} buffers",
            buffer.model,
            buffer.groups.len(),
            buffer.handle_count()
        );
        Ok(buffer)
    }

    /// Number of live buffer handles.
    pub fn handle_count(&self) -> usize {
        self.groups.iter().map(|g| g.handles().count()).sum()
    }

    pub fn group(&self, kind: PrimitiveKind) -> Option<&GroupBuffers> {
        self.groups.iter().find(|g| g.kind == kind)
    }

    /// Groups in draw order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupBuffers> {
        PrimitiveKind::DRAW_ORDER
            .into_iter()
            .filter_map(|kind| self.group(kind))
    }

    /// Frees every handle once and returns how many were freed.
    ///
    /// Keeps going after a failed delete so the remaining handles are still
    /// returned to the context.
    pub fn release<C: GraphicsContext + ?Sized>(mut self, ctx: &mut C) -> usize {
        let mut freed = 0;
        for group in self.groups.drain(..) {
            for handle in group.handles() {
                match ctx.delete_buffer(handle) {
                    Ok(()) => freed += 1,
                    Err(err) => log::warn!("releasing `{}`: {err}", self.model),
                }
            }
        }
        self.released = true;
        log::debug!("released `{}` ({freed} buffers)", self.model);
        freed
    }
}

impl Drop for GeometryBuffer {
    fn drop(&mut self) {
        if !self.released && !self.groups.is_empty() {
            log::warn!(
                "geometry `{}` dropped without release; {} buffers leaked",
                self.model,
                self.handle_count()
            );
        }
    }
}

fn upload_group<C: GraphicsContext + ?Sized>(
    ctx: &mut C,
    model: &str,
    group: &PrimitiveGroup,
) -> Result<GroupBuffers, GfxError> {
    let kind = group.kind().label();
    let element_count = u32::try_from(group.element_count()).map_err(|_| {
        GfxError::InvalidBufferSize {
            label: format!("{model}/{kind}"),
            len: group.positions().len(),
        }
    })?;

    let positions = ctx.create_vertex_buffer(&format!("{model}/{kind}/positions"), group.positions())?;

    let normals = match group.normals() {
        Some(data) => match ctx.create_vertex_buffer(&format!("{model}/{kind}/normals"), data) {
            Ok(id) => Some(id),
            Err(err) => {
                discard_partial(ctx, model, [positions]);
                return Err(err);
            }
        },
        None => None,
    };

    let colors = match group.colors() {
        Some(data) => match ctx.create_vertex_buffer(&format!("{model}/{kind}/colors"), data) {
            Ok(id) => Some(id),
            Err(err) => {
                discard_partial(ctx, model, std::iter::once(positions).chain(normals));
                return Err(err);
            }
        },
        None => None,
    };

    Ok(GroupBuffers {
        kind: group.kind(),
        element_count,
        positions,
        normals,
        colors,
    })
}

/// Frees the buffers of a group whose upload failed part way.
fn discard_partial<C: GraphicsContext + ?Sized>(
    ctx: &mut C,
    model: &str,
    handles: impl IntoIterator<Item = BufferId>,
) {
    for handle in handles {
        if let Err(err) = ctx.delete_buffer(handle) {
            log::warn!("discarding partial upload of `{model}`: {err}");
        }
    }
}
