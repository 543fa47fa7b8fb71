//! Scene orchestration.
//!
//! A scene owns its parts (uploaded once), the programs that draw them and
//! the pose state that places them. Every frame it rebuilds each part's
//! transform chain from the current pose and renders the parts in a fixed
//! order. Teardown releases everything exactly once.
//!
//! - `SceneCore`: parts, programs, animate flag, lifecycle
//! - `Scene`: the per-scene contract (render, controls, animation)
//! - `SceneSession`: a scene bound to the context it was built with
//! - bundled scenes: `ArticulatedScene`, `GalleryScene`, `TransformLabScene`,
//!   `OrthoVolumeScene`

mod articulated;
mod base;
mod gallery;
mod ortho_volume;
mod session;
mod transform_lab;

use crate::error::SceneError;
use crate::gfx::RenderContext;
use crate::input::ControlEvent;

pub use base::{Lifecycle, SceneCore};
pub use articulated::{ArticulatedConfig, ArticulatedScene, JointSpec};
pub use gallery::{GalleryConfig, GalleryScene};
pub use ortho_volume::{OrthoView, OrthoVolumeConfig, OrthoVolumeScene};
pub use session::SceneSession;
pub use transform_lab::{TransformLabConfig, TransformLabScene};

/// Background used by the bundled scenes.
pub const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.98,
    g: 0.98,
    b: 0.98,
    a: 1.0,
};

/// A renderable, controllable scene.
///
/// Implementors supply `core`, `render`, `control` and `animate_step`; the
/// lifecycle and animate flag are handled through [`SceneCore`].
pub trait Scene {
    fn core(&self) -> &SceneCore;

    fn core_mut(&mut self) -> &mut SceneCore;

    /// Draws one frame from the current pose.
    ///
    /// Fails with `MisuseError::RenderAfterTeardown` once torn down.
    fn render(&self, ctx: &mut dyn RenderContext) -> Result<(), SceneError>;

    /// Scene-specific reaction to a control event. `SetAnimate` never
    /// reaches this; see [`Scene::apply`].
    fn control(&mut self, event: &ControlEvent);

    /// Advances the animation by one tick.
    fn animate_step(&mut self);

    fn clear_color(&self) -> wgpu::Color {
        BACKGROUND
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn animate_active(&self) -> bool {
        self.core().animate_active()
    }

    /// Applies a control event between frames. Events after teardown are
    /// dropped.
    fn apply(&mut self, event: &ControlEvent) {
        if !self.core().is_live() {
            log::debug!("scene `{}` ignores {event:?} after teardown", self.name());
            return;
        }
        match event {
            ControlEvent::SetAnimate(enabled) => self.core_mut().set_animate(*enabled),
            other => self.control(other),
        }
    }

    /// Releases every part and program. A second call is misuse.
    fn teardown(&mut self, ctx: &mut dyn RenderContext) -> Result<(), SceneError> {
        self.core_mut().teardown(ctx)
    }
}
