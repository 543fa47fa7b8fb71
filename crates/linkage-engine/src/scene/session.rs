use std::time::Instant;

use crate::error::{InitError, SceneError};
use crate::gfx::{ContextProvider, RenderContext};
use crate::input::{ControlEvent, InputEventSource};
use crate::time::AnimationTicker;

use super::Scene;

/// A scene together with the context it was built on.
///
/// Opening acquires the context for a surface and builds the scene on it;
/// closing tears the scene down on that same context. A session dropped
/// while its scene is live tears down in `Drop`.
pub struct SceneSession<C: RenderContext + 'static> {
    surface: String,
    ctx: C,
    scene: Box<dyn Scene>,
    ticker: AnimationTicker,
}

impl<C: RenderContext + 'static> SceneSession<C> {
    /// Acquires a context for `surface` and builds a scene with `build`.
    ///
    /// A provider with no context for the surface is an
    /// `InitError::ContextUnavailable`; nothing is built.
    pub fn open<P, F>(provider: &mut P, surface: &str, build: F) -> Result<Self, SceneError>
    where
        P: ContextProvider<Context = C>,
        F: FnOnce(&mut C) -> Result<Box<dyn Scene>, SceneError>,
    {
        let Some(mut ctx) = provider.context(surface) else {
            log::warn!("no rendering context for surface `{surface}`");
            return Err(InitError::ContextUnavailable(surface.to_string()).into());
        };
        let scene = build(&mut ctx)?;
        log::info!("surface `{surface}` showing scene `{}`", scene.name());
        Ok(Self {
            surface: surface.to_string(),
            ctx,
            scene,
            ticker: AnimationTicker::default(),
        })
    }

    pub fn with_ticker(mut self, ticker: AnimationTicker) -> Self {
        self.ticker = ticker;
        self
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub fn render(&mut self) -> Result<(), SceneError> {
        self.scene.render(&mut self.ctx)
    }

    pub fn apply(&mut self, event: &ControlEvent) {
        self.scene.apply(event);
    }

    /// Applies everything `source` has queued, oldest first.
    pub fn pump(&mut self, source: &mut dyn InputEventSource) -> usize {
        let events = source.drain();
        for event in &events {
            self.scene.apply(event);
        }
        events.len()
    }

    /// Runs one animation step if the ticker allows it at `now`.
    pub fn advance(&mut self, now: Instant) -> bool {
        let step = self.ticker.should_step(now, self.scene.animate_active());
        if step {
            self.scene.animate_step();
        }
        step
    }

    /// Tears the scene down. The context stays usable for inspection.
    pub fn close(&mut self) -> Result<(), SceneError> {
        self.scene.teardown(&mut self.ctx)?;
        log::info!("surface `{}` closed", self.surface);
        Ok(())
    }
}

impl<C: RenderContext + 'static> Drop for SceneSession<C> {
    fn drop(&mut self) {
        if !self.scene.core().is_live() {
            return;
        }
        if let Err(err) = self.scene.teardown(&mut self.ctx) {
            log::warn!("surface `{}`: teardown on drop failed: {err}", self.surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use super::*;
    use crate::error::MisuseError;
    use crate::geometry::primitives;
    use crate::gfx::{HeadlessContext, HeadlessProvider};
    use crate::scene::{ArticulatedConfig, ArticulatedScene, GalleryConfig, GalleryScene};

    fn robot(ctx: &mut HeadlessContext) -> Result<Box<dyn Scene>, SceneError> {
        let scene =
            ArticulatedScene::new(ctx, &primitives::standard_catalog(), ArticulatedConfig::robot_arm())?;
        Ok(Box::new(scene))
    }

    // ── open ──────────────────────────────────────────────────────────────

    #[test]
    fn refused_surface_is_context_unavailable() {
        let mut provider = HeadlessProvider::new().refusing("left");
        let mut built = false;
        let err = SceneSession::open(&mut provider, "left", |ctx| {
            built = true;
            robot(ctx)
        })
        .err()
        .unwrap();

        assert!(matches!(err, SceneError::Init(InitError::ContextUnavailable(ref s)) if s == "left"));
        assert!(!built);

        // Other surfaces are unaffected.
        let mut session = SceneSession::open(&mut provider, "right", robot).unwrap();
        session.close().unwrap();
    }

    #[test]
    fn build_failure_propagates() {
        let mut provider = HeadlessProvider::new();
        let err = SceneSession::open(&mut provider, "main", |ctx| {
            let config = GalleryConfig::new(["no_such_model"]);
            Ok(Box::new(GalleryScene::new(ctx, &primitives::standard_catalog(), config)?)
                as Box<dyn Scene>)
        })
        .err()
        .unwrap();
        assert!(matches!(err, SceneError::Init(InitError::MissingModel(_))));
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn advance_respects_ticker_and_flag() {
        let mut provider = HeadlessProvider::new();
        let mut session = SceneSession::open(&mut provider, "main", robot)
            .unwrap()
            .with_ticker(AnimationTicker::new(Duration::from_millis(30)));
        let t0 = Instant::now();

        assert!(session.advance(t0));
        assert!(!session.advance(t0 + Duration::from_millis(5)));
        session.apply(&ControlEvent::SetAnimate(false));
        assert!(!session.advance(t0 + Duration::from_millis(100)));
        session.close().unwrap();
    }

    #[test]
    fn pump_applies_queued_controls_in_order() {
        let mut provider = HeadlessProvider::new();
        let mut session = SceneSession::open(&mut provider, "main", robot).unwrap();
        let mut queue: VecDeque<ControlEvent> = VecDeque::new();
        queue.push_back(ControlEvent::SetAnimate(false));
        queue.push_back(ControlEvent::SetJointAngle { joint: 1, degrees: 20.0 });

        assert_eq!(session.pump(&mut queue), 2);
        assert!(!session.scene().animate_active());
        session.render().unwrap();
        assert_eq!(session.context().draws().len(), 9);
        session.close().unwrap();
    }

    #[test]
    fn close_frees_everything_and_blocks_rendering() {
        let mut provider = HeadlessProvider::new();
        let mut session = SceneSession::open(&mut provider, "main", robot).unwrap();
        session.render().unwrap();
        session.close().unwrap();

        assert_eq!(session.context().live_buffer_count(), 0);
        assert_eq!(session.context().live_program_count(), 0);
        let err = session.render().unwrap_err();
        assert!(matches!(err.as_misuse(), Some(MisuseError::RenderAfterTeardown(_))));
        let err = session.close().unwrap_err();
        assert!(matches!(err.as_misuse(), Some(MisuseError::DoubleTeardown(_))));
    }
}
