use linkage_engine::core::{App, AppControl, FrameCtx};
use linkage_engine::gfx::{WgpuContext, WgpuProvider};
use linkage_engine::input::{ControlMapper, InputEvent, Key, KeyState};
use linkage_engine::scene::SceneSession;

use crate::scenes::SceneChoice;

/// Name of the one surface the studio draws on.
const SURFACE: &str = "main";

/// Drives one scene session inside the window runtime.
///
/// The session is opened lazily on the first frame, once a `Gpu` exists.
pub struct StudioApp {
    choice: SceneChoice,
    mapper: ControlMapper,
    session: Option<SceneSession<WgpuContext>>,
    failed: bool,
    last_title: String,
}

impl StudioApp {
    pub fn new(choice: SceneChoice) -> Self {
        Self {
            choice,
            mapper: ControlMapper::default(),
            session: None,
            failed: false,
            last_title: String::new(),
        }
    }

    fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(err) = session.close() {
                log::warn!("closing `{}`: {err}", self.choice);
            }
        }
    }
}

impl App for StudioApp {
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        if let InputEvent::Key {
            key: Key::Escape,
            state: KeyState::Pressed,
            ..
        } = event
        {
            return AppControl::Exit;
        }
        self.mapper.handle(event);
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.failed {
            return AppControl::Exit;
        }

        if self.session.is_none() {
            let mut provider = WgpuProvider::new(ctx.gpu, SURFACE);
            let choice = self.choice;
            match SceneSession::open(&mut provider, SURFACE, |c| choice.build(c)) {
                Ok(session) => self.session = Some(session),
                Err(err) => {
                    log::error!("could not open scene `{choice}`: {err}");
                    self.failed = true;
                    return AppControl::Exit;
                }
            }
        }
        let Some(session) = self.session.as_mut() else {
            return AppControl::Exit;
        };

        self.mapper.sync_animating(session.scene().animate_active());
        session.pump(&mut self.mapper);
        session.advance(ctx.time.now);

        // Draws are recorded only once a surface texture is in hand, so a
        // skipped frame leaves nothing queued for the next one.
        session.context_mut().discard_pending();
        let clear = session.scene().clear_color();
        let mut rendered = Ok(());
        let control = ctx.render(|target| {
            rendered = session.render();
            if rendered.is_err() {
                session.context_mut().discard_pending();
            }
            log::trace!("flushing {} draws", session.context().pending_draws());
            session.context_mut().flush(target, clear);
        });
        if let Err(err) = rendered {
            log::error!("rendering `{}`: {err}", self.choice);
            return AppControl::Exit;
        }

        let title = format!(
            "linkage · {} · joint {}{}",
            session.scene().name(),
            self.mapper.selected_joint(),
            if session.scene().animate_active() { "" } else { " · paused" },
        );
        if title != self.last_title {
            ctx.runtime.set_title(title.clone());
            self.last_title = title;
        }

        control
    }

    fn on_exit(&mut self) {
        self.close_session();
    }
}
