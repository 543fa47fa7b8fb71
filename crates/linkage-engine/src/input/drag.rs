use super::controls::ControlEvent;

/// Turns pointer press/move/release into `Drag` events.
///
/// Animation is paused for the duration of a drag and resumed afterwards,
/// but only when it was running when the drag started.
#[derive(Debug, Default, Clone)]
pub struct DragTracker {
    last: Option<(f32, f32)>,
    resume_animation: bool,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    /// Starts a drag at `(x, y)`. `animating` is the scene's current flag.
    pub fn press(&mut self, x: f32, y: f32, animating: bool) -> Option<ControlEvent> {
        self.last = Some((x, y));
        self.resume_animation = animating;
        animating.then_some(ControlEvent::SetAnimate(false))
    }

    /// Pointer motion; emits a drag delta while a drag is in progress.
    ///
    /// Screen y grows downwards, so `dy` is negated.
    pub fn motion(&mut self, x: f32, y: f32) -> Option<ControlEvent> {
        let (x0, y0) = self.last?;
        self.last = Some((x, y));
        let (dx, dy) = (x - x0, -(y - y0));
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(ControlEvent::Drag { dx, dy })
    }

    /// Ends the drag, resuming animation if the drag paused it.
    pub fn release(&mut self) -> Option<ControlEvent> {
        self.last.take()?;
        std::mem::take(&mut self.resume_animation).then_some(ControlEvent::SetAnimate(true))
    }

    /// Tracks an explicit animate toggle made mid-drag.
    pub fn animation_toggled(&mut self, enabled: bool) {
        if self.is_dragging() {
            self.resume_animation = enabled;
        }
    }
}
