use std::collections::VecDeque;

use glam::Vec3;

use super::controls::ControlEvent;
use super::drag::DragTracker;
use super::state::InputState;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};

/// Anything scenes can pull control events from.
pub trait InputEventSource {
    /// Returns every event produced since the previous call, oldest first.
    fn drain(&mut self) -> Vec<ControlEvent>;
}

/// Scripted source: events are handed out in push order.
impl InputEventSource for VecDeque<ControlEvent> {
    fn drain(&mut self) -> Vec<ControlEvent> {
        std::mem::take(self).into()
    }
}

/// Step sizes used by the keyboard and wheel bindings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KeyBindings {
    /// Degrees per arrow-key press.
    pub joint_step: f32,
    pub x_angle_step: f32,
    /// World units per translation key press.
    pub translate_step: f32,
    /// View-volume factor per wheel line or page key.
    pub volume_scale: f32,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            joint_step: 5.0,
            x_angle_step: 5.0,
            translate_step: 0.25,
            volume_scale: 1.1,
        }
    }
}

/// Maps window input onto `ControlEvent`s.
///
/// | input            | event                                  |
/// |------------------|----------------------------------------|
/// | left drag        | `Drag` (pauses animation meanwhile)     |
/// | Space            | toggle `SetAnimate`                    |
/// | 1..9             | select joint                           |
/// | ← / →            | `NudgeJoint` on the selected joint     |
/// | ↑ / ↓            | `NudgeXAngle`                          |
/// | A D / S W / Q E  | `NudgeTranslation` along x / y / z     |
/// | PageUp/PageDown, wheel | `ScaleViewVolume`                |
/// | R                | `Reset`                                |
#[derive(Debug, Default)]
pub struct ControlMapper {
    bindings: KeyBindings,
    input: InputState,
    drag: DragTracker,
    animating: bool,
    selected_joint: usize,
    pending: Vec<ControlEvent>,
}

impl ControlMapper {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// Mirrors the scene's animate flag so toggles and drags start from it.
    pub fn sync_animating(&mut self, animating: bool) {
        self.animating = animating;
    }

    pub fn selected_joint(&self) -> usize {
        self.selected_joint
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Folds one window event in, queueing whatever it maps to.
    pub fn handle(&mut self, ev: &InputEvent) {
        let fresh = self.input.apply_event(ev);

        match ev {
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                repeat,
                ..
            } => self.key_pressed(*key, fresh && !repeat),

            InputEvent::PointerButton(b) if b.button == MouseButton::Left => match b.state {
                MouseButtonState::Pressed => {
                    let ev = self.drag.press(b.x, b.y, self.animating);
                    self.emit(ev);
                }
                MouseButtonState::Released => {
                    let ev = self.drag.release();
                    self.emit(ev);
                }
            },

            InputEvent::PointerMoved(p) => {
                let ev = self.drag.motion(p.x, p.y);
                self.emit(ev);
            }

            InputEvent::MouseWheel { delta, .. } => {
                let lines = delta.lines_y();
                if lines != 0.0 {
                    let factor = self.bindings.volume_scale.powf(-lines);
                    self.emit(Some(ControlEvent::ScaleViewVolume(factor)));
                }
            }

            InputEvent::Focused(false) => {
                let ev = self.drag.release();
                self.emit(ev);
            }

            _ => {}
        }
    }

    fn key_pressed(&mut self, key: Key, first_press: bool) {
        let b = self.bindings;
        let t = b.translate_step;

        let ev = match key {
            Key::Space if first_press => {
                let enabled = !self.animating;
                self.drag.animation_toggled(enabled);
                ControlEvent::SetAnimate(enabled)
            }
            Key::R if first_press => ControlEvent::Reset,
            Key::V if first_press => ControlEvent::ToggleView,

            Key::ArrowLeft => self.nudge_joint(b.joint_step),
            Key::ArrowRight => self.nudge_joint(-b.joint_step),
            Key::ArrowUp => ControlEvent::NudgeXAngle(b.x_angle_step),
            Key::ArrowDown => ControlEvent::NudgeXAngle(-b.x_angle_step),

            Key::D => ControlEvent::NudgeTranslation(Vec3::new(t, 0.0, 0.0)),
            Key::A => ControlEvent::NudgeTranslation(Vec3::new(-t, 0.0, 0.0)),
            Key::W => ControlEvent::NudgeTranslation(Vec3::new(0.0, t, 0.0)),
            Key::S => ControlEvent::NudgeTranslation(Vec3::new(0.0, -t, 0.0)),
            Key::E => ControlEvent::NudgeTranslation(Vec3::new(0.0, 0.0, t)),
            Key::Q => ControlEvent::NudgeTranslation(Vec3::new(0.0, 0.0, -t)),

            Key::PageUp => ControlEvent::ScaleViewVolume(1.0 / b.volume_scale),
            Key::PageDown => ControlEvent::ScaleViewVolume(b.volume_scale),

            other => {
                if let Some(d @ 1..=9) = other.digit() {
                    self.selected_joint = usize::from(d - 1);
                    log::debug!("selected joint {}", self.selected_joint);
                }
                return;
            }
        };
        self.emit(Some(ev));
    }

    fn nudge_joint(&self, degrees: f32) -> ControlEvent {
        ControlEvent::NudgeJoint {
            joint: self.selected_joint,
            degrees,
        }
    }

    fn emit(&mut self, ev: Option<ControlEvent>) {
        let Some(ev) = ev else { return };
        if let ControlEvent::SetAnimate(enabled) = ev {
            self.animating = enabled;
        }
        log::trace!("control: {ev:?}");
        self.pending.push(ev);
    }
}

impl InputEventSource for ControlMapper {
    fn drain(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.pending)
    }
}
