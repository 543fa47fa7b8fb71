//! Input subsystem.
//!
//! Two layers:
//! - `InputEvent` and friends: platform-agnostic window input, translated from
//!   winit by the runtime
//! - `ControlEvent`: what scenes understand (drag, animate, joint angles,
//!   translation, view volume, reset). `ControlMapper` turns the former into
//!   the latter.

mod controls;
mod drag;
mod keymap;
pub(crate) mod platform;
mod state;
mod types;

pub use controls::ControlEvent;
pub use drag::DragTracker;
pub use keymap::{ControlMapper, InputEventSource, KeyBindings};
pub use state::InputState;
pub use types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta,
    PointerButtonEvent, PointerMoveEvent,
};
