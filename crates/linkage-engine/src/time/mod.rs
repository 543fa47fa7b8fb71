//! Time subsystem.
//!
//! - `FrameClock`: one per window, ticked once per presented frame
//! - `AnimationTicker`: gates animation steps to a minimum interval

mod frame_clock;
mod ticker;

pub use frame_clock::{FrameClock, FrameTime};
pub use ticker::AnimationTicker;
