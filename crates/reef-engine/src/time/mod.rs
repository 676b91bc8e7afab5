//! Time subsystem.
//!
//! - `FrameCounter` samples a monotonic clock once per rendered frame
//! - `AnimationClock` turns elapsed wall time into a normalized, wrapping phase

mod animation;
mod frame_counter;

pub use animation::AnimationClock;
pub use frame_counter::FrameCounter;
