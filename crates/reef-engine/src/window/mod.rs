//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and translates window events into
//! lifecycle events.

mod resize;
mod runtime;

pub use resize::ResizeTracker;
pub use runtime::{Runtime, RuntimeConfig};
