//! Frame rendering.
//!
//! `FrameRenderer` owns per-frame policy (animation time, parameter values,
//! draw order) and drives a `RenderBackend`. `RendererContext` is the wgpu
//! backend; tests use a recording backend instead.

mod backend;
mod context;
mod frame;
mod recorder;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::RenderBackend;
pub use context::RendererContext;
pub use frame::{FrameRenderer, FrameState};
