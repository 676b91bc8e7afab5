use crate::device::SurfaceSize;
use crate::error::Result;
use crate::resources::{PsParams, VsParams};
use crate::scene::Viewport;
use crate::shader::Pass;

/// Immediate-mode drawing surface the frame renderer talks to.
///
/// Calls are observed in order: a parameter update is visible to every draw
/// issued after it and to none issued before it.
pub trait RenderBackend {
    /// Current surface size. May be empty while minimized.
    fn surface_size(&self) -> SurfaceSize;

    /// Rebuilds size-dependent state. An empty size is recorded only.
    fn resize(&mut self, size: SurfaceSize) -> Result<()>;

    /// Starts a frame: clears colour to `clear` and depth to 1.
    fn begin_frame(&mut self, clear: wgpu::Color, viewport: Viewport) -> Result<()>;

    fn update_vs_params(&mut self, params: &VsParams) -> Result<()>;

    fn update_ps_params(&mut self, params: &PsParams) -> Result<()>;

    /// Draws `index_count` indices of the mesh bound to `pass` with its
    /// programs.
    fn draw(&mut self, pass: Pass, index_count: u32) -> Result<()>;

    /// Presents the render target. Without a preceding `begin_frame` the
    /// last frame is presented again.
    fn present(&mut self) -> Result<()>;

    /// Index count of the mesh bound to `pass`, read from its index buffer.
    fn index_count(&self, pass: Pass) -> u32;

    /// Element count of the wave buffer, read from its descriptor.
    fn wave_count(&self) -> u32;

    /// Releases everything in reverse creation order.
    fn teardown(self)
    where
        Self: Sized;
}
