//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue, trying driver
//!   preferences in order
//! - creating & configuring the Surface (swapchain)
//! - owning the render-target and depth-stencil attachments sized to the
//!   surface, and rebuilding them on resize
//! - presenting the render target
//! - turning wgpu validation errors into fatal errors

mod attachments;
mod error;
mod gpu;
mod init;
mod scope;
mod surface;

pub use attachments::{Attachments, DEPTH_FORMAT};
pub use error::SurfaceErrorAction;
pub use gpu::Gpu;
pub use init::{DriverPreference, GpuInit};
pub use scope::{capture, UncapturedErrors};
pub use surface::{PresentPath, SurfaceSize};

/// Device on any available adapter, without a surface. `None` when the host
/// has no adapter at all.
#[cfg(test)]
pub(crate) fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())).ok()?;
    let limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());

    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("reef test device"),
        required_limits: limits,
        ..Default::default()
    }))
    .ok()
}
