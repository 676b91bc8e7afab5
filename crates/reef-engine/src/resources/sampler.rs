use crate::device::capture;
use crate::error::{ErrorCode, Result};

/// Creates the anisotropic wrap sampler used for the cubemap.
///
/// Anisotropic filtering requires linear min/mag/mip filters; a clamp of 1
/// disables it.
pub fn build_sampler(device: &wgpu::Device, max_anisotropy: u16) -> Result<wgpu::Sampler> {
    let descriptor = wgpu::SamplerDescriptor {
        label: Some("reef anisotropic sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        anisotropy_clamp: max_anisotropy.clamp(1, 16),
        ..Default::default()
    };

    capture(device, ErrorCode::Resource, "unable to create sampler state", || {
        device.create_sampler(&descriptor)
    })
}
