//! Resource store: sampler, skybox, wave set and per-frame parameter blocks,
//! plus the bind group exposing them to the programs.

mod cubemap;
mod params;
mod sampler;
mod waves;

pub use cubemap::{mip_chain_size, Cubemap, CubemapData};
pub use params::{FrameParamBuffers, PsParams, VsParams};
pub use sampler::build_sampler;
pub use waves::{StructuredBufferDesc, Wave, WaveBuffer, DEFAULT_WAVES};

use crate::device::capture;
use crate::error::{ErrorCode, Result};
use crate::scene::SceneConfig;
use crate::shader::ShaderPrograms;

pub struct ResourceStore {
    sampler: wgpu::Sampler,
    cubemap: Cubemap,
    waves: WaveBuffer,
    params: FrameParamBuffers,
    bind_group: wgpu::BindGroup,
}

impl ResourceStore {
    pub fn build(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        programs: &ShaderPrograms,
        scene: &SceneConfig,
    ) -> Result<Self> {
        let sampler = build_sampler(device, scene.max_anisotropy)?;
        let cubemap = Cubemap::load(device, queue, &scene.cubemap_path)?;
        let waves = WaveBuffer::new(device, &scene.waves)
            .map_err(|e| e.while_doing("unable to create shader resource view for wave buffer"))?;
        let params = FrameParamBuffers::new(device)?;

        use crate::shader::binding;
        let descriptor = wgpu::BindGroupDescriptor {
            label: Some("reef bind group"),
            layout: programs.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: binding::VS_PARAMS,
                    resource: params.vs().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: binding::WAVES,
                    resource: waves.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: binding::PS_PARAMS,
                    resource: params.ps().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: binding::CUBEMAP,
                    resource: wgpu::BindingResource::TextureView(cubemap.view()),
                },
                wgpu::BindGroupEntry {
                    binding: binding::SAMPLER,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        };
        let bind_group = capture(device, ErrorCode::Resource, "unable to bind resources to the programs", || {
            device.create_bind_group(&descriptor)
        })?;

        Ok(Self {
            sampler,
            cubemap,
            waves,
            params,
            bind_group,
        })
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn params(&self) -> &FrameParamBuffers {
        &self.params
    }

    pub fn waves(&self) -> &WaveBuffer {
        &self.waves
    }

    /// Releases the bind group, parameter buffers, sampler, wave buffer and
    /// cubemap, in that order.
    pub fn release(self) {
        let Self {
            sampler,
            cubemap,
            waves,
            params,
            bind_group,
        } = self;

        drop(bind_group);
        drop(params);
        drop(sampler);
        drop(waves);
        cubemap.release();

        log::debug!("resources released");
    }
}
