use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::device::capture;
use crate::error::{ErrorCode, Result};
use crate::scene::Material;

/// Vertex-stage parameters. Mirrors the WGSL `VsParams` uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VsParams {
    pub world_view_projection: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    /// Animation phase in `[0, 1)`.
    pub time: f32,
    pub wave_count: i32,
    pub crest_factor: f32,
    pub _pad: f32,
}

impl VsParams {
    pub fn new(world_view_projection: Mat4, world: Mat4, time: f32, wave_count: u32, crest_factor: f32) -> Self {
        Self {
            world_view_projection: world_view_projection.to_cols_array_2d(),
            world: world.to_cols_array_2d(),
            time,
            wave_count: wave_count as i32,
            crest_factor,
            _pad: 0.0,
        }
    }
}

/// Fragment-stage parameters. Each `vec3` is packed with one scalar.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PsParams {
    pub eye_position: [f32; 3],
    /// Refraction distortion.
    pub d: f32,
    pub light_position: [f32; 3],
    /// Specular sharpness.
    pub s: f32,
    pub light_color: [f32; 3],
    pub reflectivity: f32,
    pub water_color: [f32; 3],
    pub transmittance: f32,
}

impl PsParams {
    pub fn new(eye_position: Vec3, material: &Material) -> Self {
        Self {
            eye_position: eye_position.to_array(),
            d: material.distortion,
            light_position: material.light_position.to_array(),
            s: material.specular,
            light_color: material.light_color.to_array(),
            reflectivity: material.reflectivity,
            water_color: material.water_color.to_array(),
            transmittance: material.transmittance,
        }
    }
}

/// One uniform buffer per stage, sized to its block. Contents are undefined
/// until the first write.
pub struct FrameParamBuffers {
    vs: wgpu::Buffer,
    ps: wgpu::Buffer,
}

impl FrameParamBuffers {
    pub fn new(device: &wgpu::Device) -> Result<Self> {
        let uniform = |label, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        capture(device, ErrorCode::Resource, "unable to create constant buffers", || Self {
            vs: uniform("reef vertex params", size_of::<VsParams>()),
            ps: uniform("reef pixel params", size_of::<PsParams>()),
        })
    }

    pub fn vs(&self) -> &wgpu::Buffer {
        &self.vs
    }

    pub fn ps(&self) -> &wgpu::Buffer {
        &self.ps
    }

    pub fn write_vs(&self, queue: &wgpu::Queue, params: &VsParams) {
        queue.write_buffer(&self.vs, 0, bytemuck::bytes_of(params));
    }

    pub fn write_ps(&self, queue: &wgpu::Queue, params: &PsParams) {
        queue.write_buffer(&self.ps, 0, bytemuck::bytes_of(params));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sizes_follow_uniform_layout() {
        assert_eq!(size_of::<VsParams>(), 144);
        assert_eq!(size_of::<PsParams>(), 64);
    }

    #[test]
    fn matrices_are_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let params = VsParams::new(m, Mat4::IDENTITY, 0.25, 3, 0.3);
        assert_eq!(params.world_view_projection[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(params.wave_count, 3);
    }

    #[test]
    fn ps_params_pack_material() {
        let params = PsParams::new(Vec3::new(-0.9, 0.03, -0.9), &Material::default());
        assert_eq!(params.eye_position, [-0.9, 0.03, -0.9]);
        assert_eq!(params.light_color, [1.0, 1.0, 0.8]);
        assert_eq!((params.d, params.s), (0.7, 0.4));
        assert_eq!((params.reflectivity, params.transmittance), (0.3, 0.9));
    }
}
