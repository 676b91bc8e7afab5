use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::device::capture;
use crate::error::{ErrorCode, FatalError, Result};

/// One directional wave component.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Wave {
    /// Unit travel direction in the XZ plane.
    pub direction: [f32; 2],
    pub wavelength: f32,
    /// Per-wave crest sharpness.
    pub crest_factor: f32,
}

impl Wave {
    pub const fn new(direction: [f32; 2], wavelength: f32, crest_factor: f32) -> Self {
        Self {
            direction,
            wavelength,
            crest_factor,
        }
    }
}

/// The demo's wave set.
pub const DEFAULT_WAVES: [Wave; 3] = [
    Wave::new([-0.70710677, 0.70710677], 0.2, 0.002),
    Wave::new([0.70710677, -0.70710677], 0.8, 0.001),
    Wave::new([-1.0, 0.0], 0.5, 0.004),
];

/// Element layout of a structured (storage) buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StructuredBufferDesc {
    pub element_size: u32,
    pub element_count: u32,
}

impl StructuredBufferDesc {
    /// Layout of `count` elements of `T`.
    pub fn of<T>(count: usize) -> Self {
        Self {
            element_size: size_of::<T>() as u32,
            element_count: count as u32,
        }
    }

    pub fn byte_size(&self) -> u64 {
        u64::from(self.element_size) * u64::from(self.element_count)
    }
}

/// Read-only storage buffer holding the wave set.
pub struct WaveBuffer {
    buffer: wgpu::Buffer,
    desc: StructuredBufferDesc,
}

impl WaveBuffer {
    pub fn new(device: &wgpu::Device, waves: &[Wave]) -> Result<Self> {
        if waves.is_empty() {
            return Err(FatalError::new(
                ErrorCode::Resource,
                "unable to create buffer holding wave parameters: no waves",
            ));
        }

        let desc = StructuredBufferDesc::of::<Wave>(waves.len());

        let max = device.limits().max_storage_buffer_binding_size;
        if desc.byte_size() > u64::from(max) {
            return Err(FatalError::new(
                ErrorCode::Resource,
                format!(
                    "unable to create buffer holding wave parameters: {} bytes exceeds {max}",
                    desc.byte_size()
                ),
            ));
        }

        let buffer = capture(device, ErrorCode::Resource, "unable to create buffer holding wave parameters", || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("reef wave buffer"),
                contents: bytemuck::cast_slice(waves),
                usage: wgpu::BufferUsages::STORAGE,
            })
        })?;

        log::debug!("wave buffer: {} waves", desc.element_count);

        Ok(Self { buffer, desc })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn desc(&self) -> StructuredBufferDesc {
        self.desc
    }
}
