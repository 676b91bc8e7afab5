use wgpu::util::DeviceExt;

use crate::device::capture;
use crate::error::{ErrorCode, FatalError, Result};
use crate::shader::Pass;

use super::mesh::{build_sky_mesh, build_water_mesh, Mesh};

/// Immutable vertex/index buffer pair.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

impl GpuMesh {
    /// Uploads `mesh`. The buffers are never written again.
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Result<Self> {
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return Err(FatalError::new(
                ErrorCode::Geometry,
                format!("unable to create {label} buffers: mesh is empty"),
            ));
        }

        capture(device, ErrorCode::Geometry, format!("unable to create {label} buffers"), || {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("reef {label} vertex buffer")),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("reef {label} index buffer")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            Self {
                vertex_buffer,
                index_buffer,
            }
        })
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    /// Index count read back from the index buffer's byte size.
    pub fn index_count(&self) -> u32 {
        (self.index_buffer.size() / size_of::<u32>() as u64) as u32
    }
}

/// Owns the sky and water meshes.
pub struct MeshStore {
    sky: GpuMesh,
    water: GpuMesh,
}

impl MeshStore {
    /// Builds and uploads both meshes. `grid` is the water patch count along
    /// X and Z.
    pub fn build(device: &wgpu::Device, grid: (u32, u32)) -> Result<Self> {
        let (x, z) = grid;

        let water = GpuMesh::upload(device, "water", &build_water_mesh(x, z))?;
        let sky = GpuMesh::upload(device, "sky", &build_sky_mesh())?;

        log::debug!(
            "meshes uploaded: water {x}x{z} ({} indices), sky ({} indices)",
            water.index_count(),
            sky.index_count()
        );

        Ok(Self { sky, water })
    }

    pub fn mesh(&self, pass: Pass) -> &GpuMesh {
        match pass {
            Pass::Sky => &self.sky,
            Pass::Water => &self.water,
        }
    }

    pub fn release(self) {
        let Self { sky, water } = self;
        drop(water);
        drop(sky);
        log::debug!("meshes released");
    }
}
