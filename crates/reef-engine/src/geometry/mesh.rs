use bytemuck::{Pod, Zeroable};

/// Number of indices in the sky cube.
pub const SKY_INDEX_COUNT: u32 = 36;

/// Position-only vertex shared by both meshes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    pub const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    pub const STRIDE: u64 = size_of::<Vertex>() as u64;

    const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }
}

/// CPU-side triangle list with 32-bit indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Appends one quad as two triangles `(0,1,2)`, `(2,3,0)`.
    fn push_quad(&mut self, corners: [Vertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices
            .extend([0, 1, 2, 2, 3, 0].into_iter().map(|i| base + i));
    }
}

/// Builds an `x_patches` × `z_patches` grid of independent quads over
/// `[-1, 1]²` at `y = 0`.
///
/// Quad `(i, j)` occupies vertices `(i * z_patches + j) * 4 ..+ 4`.
pub fn build_water_mesh(x_patches: u32, z_patches: u32) -> Mesh {
    let quads = (x_patches as usize) * (z_patches as usize);
    let mut mesh = Mesh {
        vertices: Vec::with_capacity(quads * 4),
        indices: Vec::with_capacity(quads * 6),
    };

    let x_at = |i: u32| (2.0 / x_patches as f32) * i as f32 - 1.0;
    let z_at = |j: u32| (2.0 / z_patches as f32) * j as f32 - 1.0;

    for i in 0..x_patches {
        for j in 0..z_patches {
            mesh.push_quad([
                Vertex::new(x_at(i), 0.0, z_at(j)),
                Vertex::new(x_at(i), 0.0, z_at(j + 1)),
                Vertex::new(x_at(i + 1), 0.0, z_at(j + 1)),
                Vertex::new(x_at(i + 1), 0.0, z_at(j)),
            ]);
        }
    }

    mesh
}

const SKY_FACES: [[Vertex; 4]; 6] = [
    // front
    [
        Vertex::new(-1.0, -1.0, 1.0),
        Vertex::new(-1.0, 1.0, 1.0),
        Vertex::new(1.0, 1.0, 1.0),
        Vertex::new(1.0, -1.0, 1.0),
    ],
    // back
    [
        Vertex::new(1.0, -1.0, -1.0),
        Vertex::new(1.0, 1.0, -1.0),
        Vertex::new(-1.0, 1.0, -1.0),
        Vertex::new(-1.0, -1.0, -1.0),
    ],
    // top
    [
        Vertex::new(-1.0, 1.0, 1.0),
        Vertex::new(-1.0, 1.0, -1.0),
        Vertex::new(1.0, 1.0, -1.0),
        Vertex::new(1.0, 1.0, 1.0),
    ],
    // bottom
    [
        Vertex::new(-1.0, -1.0, -1.0),
        Vertex::new(-1.0, -1.0, 1.0),
        Vertex::new(1.0, -1.0, 1.0),
        Vertex::new(1.0, -1.0, -1.0),
    ],
    // left
    [
        Vertex::new(-1.0, -1.0, -1.0),
        Vertex::new(-1.0, 1.0, -1.0),
        Vertex::new(-1.0, 1.0, 1.0),
        Vertex::new(-1.0, -1.0, 1.0),
    ],
    // right
    [
        Vertex::new(1.0, -1.0, 1.0),
        Vertex::new(1.0, 1.0, 1.0),
        Vertex::new(1.0, 1.0, -1.0),
        Vertex::new(1.0, -1.0, -1.0),
    ],
];

/// Builds the unit sky cube, wound to be visible from inside.
pub fn build_sky_mesh() -> Mesh {
    let mut mesh = Mesh {
        vertices: Vec::with_capacity(24),
        indices: Vec::with_capacity(SKY_INDEX_COUNT as usize),
    };
    for face in SKY_FACES {
        mesh.push_quad(face);
    }
    mesh
}
