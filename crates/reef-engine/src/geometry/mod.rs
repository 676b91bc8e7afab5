//! Geometry store: the water grid and the sky cube.

mod mesh;
mod store;

pub use mesh::{build_sky_mesh, build_water_mesh, Mesh, Vertex, SKY_INDEX_COUNT};
pub use store::{GpuMesh, MeshStore};
