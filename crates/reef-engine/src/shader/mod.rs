//! Shader program store.
//!
//! One external WGSL file provides four entry points (water/sky × vertex/
//! fragment). The source is parsed and validated up front so compiler
//! diagnostics can be reported verbatim; the vertex input layout is derived
//! from the water vertex entry point's signature and shared by both meshes.

mod layout;
mod programs;
mod source;

pub use layout::{InputAttribute, InputLayout};
pub(crate) use programs::binding;
pub use programs::{Pass, ShaderPrograms};
pub use source::{EntryPoints, ProgramSource, ProgramStage, ShaderProgram};
