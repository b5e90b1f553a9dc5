//! Render resources: structured GPU buffers, meshes and materials
//!
//! Meshes and materials arrive from the asset layer already resolved; this
//! module only describes them in the shape the renderer consumes.

pub mod buffer;
pub mod material;
pub mod mesh;

pub use buffer::{Buffer, BufferDesc, BufferKind, FieldDesc, FieldType};
pub use material::{Material, MaterialId};
pub use mesh::{Line, LineVertex, Mesh, MeshId, Quad, SubMesh, Vertex};
