//! Resource-level mesh types.
//!
//! A `Mesh` is a list of submeshes, each one material-homogeneous chunk of
//! geometry. Every mesh gets a process-unique `MeshId` at construction, so
//! a reloaded asset never aliases cache entries of the one it replaced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use crate::graphics_device::Texture;
use crate::resource::material::Material;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique mesh identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    fn next() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// VERTICES
// ============================================================================

/// Mesh vertex: position, normal, texture coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

/// Line vertex: position and color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: Vec3,
    pub color: Vec3,
}

// ============================================================================
// SUBMESH / MESH
// ============================================================================

#[derive(Debug, Clone)]
pub struct SubMesh {
    pub vertices: Vec<Vertex>,
    /// Indices local to `vertices`
    pub indices: Vec<u32>,
    /// Index into the owning mesh's material list
    pub material_index: Option<usize>,
}

#[derive(Debug)]
pub struct Mesh {
    id: MeshId,
    sub_meshes: Vec<SubMesh>,
    materials: Vec<Arc<Material>>,
}

impl Mesh {
    pub fn new(sub_meshes: Vec<SubMesh>, materials: Vec<Arc<Material>>) -> Self {
        Self {
            id: MeshId::next(),
            sub_meshes,
            materials,
        }
    }

    /// Unit quad in the XY plane facing +Z
    pub fn quad(material: Material) -> Self {
        let normal = Vec3::Z;
        let corner = |x: f32, y: f32, u: f32, v: f32| Vertex {
            position: Vec3::new(x, y, 0.0),
            normal,
            tex_coord: Vec2::new(u, v),
        };
        let sub_mesh = SubMesh {
            vertices: vec![
                corner(-0.5, -0.5, 0.0, 0.0),
                corner(0.5, -0.5, 1.0, 0.0),
                corner(0.5, 0.5, 1.0, 1.0),
                corner(-0.5, 0.5, 0.0, 1.0),
            ],
            indices: vec![0, 1, 2, 2, 3, 0],
            material_index: Some(0),
        };
        Self::new(vec![sub_mesh], vec![Arc::new(material)])
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }

    /// Material of submesh `index`, if it has one
    pub fn material_for(&self, index: usize) -> Option<&Arc<Material>> {
        self.sub_meshes
            .get(index)
            .and_then(|sub_mesh| sub_mesh.material_index)
            .and_then(|material| self.materials.get(material))
    }
}

// ============================================================================
// PRIMITIVES
// ============================================================================

/// Flat or textured quad
#[derive(Debug, Clone)]
pub struct Quad {
    pub color: Vec4,
    pub texture: Option<Arc<dyn Texture>>,
}

impl Quad {
    pub fn colored(color: Vec4) -> Self {
        Self { color, texture: None }
    }

    pub fn textured(texture: Arc<dyn Texture>) -> Self {
        Self { color: Vec4::ONE, texture: Some(texture) }
    }

    pub(crate) fn to_mesh(&self) -> Mesh {
        let material = match &self.texture {
            Some(texture) => Material::from_texture(texture.clone(), self.color),
            None => Material::from_color(self.color),
        };
        Mesh::quad(material)
    }
}

/// Line segment with per-endpoint colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub p0: LineVertex,
    pub p1: LineVertex,
}

impl Line {
    pub fn new(from: Vec3, to: Vec3, color: Vec3) -> Self {
        Self {
            p0: LineVertex { position: from, color },
            p1: LineVertex { position: to, color },
        }
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
