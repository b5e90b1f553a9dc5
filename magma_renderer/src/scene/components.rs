//! Resolved component data handed to scene renderers.
//!
//! The entity store and asset loading live outside this crate: a driver
//! iterates entities and passes each renderer the already-loaded handles.

use std::sync::Arc;
use glam::{EulerRot, Mat4, Quat, Vec3};
use crate::camera::Camera;
use crate::graphics_device::Texture;
use crate::resource::{Material, MaterialId, Mesh};

/// Stable entity identity, owned by the external entity store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in radians, applied X then Y then Z
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    /// translation * rotation * scale
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::ZYX, self.rotation.z, self.rotation.y, self.rotation.x);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CameraComponent {
    pub camera: Option<Camera>,
}

/// Material asset with its identity, used as a batching key
#[derive(Debug, Clone)]
pub struct MaterialAsset {
    pub id: MaterialId,
    pub material: Arc<Material>,
}

#[derive(Debug, Clone, Default)]
pub struct MeshComponent {
    /// `None` when the mesh asset failed to resolve
    pub mesh: Option<Arc<Mesh>>,
    /// `None` draws with the mesh's own materials
    pub material: Option<MaterialAsset>,
}

#[derive(Debug, Clone, Default)]
pub struct SkyboxComponent {
    pub cubemap: Option<Arc<dyn Texture>>,
}

// ===== LIGHTS =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    /// Contributes to the bloom pass
    pub bloom: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spotlight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub direction: Vec3,
    /// Cosines of the inner and outer cone angles
    pub cutoff_angle: f32,
    pub outer_cutoff_angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightComponent {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(Spotlight),
}

impl LightComponent {
    pub fn position(&self) -> Vec3 {
        match self {
            LightComponent::Directional(light) => light.position,
            LightComponent::Point(light) => light.position,
            LightComponent::Spot(light) => light.position,
        }
    }
}

// ===== PARTICLES =====

#[derive(Debug, Clone)]
pub struct ParticleEmitterComponent {
    pub position: Vec3,
    pub max_particle_count: u32,
    /// Milliseconds
    pub particle_lifetime: f32,
    /// Milliseconds between spawns
    pub spawn_interval: f32,
    /// Spawn radius around `position`
    pub offset: f32,
    pub texture: Option<Arc<dyn Texture>>,
}

impl Default for ParticleEmitterComponent {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            max_particle_count: 100,
            particle_lifetime: 1000.0,
            spawn_interval: 100.0,
            offset: 0.0,
            texture: None,
        }
    }
}

#[cfg(test)]
#[path = "components_tests.rs"]
mod tests;
