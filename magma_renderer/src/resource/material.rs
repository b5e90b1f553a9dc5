/// Surface description bound by mesh commands
///
/// Textures are already-loaded handles; a missing texture falls back to the
/// matching color.

use std::sync::Arc;
use glam::Vec4;
use crate::graphics_device::Texture;
use crate::renderer::UniformData;

/// Stable asset identity of a material (assigned by the asset layer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u64);

#[derive(Debug, Clone)]
pub struct Material {
    pub diffuse: Option<Arc<dyn Texture>>,
    pub specular: Option<Arc<dyn Texture>>,
    pub emissive: Option<Arc<dyn Texture>>,
    pub diffuse_color: Vec4,
    pub specular_color: Vec4,
    pub emissive_color: Vec4,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: None,
            specular: None,
            emissive: None,
            diffuse_color: Vec4::ONE,
            specular_color: Vec4::ZERO,
            emissive_color: Vec4::ZERO,
        }
    }
}

impl Material {
    /// Untextured material with a flat diffuse color
    pub fn from_color(color: Vec4) -> Self {
        Self {
            diffuse_color: color,
            ..Self::default()
        }
    }

    /// Textured material tinted by `color`
    pub fn from_texture(texture: Arc<dyn Texture>, color: Vec4) -> Self {
        Self {
            diffuse: Some(texture),
            diffuse_color: color,
            ..Self::default()
        }
    }

    pub fn is_textured(&self) -> bool {
        self.diffuse.is_some()
    }

    /// Bind `u_Material.*` (diffuse/specular/emissive maps on slots 0/1/2)
    pub fn bind(&self, uniforms: &mut UniformData) {
        self.bind_diffuse(uniforms);
        if let Some(texture) = &self.specular {
            uniforms.set_texture("u_Material.Specular", 1, texture.clone());
        }
        if let Some(texture) = &self.emissive {
            uniforms.set_texture("u_Material.Emissive", 2, texture.clone());
        }
        uniforms.set("u_Material.SpecularColor", self.specular_color);
        uniforms.set("u_Material.EmissiveColor", self.emissive_color);
    }

    /// Bind only the diffuse map and color (unlit preview)
    pub fn bind_diffuse(&self, uniforms: &mut UniformData) {
        uniforms.set("u_Material.IsTextured", self.is_textured());
        if let Some(texture) = &self.diffuse {
            uniforms.set_texture("u_Material.Diffuse", 0, texture.clone());
        }
        uniforms.set("u_Material.DiffuseColor", self.diffuse_color);
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
