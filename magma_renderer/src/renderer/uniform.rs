/// Uniform binding table carried by every command

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use crate::graphics_device::{Buffer, Texture};

/// Plain uniform value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        UniformValue::Bool(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        UniformValue::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

/// Texture bound to a sampler slot
#[derive(Debug, Clone)]
pub struct TextureBinding {
    pub slot: u32,
    pub texture: Arc<dyn Texture>,
}

/// Named uniforms plus texture/cubemap/buffer bindings
#[derive(Debug, Clone, Default)]
pub struct UniformData {
    values: FxHashMap<String, UniformValue>,
    textures: FxHashMap<String, TextureBinding>,
    cubemaps: FxHashMap<String, TextureBinding>,
    uniform_buffers: FxHashMap<u32, Arc<dyn Buffer>>,
    storage_buffers: FxHashMap<u32, Arc<dyn Buffer>>,
}

impl UniformData {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== SETTERS =====

    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn set_texture(&mut self, name: &str, slot: u32, texture: Arc<dyn Texture>) {
        self.textures.insert(name.to_string(), TextureBinding { slot, texture });
    }

    pub fn set_cubemap(&mut self, name: &str, slot: u32, cubemap: Arc<dyn Texture>) {
        self.cubemaps.insert(name.to_string(), TextureBinding { slot, texture: cubemap });
    }

    pub fn set_uniform_buffer(&mut self, binding: u32, buffer: Arc<dyn Buffer>) {
        self.uniform_buffers.insert(binding, buffer);
    }

    pub fn set_storage_buffer(&mut self, binding: u32, buffer: Arc<dyn Buffer>) {
        self.storage_buffers.insert(binding, buffer);
    }

    // ===== GETTERS =====

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            UniformValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            UniformValue::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            UniformValue::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_vec2(&self, name: &str) -> Option<Vec2> {
        match self.get(name)? {
            UniformValue::Vec2(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_vec3(&self, name: &str) -> Option<Vec3> {
        match self.get(name)? {
            UniformValue::Vec3(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_vec4(&self, name: &str) -> Option<Vec4> {
        match self.get(name)? {
            UniformValue::Vec4(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_mat4(&self, name: &str) -> Option<Mat4> {
        match self.get(name)? {
            UniformValue::Mat4(value) => Some(value),
            _ => None,
        }
    }

    pub fn texture(&self, name: &str) -> Option<&TextureBinding> {
        self.textures.get(name)
    }

    pub fn cubemap(&self, name: &str) -> Option<&TextureBinding> {
        self.cubemaps.get(name)
    }

    pub fn uniform_buffer(&self, binding: u32) -> Option<&Arc<dyn Buffer>> {
        self.uniform_buffers.get(&binding)
    }

    pub fn storage_buffer(&self, binding: u32) -> Option<&Arc<dyn Buffer>> {
        self.storage_buffers.get(&binding)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn textures(&self) -> impl Iterator<Item = (&str, &TextureBinding)> {
        self.textures.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
            && self.textures.is_empty()
            && self.cubemaps.is_empty()
            && self.uniform_buffers.is_empty()
            && self.storage_buffers.is_empty()
    }

    // ===== COMBINING =====

    /// Copy entries of `other`, overwriting existing ones
    pub fn merge(&mut self, other: &UniformData) {
        self.values.extend(other.values.iter().map(|(k, v)| (k.clone(), *v)));
        self.textures.extend(other.textures.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.cubemaps.extend(other.cubemaps.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.uniform_buffers.extend(other.uniform_buffers.iter().map(|(k, v)| (*k, v.clone())));
        self.storage_buffers.extend(other.storage_buffers.iter().map(|(k, v)| (*k, v.clone())));
    }

    /// Copy entries of `other` that are not set here
    pub fn inherit(&mut self, other: &UniformData) {
        for (name, value) in &other.values {
            self.values.entry(name.clone()).or_insert(*value);
        }
        for (name, binding) in &other.textures {
            self.textures.entry(name.clone()).or_insert_with(|| binding.clone());
        }
        for (name, binding) in &other.cubemaps {
            self.cubemaps.entry(name.clone()).or_insert_with(|| binding.clone());
        }
        for (binding, buffer) in &other.uniform_buffers {
            self.uniform_buffers.entry(*binding).or_insert_with(|| buffer.clone());
        }
        for (binding, buffer) in &other.storage_buffers {
            self.storage_buffers.entry(*binding).or_insert_with(|| buffer.clone());
        }
    }
}

#[cfg(test)]
#[path = "uniform_tests.rs"]
mod tests;
