/// Light uniform buffers for deferred lighting.
///
/// One std140 UBO per light kind. The directional buffer has a single
/// slot that every submission overwrites; point lights and spotlights are
/// appended in submission order and counted until `reset`.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use crate::config::{BloomSettings, LightSettings};
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::renderer::UniformData;
use crate::resource::{Buffer, BufferDesc, BufferKind, FieldDesc, FieldType};
use crate::scene::components::{DirectionalLight, LightComponent, PointLight, Spotlight};
use crate::engine_warn;

/// Uniform buffer bindings on the lighting command
pub const DIRECTIONAL_LIGHT_BINDING: u32 = 0;
pub const POINT_LIGHT_BINDING: u32 = 1;
pub const SPOTLIGHT_BINDING: u32 = 2;

fn vec4(v: Vec3) -> Vec4 {
    v.extend(0.0)
}

// ===== GPU RECORDS =====

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightData {
    pub position: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub direction: Vec4,
}

impl From<&DirectionalLight> for DirectionalLightData {
    fn from(light: &DirectionalLight) -> Self {
        Self {
            position: vec4(light.position),
            ambient: vec4(light.ambient),
            diffuse: vec4(light.diffuse),
            specular: vec4(light.specular),
            direction: vec4(light.direction),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightData {
    pub position: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub bloom_strength: f32,
}

impl PointLightData {
    /// `bloom_strength` applies only to lights flagged for bloom
    pub fn new(light: &PointLight, bloom_strength: f32) -> Self {
        Self {
            position: vec4(light.position),
            ambient: vec4(light.ambient),
            diffuse: vec4(light.diffuse),
            specular: vec4(light.specular),
            constant: light.constant,
            linear: light.linear,
            quadratic: light.quadratic,
            bloom_strength: if light.bloom { bloom_strength } else { 0.0 },
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpotlightData {
    pub position: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub direction: Vec4,
    pub cutoff_angle: f32,
    pub outer_cutoff_angle: f32,
    pub _padding: [f32; 2],
}

impl From<&Spotlight> for SpotlightData {
    fn from(light: &Spotlight) -> Self {
        Self {
            position: vec4(light.position),
            ambient: vec4(light.ambient),
            diffuse: vec4(light.diffuse),
            specular: vec4(light.specular),
            direction: vec4(light.direction),
            cutoff_angle: light.cutoff_angle,
            outer_cutoff_angle: light.outer_cutoff_angle,
            _padding: [0.0; 2],
        }
    }
}

// ===== LAYOUTS =====

fn base_fields() -> Vec<FieldDesc> {
    vec![
        FieldDesc::new("Position", FieldType::Vec4),
        FieldDesc::new("Ambient", FieldType::Vec4),
        FieldDesc::new("Diffuse", FieldType::Vec4),
        FieldDesc::new("Specular", FieldType::Vec4),
    ]
}

fn directional_fields() -> Vec<FieldDesc> {
    let mut fields = base_fields();
    fields.push(FieldDesc::new("Direction", FieldType::Vec4));
    fields
}

fn point_fields() -> Vec<FieldDesc> {
    let mut fields = base_fields();
    fields.extend([
        FieldDesc::new("Constant", FieldType::Float),
        FieldDesc::new("Linear", FieldType::Float),
        FieldDesc::new("Quadratic", FieldType::Float),
        FieldDesc::new("BloomStrength", FieldType::Float),
    ]);
    fields
}

fn spot_fields() -> Vec<FieldDesc> {
    let mut fields = directional_fields();
    fields.extend([
        FieldDesc::new("CutoffAngle", FieldType::Float),
        FieldDesc::new("OuterCutoffAngle", FieldType::Float),
        FieldDesc::new("_padding1", FieldType::Float),
        FieldDesc::new("_padding2", FieldType::Float),
    ]);
    fields
}

// ===== LIGHT BUFFERS =====

#[derive(Debug)]
pub struct LightBuffers {
    directional: Buffer,
    point: Buffer,
    spot: Buffer,
    bloom_strength: f32,
    has_directional: bool,
    point_count: u32,
    spot_count: u32,
}

impl LightBuffers {
    pub fn create(device: &mut dyn GraphicsDevice, settings: &LightSettings, bloom: &BloomSettings) -> Result<Self> {
        let uniform = |name: &str, fields: Vec<FieldDesc>, count: u32| BufferDesc {
            name: name.to_string(),
            kind: BufferKind::Uniform,
            fields,
            count,
        };

        Ok(Self {
            directional: Buffer::create(device, uniform("DirectionalLights", directional_fields(), settings.max_directional))?,
            point: Buffer::create(device, uniform("PointLights", point_fields(), settings.max_point))?,
            spot: Buffer::create(device, uniform("Spotlights", spot_fields(), settings.max_spot))?,
            bloom_strength: bloom.strength,
            has_directional: false,
            point_count: 0,
            spot_count: 0,
        })
    }

    /// Write one light; a full point/spot array drops the light with a warning
    pub fn submit(&mut self, light: &LightComponent) -> Result<()> {
        match light {
            LightComponent::Directional(light) => {
                self.directional.write(0, &DirectionalLightData::from(light))?;
                self.has_directional = true;
            }
            LightComponent::Point(light) => {
                if self.point_count >= self.point.count() {
                    engine_warn!("magma::Lighting",
                        "Point light dropped: all {} slots in use", self.point.count());
                    return Ok(());
                }
                self.point.write(self.point_count, &PointLightData::new(light, self.bloom_strength))?;
                self.point_count += 1;
            }
            LightComponent::Spot(light) => {
                if self.spot_count >= self.spot.count() {
                    engine_warn!("magma::Lighting",
                        "Spotlight dropped: all {} slots in use", self.spot.count());
                    return Ok(());
                }
                self.spot.write(self.spot_count, &SpotlightData::from(light))?;
                self.spot_count += 1;
            }
        }
        Ok(())
    }

    pub fn has_directional(&self) -> bool {
        self.has_directional
    }

    pub fn point_count(&self) -> u32 {
        self.point_count
    }

    pub fn spot_count(&self) -> u32 {
        self.spot_count
    }

    pub fn point_buffer(&self) -> &Buffer {
        &self.point
    }

    /// Write the light counts and bind the three buffers
    pub fn bind(&self, uniforms: &mut UniformData) {
        uniforms.set("u_DirectionalLightCount", self.has_directional as i32);
        uniforms.set("u_PointLightCount", self.point_count as i32);
        uniforms.set("u_SpotlightCount", self.spot_count as i32);
        uniforms.set_uniform_buffer(DIRECTIONAL_LIGHT_BINDING, self.directional.device_buffer().clone());
        uniforms.set_uniform_buffer(POINT_LIGHT_BINDING, self.point.device_buffer().clone());
        uniforms.set_uniform_buffer(SPOTLIGHT_BINDING, self.spot.device_buffer().clone());
    }

    /// Start a new frame: counters back to zero, contents left as is
    pub fn reset(&mut self) {
        self.has_directional = false;
        self.point_count = 0;
        self.spot_count = 0;
    }
}

#[cfg(test)]
#[path = "lighting_tests.rs"]
mod tests;
