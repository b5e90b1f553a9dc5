/// Renderer configuration
///
/// Capacities are fixed at `RendererContext::init`: draw buffers never grow,
/// so they must be sized for the expected scene scale up front.

/// Draw-call instance ceiling: a call that reaches it is closed and a new one started
pub const INSTANCES_PER_CALL: u32 = 10_000;

/// Draw buffer capacities derived from a triangle budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererLimits {
    pub max_triangles: u32,
    pub max_indices: u32,
    pub max_vertices: u32,
    pub max_instances: u32,
    pub line_max_indices: u32,
    pub line_max_vertices: u32,
}

impl RendererLimits {
    /// 6 indices, 3 vertices and 4 instances per triangle of budget
    pub fn from_max_triangles(max_triangles: u32) -> Self {
        Self {
            max_triangles,
            max_indices: max_triangles * 6,
            max_vertices: max_triangles * 3,
            max_instances: max_triangles * 4,
            line_max_indices: 1_000_000,
            line_max_vertices: 2_000_000,
        }
    }
}

impl Default for RendererLimits {
    fn default() -> Self {
        Self::from_max_triangles(1_000_000)
    }
}

/// Bloom post-process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub mip_chain_length: u32,
    /// Upsample tent filter radius (UV units)
    pub filter_radius: f32,
    pub exposure: f32,
    /// Composite mix factor, also the per-light bloom weight
    pub strength: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            mip_chain_length: 10,
            filter_radius: 0.005,
            exposure: 1.0,
            strength: 0.04,
        }
    }
}

/// Light uniform buffer capacities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightSettings {
    pub max_directional: u32,
    pub max_point: u32,
    pub max_spot: u32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            max_directional: 1,
            max_point: 50,
            max_spot: 50,
        }
    }
}

/// GPU particle simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSettings {
    /// Local size of the emit compute shader
    pub emit_workgroup_size: u32,
    /// Local size of the update compute shader
    pub update_workgroup_size: u32,
    /// Billboard edge length in world units
    pub billboard_size: f32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            emit_workgroup_size: 64,
            update_workgroup_size: 128,
            billboard_size: 0.1,
        }
    }
}

/// Top-level renderer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub limits: RendererLimits,
    /// Window / output size in pixels
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub bloom: BloomSettings,
    pub lights: LightSettings,
    pub particles: ParticleSettings,
    /// Editor icon instances per frame
    pub max_billboards: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: RendererLimits::default(),
            viewport_width: 1920,
            viewport_height: 1080,
            bloom: BloomSettings::default(),
            lights: LightSettings::default(),
            particles: ParticleSettings::default(),
            max_billboards: 152,
        }
    }
}
