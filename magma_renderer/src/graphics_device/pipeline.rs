/// Pipeline trait and pipeline descriptor

use std::fmt;

/// Pipeline flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Rasterization (vertex + fragment)
    Graphics,
    /// Compute dispatch
    Compute,
}

/// Descriptor for creating a pipeline
///
/// Shader modules are owned by the backend's shader library and looked up
/// by `name` ("Lighting", "Bloom-Downsample", "Particle-Emit", ...).
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    pub name: String,
    pub kind: PipelineKind,
}

/// Pipeline resource trait
pub trait Pipeline: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    fn kind(&self) -> PipelineKind;
}
