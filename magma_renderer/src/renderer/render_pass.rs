/// RenderPass - binding of pipeline, output target and draw buffer
///
/// Many commands target one pass. The pass also keeps the "sticky"
/// uniforms propagated by `PopCommand`, inherited by every command created
/// on it afterwards.

use std::sync::Arc;
use crate::graphics_device::{Framebuffer, Pipeline, PipelineKind};
use crate::renderer::draw_buffer::DrawBufferKey;
use crate::renderer::uniform::UniformData;

slotmap::new_key_type! {
    /// Stable handle to a pass registered in a `RendererContext`
    pub struct RenderPassKey;
}

/// Creation parameters
#[derive(Debug, Clone)]
pub struct RenderPassSpecification {
    /// Pipeline (shader) name, also used as the pass name
    pub pipeline: String,
    pub kind: PipelineKind,
    /// `None` renders to the default (screen) target
    pub output: Option<Arc<Framebuffer>>,
    /// Geometry source; `None` for compute passes
    pub buffer: Option<DrawBufferKey>,
}

impl RenderPassSpecification {
    pub fn graphics(pipeline: &str, output: Option<Arc<Framebuffer>>, buffer: DrawBufferKey) -> Self {
        Self {
            pipeline: pipeline.to_string(),
            kind: PipelineKind::Graphics,
            output,
            buffer: Some(buffer),
        }
    }

    pub fn compute(pipeline: &str) -> Self {
        Self {
            pipeline: pipeline.to_string(),
            kind: PipelineKind::Compute,
            output: None,
            buffer: None,
        }
    }
}

#[derive(Debug)]
pub struct RenderPass {
    name: String,
    pipeline: Arc<dyn Pipeline>,
    output: Option<Arc<Framebuffer>>,
    buffer: Option<DrawBufferKey>,
    sticky: UniformData,
}

impl RenderPass {
    pub(crate) fn new(spec: RenderPassSpecification, pipeline: Arc<dyn Pipeline>) -> Self {
        Self {
            name: spec.pipeline,
            pipeline,
            output: spec.output,
            buffer: spec.buffer,
            sticky: UniformData::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pipeline(&self) -> &Arc<dyn Pipeline> {
        &self.pipeline
    }

    pub fn is_compute(&self) -> bool {
        self.pipeline.kind() == PipelineKind::Compute
    }

    pub fn output(&self) -> Option<&Arc<Framebuffer>> {
        self.output.as_ref()
    }

    pub fn buffer(&self) -> Option<DrawBufferKey> {
        self.buffer
    }

    /// Uniforms inherited by new commands on this pass
    pub fn sticky_uniforms(&self) -> &UniformData {
        &self.sticky
    }

    pub(crate) fn sticky_uniforms_mut(&mut self) -> &mut UniformData {
        &mut self.sticky
    }
}
