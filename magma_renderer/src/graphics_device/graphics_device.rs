/// GraphicsDevice trait - factory for GPU resources and sink for submitted frames
///
/// The renderer core never talks to a native API directly. A backend
/// implements this trait; `RendererContext::flush` hands it every command
/// accumulated since the previous flush, in recording order.

use std::sync::Arc;
use slotmap::SlotMap;
use crate::error::Result;
use crate::graphics_device::{Buffer, BufferDesc, Pipeline, PipelineDesc, Texture, TextureDesc};
use crate::renderer::{Command, DrawBuffer, DrawBufferKey, RenderPass, RenderPassKey};

/// Everything a backend needs to execute one flush
///
/// Commands reference passes and draw buffers by key; both registries are
/// borrowed so the backend can resolve them.
pub struct Submission<'a> {
    pub commands: &'a [Command],
    pub passes: &'a SlotMap<RenderPassKey, RenderPass>,
    pub buffers: &'a SlotMap<DrawBufferKey, DrawBuffer>,
}

impl<'a> Submission<'a> {
    /// Pass a command targets, if any
    pub fn pass_of(&self, command: &Command) -> Option<&'a RenderPass> {
        command.pass().and_then(|key| self.passes.get(key))
    }

    /// Draw buffer bound to a pass, if any
    pub fn buffer_of(&self, pass: &RenderPass) -> Option<&'a DrawBuffer> {
        pass.buffer().and_then(|key| self.buffers.get(key))
    }
}

/// Backend-facing device
///
/// Submission order is preserved: after `submit` returns, every command of
/// that submission executes before any command of the next one.
pub trait GraphicsDevice: Send {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Execute draw and compute commands in order
    fn submit(&mut self, submission: &Submission<'_>) -> Result<()>;

    /// Block until the GPU has finished all submitted work
    fn wait_idle(&mut self) -> Result<()>;
}
