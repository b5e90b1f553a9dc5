/// RendererContext - frame, pass and command-stack state shared by every
/// submission helper
///
/// Single-threaded and frame-lockstep: everything between `begin_frame`
/// and `end_frame` happens on the thread that owns the context. The stack
/// only tracks commands that are still being configured; commands already
/// queued stay queued until `flush`, whatever happens to the stack.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use slotmap::SlotMap;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, PipelineDesc, Submission};
use crate::renderer::command::{Command, CommandId, CommandQueue, ComputeCommand, DrawCommand, Viewport};
use crate::renderer::draw_buffer::{DrawBuffer, DrawBufferKey, DrawBufferSpecification};
use crate::renderer::frame::{FrameCounters, FrameData, FrameDebugInfo};
use crate::renderer::render_pass::{RenderPass, RenderPassKey, RenderPassSpecification};
use crate::renderer::renderer_2d::{Renderer2D, Renderer2DState};
use crate::renderer::renderer_3d::{Renderer3D, Renderer3DState};
use crate::{engine_assert, engine_bail, engine_debug, engine_fatal, engine_info, engine_trace, engine_warn};

const SOURCE: &str = "magma::Renderer";

/// Lock the shared device, mapping poisoning to a backend error
pub(crate) fn lock_device<'a>(
    device: &'a Arc<Mutex<dyn GraphicsDevice + 'static>>,
) -> Result<MutexGuard<'a, dyn GraphicsDevice + 'static>> {
    device.lock()
        .map_err(|_| Error::BackendError("Graphics device lock poisoned".to_string()))
}

pub struct RendererContext {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    config: Config,
    buffers: SlotMap<DrawBufferKey, DrawBuffer>,
    passes: SlotMap<RenderPassKey, RenderPass>,
    queue: CommandQueue,
    stack: Vec<CommandId>,
    active_pass: Option<RenderPassKey>,
    counters: FrameCounters,
    frame: FrameData,
    in_frame: bool,
    pub(crate) renderer_2d: Option<Renderer2DState>,
    pub(crate) renderer_3d: Option<Renderer3DState>,
}

impl RendererContext {
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, config: Config) -> Self {
        Self {
            device,
            config,
            buffers: SlotMap::with_key(),
            passes: SlotMap::with_key(),
            queue: CommandQueue::default(),
            stack: Vec::new(),
            active_pass: None,
            counters: FrameCounters::default(),
            frame: FrameData::default(),
            in_frame: false,
            renderer_2d: None,
            renderer_3d: None,
        }
    }

    // ===== LIFECYCLE =====

    /// Allocate the shared 2D and 3D draw buffers
    pub fn init(&mut self) -> Result<()> {
        if self.is_initialized() {
            engine_bail!(SOURCE, "Renderer already initialized");
        }
        self.renderer_3d = Some(Renderer3D::init(self)?);
        self.renderer_2d = Some(Renderer2D::init(self)?);
        engine_info!(SOURCE, "Renderer initialized ({} max triangles)", self.config.limits.max_triangles);
        Ok(())
    }

    /// Release the shared draw buffers after the GPU went idle
    pub fn close(&mut self) -> Result<()> {
        if !self.is_initialized() {
            engine_warn!(SOURCE, "Renderer closed without being initialized");
            return Ok(());
        }
        lock_device(&self.device)?.wait_idle()?;

        self.stack.clear();
        self.active_pass = None;
        self.queue.reset();
        if let Some(state) = self.renderer_2d.take() {
            Renderer2D::close(self, state);
        }
        if let Some(state) = self.renderer_3d.take() {
            Renderer3D::close(self, state);
        }
        engine_info!(SOURCE, "Renderer closed");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.renderer_2d.is_some() && self.renderer_3d.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }

    /// Run `f` with the device locked
    pub fn with_device<R>(&self, f: impl FnOnce(&mut dyn GraphicsDevice) -> Result<R>) -> Result<R> {
        let mut device = lock_device(&self.device)?;
        f(&mut *device)
    }

    // ===== RESOURCES =====

    pub fn create_draw_buffer(&mut self, spec: DrawBufferSpecification) -> Result<DrawBufferKey> {
        let buffer = DrawBuffer::create(&mut *lock_device(&self.device)?, spec)?;
        engine_debug!(SOURCE, "Draw buffer '{}' created", buffer.name());
        Ok(self.buffers.insert(buffer))
    }

    pub fn destroy_draw_buffer(&mut self, key: DrawBufferKey) {
        self.buffers.remove(key);
    }

    pub fn draw_buffer(&self, key: DrawBufferKey) -> Option<&DrawBuffer> {
        self.buffers.get(key)
    }

    pub fn draw_buffer_mut(&mut self, key: DrawBufferKey) -> Option<&mut DrawBuffer> {
        self.buffers.get_mut(key)
    }

    pub fn create_pass(&mut self, spec: RenderPassSpecification) -> Result<RenderPassKey> {
        if let Some(buffer) = spec.buffer {
            if !self.buffers.contains_key(buffer) {
                engine_bail!(SOURCE, "Pass '{}' references an unknown draw buffer", spec.pipeline);
            }
        }
        let pipeline = lock_device(&self.device)?.create_pipeline(PipelineDesc {
            name: spec.pipeline.clone(),
            kind: spec.kind,
        })?;
        Ok(self.passes.insert(RenderPass::new(spec, pipeline)))
    }

    pub fn destroy_pass(&mut self, key: RenderPassKey) {
        if self.active_pass == Some(key) {
            self.end_pass();
        }
        self.passes.remove(key);
    }

    pub fn pass(&self, key: RenderPassKey) -> Option<&RenderPass> {
        self.passes.get(key)
    }

    // ===== FRAME =====

    pub fn begin_frame(&mut self) {
        if self.in_frame {
            engine_warn!(SOURCE, "begin_frame called twice without end_frame");
        }
        self.in_frame = true;
        self.frame.tick(Instant::now());
        self.counters = FrameCounters::default();
        Renderer3D::start_frame(self);
    }

    /// Snapshot the frame counters for diagnostics
    pub fn end_frame(&mut self) {
        if !self.queue.is_empty() {
            engine_warn!(SOURCE, "end_frame with {} unflushed commands", self.queue.len());
        }
        self.frame.capture(&self.counters);
        self.in_frame = false;
    }

    /// Totals accumulated since `begin_frame`
    pub fn counters(&self) -> &FrameCounters {
        &self.counters
    }

    /// Snapshot taken by the last `end_frame`
    pub fn frame_debug_info(&self) -> &FrameDebugInfo {
        self.frame.debug_info()
    }

    // ===== PASS / COMMAND STACK =====

    /// Activate `pass`, optionally pushing a fresh command for it
    pub fn start_pass(&mut self, pass: RenderPassKey, push_command: bool) {
        engine_assert!(self.passes.contains_key(pass), SOURCE, "start_pass on an unknown pass");
        if self.active_pass.is_some() {
            engine_warn!(SOURCE, "start_pass while another pass is active; abandoning its stack");
            self.stack.clear();
        }
        engine_trace!(SOURCE, "Start pass '{}'", self.passes[pass].name());
        self.active_pass = Some(pass);
        if push_command {
            self.push_command();
        }
    }

    /// Clear the stack and the active pass (queued commands are kept)
    pub fn end_pass(&mut self) {
        self.stack.clear();
        self.active_pass = None;
    }

    pub fn active_pass(&self) -> Option<RenderPassKey> {
        self.active_pass
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Queue a command bound to the active pass and push it
    pub fn push_command(&mut self) -> CommandId {
        let id = self.create_command(self.active_pass);
        self.stack.push(id);
        id
    }

    /// Pop the top command; its uniforms become sticky on its pass
    pub fn pop_command(&mut self) {
        let id = match self.stack.pop() {
            Some(id) => id,
            None => engine_fatal!(SOURCE, "pop_command on an empty command stack"),
        };
        let command = self.command(id);
        if let Some(pass) = command.pass() {
            let uniforms = command.uniforms().clone();
            if let Some(pass) = self.passes.get_mut(pass) {
                pass.sticky_uniforms_mut().merge(&uniforms);
            }
        }
    }

    /// Top of the stack
    pub fn get_command(&self) -> CommandId {
        match self.stack.last() {
            Some(id) => *id,
            None => engine_fatal!(SOURCE, "get_command on an empty command stack"),
        }
    }

    /// Top of the stack if any
    pub fn current_command(&self) -> Option<CommandId> {
        self.stack.last().copied()
    }

    /// Push a new command, or return the top one when `use_previous` is set
    /// and it has not recorded anything yet
    pub fn new_command(&mut self, use_previous: bool) -> CommandId {
        if use_previous {
            if let Some(&top) = self.stack.last() {
                if self.command(top).is_empty() {
                    return top;
                }
            }
        }
        self.push_command()
    }

    /// Queue a command without pushing it
    ///
    /// The command inherits the sticky uniforms of `pass` and is drawn or
    /// dispatched depending on the pass pipeline.
    pub fn create_command(&mut self, pass: Option<RenderPassKey>) -> CommandId {
        let render_pass = pass.and_then(|key| self.passes.get(key));
        let mut command = match render_pass {
            Some(render_pass) if render_pass.is_compute() => Command::Compute(ComputeCommand::new(pass)),
            _ => Command::Draw(DrawCommand::new(pass)),
        };
        if let Some(render_pass) = render_pass {
            command.uniforms_mut().inherit(render_pass.sticky_uniforms());
        }
        self.queue.push(command)
    }

    pub fn command(&self, id: CommandId) -> &Command {
        match self.queue.get(id) {
            Some(command) => command,
            None => engine_fatal!(SOURCE, "{:?} does not belong to the current flush", id),
        }
    }

    pub fn command_mut(&mut self, id: CommandId) -> &mut Command {
        match self.queue.get_mut(id) {
            Some(command) => command,
            None => engine_fatal!(SOURCE, "{:?} does not belong to the current flush", id),
        }
    }

    /// Whether `id` still refers to a queued command
    pub fn is_live(&self, id: CommandId) -> bool {
        self.queue.get(id).is_some()
    }

    pub fn draw_command(&self, id: CommandId) -> &DrawCommand {
        match self.command(id).as_draw() {
            Some(command) => command,
            None => engine_fatal!(SOURCE, "{:?} is a compute dispatch, not a draw command", id),
        }
    }

    pub fn draw_command_mut(&mut self, id: CommandId) -> &mut DrawCommand {
        match self.command_mut(id) {
            Command::Draw(command) => command,
            Command::Compute(_) => engine_fatal!(SOURCE, "{:?} is a compute dispatch, not a draw command", id),
        }
    }

    pub fn compute_command_mut(&mut self, id: CommandId) -> &mut ComputeCommand {
        match self.command_mut(id) {
            Command::Compute(command) => command,
            Command::Draw(_) => engine_fatal!(SOURCE, "{:?} is a draw command, not a compute dispatch", id),
        }
    }

    /// Commands queued since the last flush
    pub fn queued_commands(&self) -> &[Command] {
        self.queue.commands()
    }

    /// Let every queued command on the pass of `source` inherit its uniforms
    ///
    /// Values a command already sets are kept. Used for per-frame values
    /// (camera, light counts) set on one command after the batches that
    /// need them were created.
    pub fn propagate_uniforms(&mut self, source: CommandId) {
        let command = self.command(source);
        let Some(pass) = command.pass() else {
            return;
        };
        let uniforms = command.uniforms().clone();
        for command in self.queue.commands_mut() {
            if command.pass() == Some(pass) {
                command.uniforms_mut().inherit(&uniforms);
            }
        }
    }

    // ===== IMMEDIATE OPERATIONS =====

    /// Clear the target of the current command
    ///
    /// Without an active pass an ad hoc command clears the default target
    /// and the queue is flushed right away.
    pub fn clear(&mut self) -> Result<()> {
        if self.active_pass.is_none() {
            let id = self.create_command(None);
            self.draw_command_mut(id).clear = true;
            return self.flush();
        }
        let id = self.get_command();
        self.draw_command_mut(id).clear = true;
        Ok(())
    }

    /// Set the viewport of the current command
    pub fn resize(&mut self, width: u32, height: u32) {
        let id = self.get_command();
        self.draw_command_mut(id).viewport = Some(Viewport { width, height });
    }

    /// Submit every queued command to the device and reset the queue
    pub fn flush(&mut self) -> Result<()> {
        self.stack.clear();
        Renderer3D::upload_instances(self)?;
        self.counters.record(self.queue.commands());

        let result = lock_device(&self.device)?.submit(&Submission {
            commands: self.queue.commands(),
            passes: &self.passes,
            buffers: &self.buffers,
        });

        engine_trace!(SOURCE, "Flushed {} commands", self.queue.len());
        self.queue.reset();
        result
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
