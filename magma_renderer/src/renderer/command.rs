/// Draw/compute commands and the per-flush command queue
///
/// A `DrawCommand` is one batch: fixed GPU state plus a uniform table,
/// followed by any number of draw calls sharing them. Compute dispatches
/// are a separate variant so vertex/index fields never exist on them.

use crate::graphics_device::AttachmentTarget;
use crate::renderer::render_pass::RenderPassKey;
use crate::renderer::uniform::UniformData;

// ===== GPU STATE =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthTestingMode {
    Off,
    #[default]
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullingMode {
    Off,
    Front,
    #[default]
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendingMode {
    #[default]
    Off,
    /// Alpha blending (keep the greatest contribution)
    Greatest,
    /// Source added onto destination
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Triangle,
    Line,
    Point,
}

/// Single draw vs. instanced draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionType {
    Single,
    Instanced,
}

/// Viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Framebuffer attachment a command renders into (instead of the pass default)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentOutput {
    pub target: AttachmentTarget,
    pub index: usize,
}

// ===== DRAW CALL =====

/// One draw invocation
///
/// Vertex/index starts are absolute element offsets into the pass draw
/// buffer. A call with `index_count == 0` is non-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub primitive: PrimitiveType,
    pub partition: PartitionType,
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub index_start: u32,
    pub index_count: u32,
    pub instance_start: u32,
    pub instance_count: u32,
}

impl DrawCall {
    /// Non-indexed, non-instanced call
    pub fn single(primitive: PrimitiveType, vertex_count: u32) -> Self {
        Self {
            primitive,
            partition: PartitionType::Single,
            vertex_start: 0,
            vertex_count,
            index_start: 0,
            index_count: 0,
            instance_start: 0,
            instance_count: 0,
        }
    }

    /// Non-indexed call over `instance_count` instances from `instance_start`
    pub fn instanced(primitive: PrimitiveType, vertex_count: u32, instance_start: u32, instance_count: u32) -> Self {
        Self {
            partition: PartitionType::Instanced,
            instance_start,
            instance_count,
            ..Self::single(primitive, vertex_count)
        }
    }

    /// Instances this call actually draws (1 for a single call)
    pub fn drawn_instances(&self) -> u32 {
        match self.partition {
            PartitionType::Single => 1,
            PartitionType::Instanced => self.instance_count,
        }
    }
}

// ===== COMMANDS =====

/// Rasterization batch
#[derive(Debug, Clone, Default)]
pub struct DrawCommand {
    pub pass: Option<RenderPassKey>,
    pub depth_test: DepthTestingMode,
    pub culling: CullingMode,
    pub blending: BlendingMode,
    pub viewport: Option<Viewport>,
    /// Clear the target before drawing
    pub clear: bool,
    pub uniforms: UniformData,
    /// Base offsets of the geometry this command uploaded
    pub vertices_index: u32,
    pub vertices_count: u32,
    pub indices_index: u32,
    pub indices_count: u32,
    pub calls: Vec<DrawCall>,
    /// Render into these attachments of the pass framebuffer (all when empty)
    pub outputs: Vec<AttachmentOutput>,
}

impl DrawCommand {
    pub fn new(pass: Option<RenderPassKey>) -> Self {
        Self { pass, ..Self::default() }
    }
}

/// Compute dispatch
#[derive(Debug, Clone, Default)]
pub struct ComputeCommand {
    pub pass: Option<RenderPassKey>,
    pub uniforms: UniformData,
    pub workgroups: [u32; 3],
}

impl ComputeCommand {
    pub fn new(pass: Option<RenderPassKey>) -> Self {
        Self { pass, uniforms: UniformData::new(), workgroups: [0, 1, 1] }
    }

    /// No workgroups to run
    pub fn is_empty(&self) -> bool {
        self.workgroups.iter().any(|&count| count == 0)
    }
}

/// Queued GPU work
#[derive(Debug, Clone)]
pub enum Command {
    Draw(DrawCommand),
    Compute(ComputeCommand),
}

impl Command {
    pub fn pass(&self) -> Option<RenderPassKey> {
        match self {
            Command::Draw(command) => command.pass,
            Command::Compute(command) => command.pass,
        }
    }

    pub fn uniforms(&self) -> &UniformData {
        match self {
            Command::Draw(command) => &command.uniforms,
            Command::Compute(command) => &command.uniforms,
        }
    }

    pub fn uniforms_mut(&mut self) -> &mut UniformData {
        match self {
            Command::Draw(command) => &mut command.uniforms,
            Command::Compute(command) => &mut command.uniforms,
        }
    }

    pub fn as_draw(&self) -> Option<&DrawCommand> {
        match self {
            Command::Draw(command) => Some(command),
            Command::Compute(_) => None,
        }
    }

    pub fn as_draw_mut(&mut self) -> Option<&mut DrawCommand> {
        match self {
            Command::Draw(command) => Some(command),
            Command::Compute(_) => None,
        }
    }

    pub fn as_compute(&self) -> Option<&ComputeCommand> {
        match self {
            Command::Compute(command) => Some(command),
            Command::Draw(_) => None,
        }
    }

    pub fn as_compute_mut(&mut self) -> Option<&mut ComputeCommand> {
        match self {
            Command::Compute(command) => Some(command),
            Command::Draw(_) => None,
        }
    }

    /// Nothing recorded yet (no draw call, or no workgroup)
    pub fn is_empty(&self) -> bool {
        match self {
            Command::Draw(command) => command.calls.is_empty(),
            Command::Compute(command) => command.is_empty(),
        }
    }
}

// ===== QUEUE =====

/// Handle to a queued command
///
/// Only valid until the next flush; the generation makes stale handles
/// detectable instead of silently aliasing a newer command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId {
    generation: u32,
    index: u32,
}

/// Commands recorded since the last flush, in recording order
#[derive(Debug, Default)]
pub struct CommandQueue {
    generation: u32,
    commands: Vec<Command>,
}

impl CommandQueue {
    pub fn push(&mut self, command: Command) -> CommandId {
        let id = CommandId {
            generation: self.generation,
            index: self.commands.len() as u32,
        };
        self.commands.push(command);
        id
    }

    pub fn get(&self, id: CommandId) -> Option<&Command> {
        if id.generation != self.generation {
            return None;
        }
        self.commands.get(id.index as usize)
    }

    pub fn get_mut(&mut self, id: CommandId) -> Option<&mut Command> {
        if id.generation != self.generation {
            return None;
        }
        self.commands.get_mut(id.index as usize)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub(crate) fn commands_mut(&mut self) -> &mut [Command] {
        &mut self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop every command and invalidate outstanding ids
    pub fn reset(&mut self) {
        self.commands.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
