/// Renderer3D - mesh, quad, line and skybox submission
///
/// Meshes are batched per submesh: the first draw of a submesh in a frame
/// uploads its geometry once and creates a command for it; every further
/// draw only records a transform. Instanced calls are split at
/// `INSTANCES_PER_CALL`; transforms are packed into the instance region at
/// flush, each command taking exactly the slots it uses.

use std::sync::Arc;
use glam::Mat4;
use rustc_hash::FxHashMap;
use crate::camera::Camera;
use crate::config::INSTANCES_PER_CALL;
use crate::error::Result;
use crate::graphics_device::Texture;
use crate::renderer::buffer_layout::{BufferDataType, BufferLayout};
use crate::renderer::command::{
    BlendingMode, CommandId, CullingMode, DepthTestingMode, DrawCall, PartitionType, PrimitiveType,
};
use crate::renderer::context::RendererContext;
use crate::renderer::draw_buffer::{DrawBufferIndex, DrawBufferKey, DrawBufferSpecification};
use crate::renderer::render_pass::RenderPassKey;
use crate::resource::{Line, LineVertex, Mesh, MeshId, Quad};
use crate::{engine_assert, engine_fatal, engine_trace, engine_warn};

const SOURCE: &str = "magma::Renderer3D";

/// Vertices of the skybox cube (inside faces, 12 triangles)
pub const SKYBOX_VERTEX_COUNT: u32 = 36;

#[rustfmt::skip]
const CUBEMAP_VERTICES: [f32; 108] = [
    -1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,   1.0,  1.0, -1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,  -1.0, -1.0,  1.0,

     1.0, -1.0, -1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0,  1.0, -1.0,   1.0, -1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,

    -1.0,  1.0, -1.0,   1.0,  1.0, -1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,
];

/// Identity of one submesh of one loaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubMeshKey {
    pub mesh: MeshId,
    pub index: u32,
}

/// Where a submesh command gets its pass (and uniforms) from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CommandSource {
    Pass(RenderPassKey),
    Fallback(CommandId),
}

/// Buffers and per-frame caches owned by the context
#[derive(Debug)]
pub(crate) struct Renderer3DState {
    mesh_buffer: DrawBufferKey,
    line_buffer: DrawBufferKey,
    cubemap_buffer: DrawBufferKey,
    commands: FxHashMap<(SubMeshKey, CommandSource), CommandId>,
    /// Transforms recorded since the last flush, per command in first-draw order
    instances: Vec<(CommandId, Vec<Mat4>)>,
    instance_slots: FxHashMap<CommandId, usize>,
}

pub struct Renderer3D;

impl Renderer3D {
    // ===== LIFECYCLE =====

    pub(crate) fn init(ctx: &mut RendererContext) -> Result<Renderer3DState> {
        let limits = ctx.config().limits;

        let mesh_buffer = ctx.create_draw_buffer(DrawBufferSpecification {
            name: "Mesh".to_string(),
            vertex_layout: BufferLayout::new(&[
                ("a_Position", BufferDataType::Float3),
                ("a_Normal", BufferDataType::Float3),
                ("a_TexCoord", BufferDataType::Float2),
            ], true, false),
            instance_layout: Some(BufferLayout::new(&[
                ("a_Transform", BufferDataType::Mat4),
            ], true, true)),
            max_vertices: limits.max_vertices,
            max_indices: limits.max_indices,
            max_instances: limits.max_instances,
            vertices: None,
        })?;

        let line_buffer = ctx.create_draw_buffer(DrawBufferSpecification {
            name: "Line".to_string(),
            vertex_layout: BufferLayout::new(&[
                ("a_Position", BufferDataType::Float3),
                ("a_Color", BufferDataType::Float3),
            ], true, false),
            instance_layout: None,
            max_vertices: limits.line_max_vertices,
            max_indices: limits.line_max_indices,
            max_instances: 0,
            vertices: None,
        })?;

        let cubemap_buffer = ctx.create_draw_buffer(DrawBufferSpecification {
            name: "Cubemap".to_string(),
            vertex_layout: BufferLayout::new(&[("a_Position", BufferDataType::Float3)], false, false),
            instance_layout: None,
            max_vertices: SKYBOX_VERTEX_COUNT,
            max_indices: 0,
            max_instances: 0,
            vertices: Some(bytemuck::cast_slice(&CUBEMAP_VERTICES).to_vec()),
        })?;

        Ok(Renderer3DState {
            mesh_buffer,
            line_buffer,
            cubemap_buffer,
            commands: FxHashMap::default(),
            instances: Vec::new(),
            instance_slots: FxHashMap::default(),
        })
    }

    pub(crate) fn close(ctx: &mut RendererContext, state: Renderer3DState) {
        ctx.destroy_draw_buffer(state.mesh_buffer);
        ctx.destroy_draw_buffer(state.line_buffer);
        ctx.destroy_draw_buffer(state.cubemap_buffer);
    }

    /// Clear the dynamic mesh/line geometry of the previous frame
    pub(crate) fn start_frame(ctx: &mut RendererContext) {
        let Some(state) = ctx.renderer_3d.as_mut() else { return };
        state.commands.clear();
        state.instances.clear();
        state.instance_slots.clear();
        let (mesh, line) = (state.mesh_buffer, state.line_buffer);
        for key in [mesh, line] {
            if let Some(buffer) = ctx.draw_buffer_mut(key) {
                buffer.clear_all();
            }
        }
    }

    /// Write the recorded transforms of every live command contiguously
    /// into its instance region and point its instanced calls at them
    pub(crate) fn upload_instances(ctx: &mut RendererContext) -> Result<()> {
        let Some(state) = ctx.renderer_3d.as_mut() else { return Ok(()) };
        state.instance_slots.clear();
        let pending = std::mem::take(&mut state.instances);

        for (id, transforms) in pending {
            if !ctx.is_live(id) {
                continue;
            }
            let buffer_key = Self::command_buffer(ctx, id);
            let start = match ctx.draw_buffer_mut(buffer_key) {
                Some(buffer) => buffer.append(
                    DrawBufferIndex::Instances, bytemuck::cast_slice(&transforms), transforms.len() as u32)?,
                None => engine_fatal!(SOURCE, "Pass draw buffer was destroyed"),
            };

            let mut next = start;
            let calls = ctx.draw_command_mut(id).calls.iter_mut()
                .filter(|call| call.partition == PartitionType::Instanced);
            for call in calls {
                call.instance_start = next;
                next += call.instance_count;
            }
        }
        Ok(())
    }

    fn state(ctx: &RendererContext) -> &Renderer3DState {
        match ctx.renderer_3d.as_ref() {
            Some(state) => state,
            None => engine_fatal!(SOURCE, "Renderer3D used before RendererContext::init"),
        }
    }

    fn state_mut(ctx: &mut RendererContext) -> &mut Renderer3DState {
        match ctx.renderer_3d.as_mut() {
            Some(state) => state,
            None => engine_fatal!(SOURCE, "Renderer3D used before RendererContext::init"),
        }
    }

    pub fn mesh_buffer(ctx: &RendererContext) -> DrawBufferKey {
        Self::state(ctx).mesh_buffer
    }

    pub fn line_buffer(ctx: &RendererContext) -> DrawBufferKey {
        Self::state(ctx).line_buffer
    }

    pub fn cubemap_buffer(ctx: &RendererContext) -> DrawBufferKey {
        Self::state(ctx).cubemap_buffer
    }

    /// Reset the submesh cache and the shared dynamic buffers (scene change)
    pub fn reset(ctx: &mut RendererContext) {
        Self::start_frame(ctx);
    }

    // ===== SCENE =====

    /// Bind the camera to the current command, if any
    pub fn begin(ctx: &mut RendererContext, camera: &Camera) {
        if let Some(id) = ctx.current_command() {
            let uniforms = ctx.command_mut(id).uniforms_mut();
            uniforms.set("u_ViewProj", camera.view_projection());
            uniforms.set("u_CameraPosition", camera.position());
        }
    }

    /// Forget this frame's submesh commands
    pub fn end(ctx: &mut RendererContext) {
        Self::state_mut(ctx).commands.clear();
    }

    // ===== MESHES =====

    /// Draw every submesh of `mesh` with `transform`
    ///
    /// Commands are created on the active pass, or, with `command`, on that
    /// command's pass with a copy of its uniforms.
    pub fn draw_mesh(ctx: &mut RendererContext, mesh: &Mesh, transform: &Mat4, command: Option<CommandId>) -> Result<()> {
        for index in 0..mesh.sub_meshes().len() {
            Self::draw_sub_mesh(ctx, mesh, index, transform, command)?;
        }
        Ok(())
    }

    fn draw_sub_mesh(
        ctx: &mut RendererContext,
        mesh: &Mesh,
        index: usize,
        transform: &Mat4,
        command: Option<CommandId>,
    ) -> Result<()> {
        let source = match (command, ctx.active_pass()) {
            (Some(fallback), _) => CommandSource::Fallback(fallback),
            (None, Some(pass)) => CommandSource::Pass(pass),
            (None, None) => engine_fatal!(SOURCE, "draw_mesh needs an active pass or a command"),
        };
        let key = (SubMeshKey { mesh: mesh.id(), index: index as u32 }, source);

        let cached = Self::state(ctx).commands.get(&key).copied();
        let id = match cached.filter(|id| ctx.is_live(*id)) {
            Some(id) => id,
            None => {
                let id = Self::create_sub_mesh_command(ctx, mesh, index, source)?;
                Self::state_mut(ctx).commands.insert(key, id);
                id
            }
        };

        Self::add_instance(ctx, id, transform)
    }

    /// New command for one submesh: state, material, geometry upload
    fn create_sub_mesh_command(
        ctx: &mut RendererContext,
        mesh: &Mesh,
        index: usize,
        source: CommandSource,
    ) -> Result<CommandId> {
        let id = match source {
            CommandSource::Pass(_) => {
                let id = ctx.new_command(true);
                if let Some(material) = mesh.material_for(index) {
                    material.bind(ctx.command_mut(id).uniforms_mut());
                }
                id
            }
            CommandSource::Fallback(fallback) => {
                let (pass, uniforms) = {
                    let fallback = ctx.command(fallback);
                    (fallback.pass(), fallback.uniforms().clone())
                };
                let id = ctx.create_command(pass);
                ctx.command_mut(id).uniforms_mut().merge(&uniforms);
                id
            }
        };

        let sub_mesh = &mesh.sub_meshes()[index];
        let buffer_key = Self::command_buffer(ctx, id);
        let buffer = match ctx.draw_buffer_mut(buffer_key) {
            Some(buffer) => buffer,
            None => engine_fatal!(SOURCE, "Pass draw buffer was destroyed"),
        };
        let vertices_count = sub_mesh.vertices.len() as u32;
        let indices_count = sub_mesh.indices.len() as u32;
        let vertices_index = buffer.append(
            DrawBufferIndex::Vertices, bytemuck::cast_slice(&sub_mesh.vertices), vertices_count)?;
        let indices_index = buffer.append(
            DrawBufferIndex::Indices, bytemuck::cast_slice(&sub_mesh.indices), indices_count)?;

        let command = ctx.draw_command_mut(id);
        command.depth_test = DepthTestingMode::On;
        command.blending = BlendingMode::Off;
        command.culling = CullingMode::Back;
        command.vertices_index = vertices_index;
        command.vertices_count = vertices_count;
        command.indices_index = indices_index;
        command.indices_count = indices_count;

        engine_trace!(SOURCE, "Submesh {} of {:?} batched into {:?}", index, mesh.id(), id);
        Ok(id)
    }

    /// Record one transform on the command's open instanced call
    ///
    /// The call's `instance_start` is assigned by `upload_instances`.
    fn add_instance(ctx: &mut RendererContext, id: CommandId, transform: &Mat4) -> Result<()> {
        let command = ctx.draw_command_mut(id);
        match command.calls.last_mut() {
            Some(call) if call.instance_count < INSTANCES_PER_CALL => call.instance_count += 1,
            _ => {
                let call = DrawCall {
                    primitive: PrimitiveType::Triangle,
                    partition: PartitionType::Instanced,
                    vertex_start: command.vertices_index,
                    vertex_count: command.vertices_count,
                    index_start: command.indices_index,
                    index_count: command.indices_count,
                    instance_start: 0,
                    instance_count: 1,
                };
                command.calls.push(call);
            }
        }

        let state = Self::state_mut(ctx);
        match state.instance_slots.get(&id) {
            Some(&slot) => state.instances[slot].1.push(*transform),
            None => {
                state.instance_slots.insert(id, state.instances.len());
                state.instances.push((id, vec![*transform]));
            }
        }
        Ok(())
    }

    /// Draw buffer of the pass a command targets
    fn command_buffer(ctx: &RendererContext, id: CommandId) -> DrawBufferKey {
        let pass = ctx.command(id).pass().and_then(|pass| ctx.pass(pass));
        match pass.and_then(|pass| pass.buffer()) {
            Some(buffer) => buffer,
            None => engine_fatal!(SOURCE, "{:?} targets no pass with a draw buffer", id),
        }
    }

    // ===== PRIMITIVES =====

    /// Draw a quad through the mesh path
    pub fn draw_quad(ctx: &mut RendererContext, quad: &Quad, transform: &Mat4, command: Option<CommandId>) -> Result<()> {
        Self::draw_mesh(ctx, &quad.to_mesh(), transform, command)
    }

    /// Append a line to the line buffer
    ///
    /// When a command is given (or one is on the stack) the line is also
    /// drawn by it; consecutive lines share one call.
    pub fn draw_line(ctx: &mut RendererContext, line: &Line, transform: &Mat4, command: Option<CommandId>) -> Result<()> {
        let line_buffer = Self::line_buffer(ctx);
        let vertices = [
            LineVertex { position: transform.transform_point3(line.p0.position), color: line.p0.color },
            LineVertex { position: transform.transform_point3(line.p1.position), color: line.p1.color },
        ];
        let first_index = {
            let buffer = match ctx.draw_buffer_mut(line_buffer) {
                Some(buffer) => buffer,
                None => engine_fatal!(SOURCE, "Line buffer was destroyed"),
            };
            let first_vertex = buffer.append(DrawBufferIndex::Vertices, bytemuck::cast_slice(&vertices), 2)?;
            let indices = [first_vertex, first_vertex + 1];
            buffer.append(DrawBufferIndex::Indices, bytemuck::cast_slice(&indices), 2)?
        };

        let Some(id) = command.or_else(|| ctx.current_command()) else {
            return Ok(());
        };
        engine_assert!(Self::command_buffer(ctx, id) == line_buffer, SOURCE,
            "draw_line target {:?} does not draw from the line buffer", id);

        let command = ctx.draw_command_mut(id);
        match command.calls.last_mut() {
            Some(call) if call.primitive == PrimitiveType::Line
                && call.index_start + call.index_count == first_index =>
            {
                call.index_count += 2;
                call.vertex_count += 2;
            }
            _ => command.calls.push(DrawCall {
                primitive: PrimitiveType::Line,
                partition: PartitionType::Single,
                vertex_start: 0,
                vertex_count: 2,
                index_start: first_index,
                index_count: 2,
                instance_start: 0,
                instance_count: 0,
            }),
        }
        Ok(())
    }

    /// Draw the skybox cube on the active pass
    pub fn draw_skybox(ctx: &mut RendererContext, cubemap: &Arc<dyn Texture>) {
        engine_assert!(ctx.active_pass().is_some(), SOURCE, "draw_skybox needs an active pass");
        let id = ctx.new_command(true);
        if Self::command_buffer(ctx, id) != Self::cubemap_buffer(ctx) {
            engine_warn!(SOURCE, "Skybox drawn on a pass that does not use the cubemap buffer");
        }

        let command = ctx.draw_command_mut(id);
        command.depth_test = DepthTestingMode::On;
        command.culling = CullingMode::Front;
        command.blending = BlendingMode::Off;
        command.uniforms.set_cubemap("u_Skybox", 0, cubemap.clone());
        command.calls.push(DrawCall::single(PrimitiveType::Triangle, SKYBOX_VERTEX_COUNT));
    }
}

#[cfg(test)]
#[path = "renderer_3d_tests.rs"]
mod tests;
