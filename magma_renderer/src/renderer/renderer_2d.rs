/// Renderer2D - screen-space submission
///
/// Owns the static screen quad and the pass that composites a framebuffer
/// attachment onto the default target.

use glam::Mat4;
use crate::camera::Camera;
use crate::error::Result;
use crate::graphics_device::{AttachmentTarget, Framebuffer};
use crate::renderer::buffer_layout::{BufferDataType, BufferLayout};
use crate::renderer::command::{
    BlendingMode, CommandId, CullingMode, DepthTestingMode, DrawCall, PrimitiveType, Viewport,
};
use crate::renderer::context::RendererContext;
use crate::renderer::draw_buffer::{DrawBufferKey, DrawBufferSpecification};
use crate::renderer::render_pass::{RenderPassKey, RenderPassSpecification};
use crate::renderer::renderer_3d::Renderer3D;
use crate::resource::Quad;
use crate::{engine_fatal, engine_info, engine_warn};

const SOURCE: &str = "magma::Renderer2D";

/// Two triangles covering [0, 1]^2
#[rustfmt::skip]
const SCREEN_VERTICES: [f32; 12] = [
    0.0, 1.0,
    0.0, 0.0,
    1.0, 0.0,
    1.0, 0.0,
    1.0, 1.0,
    0.0, 1.0,
];

pub const SCREEN_VERTEX_COUNT: u32 = 6;

#[derive(Debug)]
pub(crate) struct Renderer2DState {
    screen_buffer: DrawBufferKey,
    framebuffer_pass: RenderPassKey,
}

pub struct Renderer2D;

impl Renderer2D {
    pub(crate) fn init(ctx: &mut RendererContext) -> Result<Renderer2DState> {
        let screen_buffer = ctx.create_draw_buffer(DrawBufferSpecification {
            name: "Screen".to_string(),
            vertex_layout: BufferLayout::new(&[("a_Position", BufferDataType::Float2)], false, false),
            instance_layout: None,
            max_vertices: SCREEN_VERTEX_COUNT,
            max_indices: 0,
            max_instances: 0,
            vertices: Some(bytemuck::cast_slice(&SCREEN_VERTICES).to_vec()),
        })?;
        let framebuffer_pass = ctx.create_pass(RenderPassSpecification::graphics("Framebuffer", None, screen_buffer))?;

        Ok(Renderer2DState { screen_buffer, framebuffer_pass })
    }

    pub(crate) fn close(ctx: &mut RendererContext, state: Renderer2DState) {
        ctx.destroy_pass(state.framebuffer_pass);
        ctx.destroy_draw_buffer(state.screen_buffer);
    }

    fn state(ctx: &RendererContext) -> &Renderer2DState {
        match ctx.renderer_2d.as_ref() {
            Some(state) => state,
            None => engine_fatal!(SOURCE, "Renderer2D used before RendererContext::init"),
        }
    }

    pub fn screen_buffer(ctx: &RendererContext) -> DrawBufferKey {
        Self::state(ctx).screen_buffer
    }

    /// Pass used by `draw_fullscreen_quad` when no pass is active
    pub fn framebuffer_pass(ctx: &RendererContext) -> RenderPassKey {
        Self::state(ctx).framebuffer_pass
    }

    /// Bind the camera to the current command, if any
    pub fn begin(ctx: &mut RendererContext, camera: &Camera) {
        if let Some(id) = ctx.current_command() {
            ctx.command_mut(id).uniforms_mut().set("u_ViewProj", camera.view_projection());
        }
    }

    pub fn end(_ctx: &mut RendererContext) {}

    /// Quads go through the 3D mesh path
    pub fn draw_quad(ctx: &mut RendererContext, quad: &Quad, transform: &Mat4, command: Option<CommandId>) -> Result<()> {
        Renderer3D::draw_quad(ctx, quad, transform, command)
    }

    /// Draw an attachment of `framebuffer` over the whole viewport
    ///
    /// Uses the top command of the active pass, or a command on the
    /// framebuffer pass when none is active. Returns the command drawing
    /// the quad, `None` when there was nothing to draw.
    pub fn draw_fullscreen_quad(
        ctx: &mut RendererContext,
        framebuffer: Option<&Framebuffer>,
        target: AttachmentTarget,
    ) -> Option<CommandId> {
        let Some(framebuffer) = framebuffer else {
            engine_info!(SOURCE, "No framebuffer to draw, skipping fullscreen quad");
            return None;
        };
        let Some(texture) = framebuffer.attachment(target, 0).cloned() else {
            engine_warn!(SOURCE, "Framebuffer '{}' has no {:?} attachment", framebuffer.name(), target);
            return None;
        };

        let id = if ctx.active_pass().is_some() {
            ctx.new_command(true)
        } else {
            let pass = Self::framebuffer_pass(ctx);
            ctx.create_command(Some(pass))
        };
        let viewport = Viewport {
            width: ctx.config().viewport_width,
            height: ctx.config().viewport_height,
        };

        let command = ctx.draw_command_mut(id);
        command.viewport = Some(viewport);
        command.depth_test = DepthTestingMode::Off;
        command.culling = CullingMode::Off;
        command.blending = BlendingMode::Greatest;
        command.uniforms.set_texture("u_ScreenTexture", 0, texture);
        command.calls.push(DrawCall::single(PrimitiveType::Triangle, SCREEN_VERTEX_COUNT));
        Some(id)
    }
}

#[cfg(test)]
#[path = "renderer_2d_tests.rs"]
mod tests;
