use glam::Vec4;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use super::*;
use crate::graphics_device::mock_graphics_device::{test_context, MockGraphicsDevice};
use crate::graphics_device::{AttachmentDesc, FramebufferDesc, TextureFormat};
use crate::log::{LogEntry, LogSeverity, Logger};
use crate::engine::Engine;

// ============================================================================
// Helpers
// ============================================================================

struct CaptureLogger {
    entries: Arc<Mutex<Vec<(LogSeverity, String)>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push((entry.severity, entry.message.clone()));
    }
}

fn capture_logs() -> Arc<Mutex<Vec<(LogSeverity, String)>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

fn color_only(device: &Arc<Mutex<MockGraphicsDevice>>) -> Framebuffer {
    let desc = FramebufferDesc {
        name: "Mask".to_string(),
        width: 64,
        height: 32,
        attachments: vec![AttachmentDesc {
            target: AttachmentTarget::Color,
            format: TextureFormat::R8G8B8A8_UNORM,
            width: 64,
            height: 32,
        }],
    };
    Framebuffer::create(&mut *device.lock().unwrap(), &desc).unwrap()
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_screen_buffer_is_static_six_vertices() {
    let (device, ctx) = test_context();
    let screen = ctx.draw_buffer(Renderer2D::screen_buffer(&ctx)).unwrap();
    assert_eq!(screen.count(crate::renderer::DrawBufferIndex::Vertices), SCREEN_VERTEX_COUNT);

    let gpu = device.lock().unwrap().buffer("Screen.Vertices").unwrap();
    assert_eq!(gpu.read::<[f32; 2]>(0), [0.0, 1.0]);
    assert_eq!(gpu.read::<[f32; 2]>(8 * 4), [1.0, 1.0]);
}

// ============================================================================
// Fullscreen quad
// ============================================================================

#[test]
fn test_fullscreen_quad_without_pass_uses_framebuffer_pass() {
    let (device, mut ctx) = test_context();
    let framebuffer = color_only(&device);

    let id = Renderer2D::draw_fullscreen_quad(&mut ctx, Some(&framebuffer), AttachmentTarget::Color).unwrap();
    assert_eq!(ctx.stack_depth(), 0);

    let command = ctx.draw_command(id);
    assert_eq!(command.pass, Some(Renderer2D::framebuffer_pass(&ctx)));
    assert_eq!(command.viewport, Some(Viewport { width: 320, height: 180 }));
    assert_eq!(command.depth_test, DepthTestingMode::Off);
    assert_eq!(command.culling, CullingMode::Off);
    assert_eq!(command.blending, BlendingMode::Greatest);
    assert_eq!(command.calls, vec![DrawCall::single(PrimitiveType::Triangle, 6)]);
    let binding = command.uniforms.texture("u_ScreenTexture").unwrap();
    assert_eq!(binding.slot, 0);
    assert_eq!(binding.texture.info().width, 64);
}

#[test]
fn test_fullscreen_quad_reuses_empty_top_of_active_pass() {
    let (device, mut ctx) = test_context();
    let framebuffer = color_only(&device);
    let pass = Renderer2D::framebuffer_pass(&ctx);

    ctx.start_pass(pass, true);
    let top = ctx.get_command();
    ctx.command_mut(top).uniforms_mut().set("u_Color", Vec4::ONE);

    let id = Renderer2D::draw_fullscreen_quad(&mut ctx, Some(&framebuffer), AttachmentTarget::Color);
    assert_eq!(id, Some(top));
    assert_eq!(ctx.draw_command(top).uniforms.get_vec4("u_Color"), Some(Vec4::ONE));
}

#[test]
#[serial]
fn test_missing_framebuffer_logs_info_and_skips() {
    let logs = capture_logs();
    let (_device, mut ctx) = test_context();

    assert!(Renderer2D::draw_fullscreen_quad(&mut ctx, None, AttachmentTarget::Color).is_none());
    assert!(ctx.queued_commands().is_empty());
    Engine::reset_logger();

    let logs = logs.lock().unwrap();
    assert!(logs.iter().any(|(severity, _)| *severity == LogSeverity::Info));
}

#[test]
#[serial]
fn test_missing_attachment_logs_warning_and_skips() {
    let logs = capture_logs();
    let (device, mut ctx) = test_context();
    let framebuffer = color_only(&device);

    assert!(Renderer2D::draw_fullscreen_quad(&mut ctx, Some(&framebuffer), AttachmentTarget::Depth).is_none());
    assert!(ctx.queued_commands().is_empty());
    Engine::reset_logger();

    let logs = logs.lock().unwrap();
    assert!(logs.iter().any(|(severity, message)|
        *severity == LogSeverity::Warn && message.contains("Depth")));
}

// ============================================================================
// Camera / quads
// ============================================================================

#[test]
fn test_begin_sets_view_projection() {
    let (_device, mut ctx) = test_context();
    let pass = Renderer2D::framebuffer_pass(&ctx);
    let camera = Camera::orthographic();

    ctx.start_pass(pass, true);
    Renderer2D::begin(&mut ctx, &camera);
    let uniforms = ctx.command(ctx.get_command()).uniforms();
    assert_eq!(uniforms.get_mat4("u_ViewProj"), Some(camera.view_projection()));
    assert_eq!(uniforms.get_vec3("u_CameraPosition"), None);
}

#[test]
fn test_draw_quad_routes_to_mesh_buffer() {
    let (_device, mut ctx) = test_context();
    let buffer = Renderer3D::mesh_buffer(&ctx);
    let pass = ctx.create_pass(crate::renderer::RenderPassSpecification::graphics("Mesh", None, buffer)).unwrap();

    ctx.start_pass(pass, false);
    Renderer2D::draw_quad(&mut ctx, &Quad::colored(Vec4::ONE), &Mat4::IDENTITY, None).unwrap();
    let mesh_buffer = ctx.draw_buffer(buffer).unwrap();
    assert_eq!(mesh_buffer.count(crate::renderer::DrawBufferIndex::Vertices), 4);
}
