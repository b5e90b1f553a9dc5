/// Play-mode scene renderer: lit meshes, light volumes, bloom and particles.
///
/// Frame layout:
/// - `Light` draws one volume per point light into the base layer.
/// - Bloom blurs the base layer into a mip chain, then composites it into
///   the output. It runs in `begin`, so it reads the base layer rendered by
///   the previous frame.
/// - `Lighting` draws every mesh into the output. A long-lived lighting
///   command carries the camera, skybox and light uniforms, and every mesh
///   batch on the pass receives them at `render`.
/// - Particles draw into the output after their compute passes ran in `update`.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::graphics_device::{Framebuffer, FramebufferDesc};
use crate::renderer::{
    BlendingMode, CommandId, CullingMode, DepthTestingMode, DrawCall, PrimitiveType, RenderPassKey,
    RenderPassSpecification, RendererContext,
};
use crate::renderer::renderer_2d::Renderer2D;
use crate::renderer::renderer_3d::Renderer3D;
use crate::resource::MaterialId;
use crate::scene::bloom::Bloom;
use crate::scene::components::{
    CameraComponent, EntityId, LightComponent, MeshComponent, ParticleEmitterComponent,
    SkyboxComponent, Transform,
};
use crate::scene::lighting::{LightBuffers, POINT_LIGHT_BINDING};
use crate::scene::particles::ParticleSystem;
use crate::scene::scene_renderer::SceneRenderer;
use crate::utils::TimeStep;
use crate::{engine_fatal, engine_info};

const SOURCE: &str = "magma::RuntimeSceneRenderer";

/// Vertices of one light volume quad
const LIGHT_VOLUME_VERTEX_COUNT: u32 = 6;

pub struct RuntimeSceneRenderer {
    output: Arc<Framebuffer>,
    base_layer: Arc<Framebuffer>,
    lighting_pass: RenderPassKey,
    light_pass: RenderPassKey,
    lights: LightBuffers,
    bloom: Bloom,
    particles: ParticleSystem,
    light_command: Option<CommandId>,
    lighting_command: Option<CommandId>,
    /// One uniform carrier per material, cleared by `render`
    material_commands: FxHashMap<MaterialId, CommandId>,
}

impl RuntimeSceneRenderer {
    pub fn new(ctx: &mut RendererContext) -> Result<Self> {
        let config = ctx.config().clone();
        let (width, height) = (config.viewport_width, config.viewport_height);

        let output = Arc::new(ctx.with_device(|device| {
            Framebuffer::create(device, &FramebufferDesc::color_depth("Output", width, height))
        })?);
        let base_layer = Arc::new(ctx.with_device(|device| {
            Framebuffer::create(device, &FramebufferDesc::color_depth("BaseLayer", width, height))
        })?);

        let mesh_buffer = Renderer3D::mesh_buffer(ctx);
        let screen_buffer = Renderer2D::screen_buffer(ctx);
        let lighting_pass = ctx.create_pass(
            RenderPassSpecification::graphics("Lighting", Some(output.clone()), mesh_buffer))?;
        let light_pass = ctx.create_pass(
            RenderPassSpecification::graphics("Light", Some(base_layer.clone()), screen_buffer))?;

        let lights = ctx.with_device(|device| LightBuffers::create(device, &config.lights, &config.bloom))?;
        let bloom = Bloom::create(ctx, output.clone(), config.bloom)?;
        let particles = ParticleSystem::create(ctx, output.clone())?;

        engine_info!(SOURCE, "Runtime scene renderer created ({}x{})", width, height);

        Ok(Self {
            output,
            base_layer,
            lighting_pass,
            light_pass,
            lights,
            bloom,
            particles,
            light_command: None,
            lighting_command: None,
            material_commands: FxHashMap::default(),
        })
    }

    /// Release the passes (buffers go with the last framebuffer handle)
    pub fn destroy(self, ctx: &mut RendererContext) {
        ctx.destroy_pass(self.lighting_pass);
        ctx.destroy_pass(self.light_pass);
        self.bloom.destroy(ctx);
        self.particles.destroy(ctx);
    }

    // ===== ACCESSORS =====

    pub fn base_layer(&self) -> &Arc<Framebuffer> {
        &self.base_layer
    }

    pub fn lighting_pass(&self) -> RenderPassKey {
        self.lighting_pass
    }

    pub fn light_pass(&self) -> RenderPassKey {
        self.light_pass
    }

    pub fn lights(&self) -> &LightBuffers {
        &self.lights
    }

    pub fn bloom(&self) -> &Bloom {
        &self.bloom
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// This frame's lighting command (between `begin` and `render`)
    pub fn lighting_command(&self) -> Option<CommandId> {
        self.lighting_command
    }

    pub fn light_command(&self) -> Option<CommandId> {
        self.light_command
    }

    // ===== EMITTERS =====

    pub fn set_emitter(&mut self, ctx: &RendererContext, entity: EntityId, emitter: &ParticleEmitterComponent) -> Result<()> {
        self.particles.set_emitter(ctx, entity, emitter)
    }

    pub fn remove_emitter(&mut self, entity: EntityId) -> bool {
        self.particles.remove_emitter(entity)
    }

    /// Forget every per-scene resource
    pub fn on_scene_close(&mut self) {
        self.particles.clear();
        self.material_commands.clear();
    }

    fn lighting(&self) -> CommandId {
        match self.lighting_command {
            Some(id) => id,
            None => engine_fatal!(SOURCE, "Submission before RuntimeSceneRenderer::begin"),
        }
    }
}

impl SceneRenderer for RuntimeSceneRenderer {
    fn update(&mut self, ctx: &mut RendererContext, ts: TimeStep) {
        self.particles.update(ctx, ts);
    }

    fn begin(&mut self, ctx: &mut RendererContext) {
        let light = ctx.create_command(Some(self.light_pass));
        let command = ctx.draw_command_mut(light);
        command.clear = true;
        command.depth_test = DepthTestingMode::On;
        command.blending = BlendingMode::Greatest;
        command.culling = CullingMode::Off;
        self.light_command = Some(light);

        self.bloom.record(ctx, &self.base_layer);

        self.lighting_command = Some(ctx.create_command(Some(self.lighting_pass)));
    }

    fn submit_camera(&mut self, ctx: &mut RendererContext, _entity: EntityId, component: &CameraComponent) {
        let Some(camera) = &component.camera else {
            return;
        };
        let uniforms = ctx.command_mut(self.lighting()).uniforms_mut();
        uniforms.set("u_View", camera.view());
        uniforms.set("u_ViewProj", camera.view_projection());
        uniforms.set("u_CameraPosition", camera.position());
    }

    fn submit_skybox(&mut self, ctx: &mut RendererContext, entity: EntityId, skybox: &SkyboxComponent) {
        let Some(cubemap) = &skybox.cubemap else {
            engine_info!(SOURCE, "Skybox of {:?} has no cubemap", entity);
            return;
        };
        ctx.command_mut(self.lighting()).uniforms_mut().set_cubemap("u_Skybox", 0, cubemap.clone());
    }

    fn submit_light(&mut self, _ctx: &mut RendererContext, _entity: EntityId, light: &LightComponent) -> Result<()> {
        self.lights.submit(light)
    }

    fn submit_particles(&mut self, ctx: &mut RendererContext, entity: EntityId, emitter: &ParticleEmitterComponent) -> Result<()> {
        self.particles.sync_emitter(ctx, entity, emitter)?;

        let (view, view_projection) = {
            let uniforms = ctx.command(self.lighting()).uniforms();
            (
                uniforms.get_mat4("u_View").unwrap_or(Mat4::IDENTITY),
                uniforms.get_mat4("u_ViewProj").unwrap_or(Mat4::IDENTITY),
            )
        };
        self.particles.draw(ctx, entity, &view, &view_projection);
        Ok(())
    }

    fn submit_mesh(&mut self, ctx: &mut RendererContext, entity: EntityId, transform: &Transform, component: &MeshComponent) -> Result<()> {
        let Some(mesh) = &component.mesh else {
            engine_info!(SOURCE, "Mesh of {:?} is not resolved", entity);
            return Ok(());
        };
        let matrix = transform.matrix();

        let Some(material) = &component.material else {
            ctx.start_pass(self.lighting_pass, false);
            let result = Renderer3D::draw_mesh(ctx, mesh, &matrix, None);
            ctx.end_pass();
            return result;
        };

        let cached = self.material_commands.get(&material.id).copied();
        let id = match cached.filter(|id| ctx.is_live(*id)) {
            Some(id) => id,
            None => {
                let id = ctx.create_command(Some(self.lighting_pass));
                material.material.bind(ctx.command_mut(id).uniforms_mut());
                self.material_commands.insert(material.id, id);
                id
            }
        };
        Renderer3D::draw_mesh(ctx, mesh, &matrix, Some(id))
    }

    fn render(&mut self, ctx: &mut RendererContext) -> Result<()> {
        Renderer3D::end(ctx);

        let lighting = self.lighting();
        self.lights.bind(ctx.command_mut(lighting).uniforms_mut());

        let (view, view_projection, camera_position) = {
            let uniforms = ctx.command(lighting).uniforms();
            (
                uniforms.get_mat4("u_View").unwrap_or(Mat4::IDENTITY),
                uniforms.get_mat4("u_ViewProj").unwrap_or(Mat4::IDENTITY),
                uniforms.get_vec3("u_CameraPosition").unwrap_or(Vec3::ZERO),
            )
        };
        let (width, height) = (ctx.config().viewport_width, ctx.config().viewport_height);
        if let Some(light) = self.light_command {
            let point_lights = self.lights.point_buffer().device_buffer().clone();
            let point_count = self.lights.point_count();
            let command = ctx.draw_command_mut(light);
            command.uniforms.set("u_View", view);
            command.uniforms.set("u_ViewProj", view_projection);
            command.uniforms.set("u_Radius", 1.0f32);
            command.uniforms.set("u_CameraPosition", camera_position);
            command.uniforms.set("u_ViewportWidth", width as f32);
            command.uniforms.set("u_ViewportHeight", height as f32);
            command.uniforms.set_uniform_buffer(POINT_LIGHT_BINDING, point_lights);
            command.calls.push(DrawCall::instanced(
                PrimitiveType::Triangle, LIGHT_VOLUME_VERTEX_COUNT, 0, point_count));
        }

        ctx.propagate_uniforms(lighting);
        let result = ctx.flush();

        self.lights.reset();
        self.material_commands.clear();
        self.light_command = None;
        self.lighting_command = None;
        result
    }

    fn output(&self) -> &Arc<Framebuffer> {
        &self.output
    }
}

#[cfg(test)]
#[path = "runtime_scene_renderer_tests.rs"]
mod tests;
