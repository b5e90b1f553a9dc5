/// Edit-mode scene renderer: unlit preview seen through a free camera.
///
/// The editor owns its camera; scene cameras only show up as icons (and as
/// a frustum when selected). Non-geometric entities are drawn as
/// camera-facing billboards, sorted far-to-near so their alpha blends.
/// The selected mesh is rendered into a mask target and outlined on top of
/// the output with a fullscreen pass.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3, Vec4};
use rdst::{RadixKey, RadixSort};
use rustc_hash::FxHashMap;
use crate::camera::{Camera, CameraController, ControllerInput, Frustum, Projection, FRUSTUM_LINE_INDICES};
use crate::error::Result;
use crate::graphics_device::{AttachmentTarget, Framebuffer, FramebufferDesc, Texture};
use crate::renderer::{
    BlendingMode, BufferDataType, BufferLayout, CommandId, CullingMode, DepthTestingMode, DrawBufferIndex,
    DrawBufferKey, DrawBufferSpecification, DrawCall, PartitionType, PrimitiveType, RenderPassKey,
    RenderPassSpecification, RendererContext,
};
use crate::renderer::renderer_2d::{Renderer2D, SCREEN_VERTEX_COUNT};
use crate::renderer::renderer_3d::Renderer3D;
use crate::resource::{LineVertex, MaterialId, Mesh};
use crate::scene::components::{
    CameraComponent, EntityId, LightComponent, MeshComponent, ParticleEmitterComponent,
    SkyboxComponent, Transform,
};
use crate::scene::scene_renderer::SceneRenderer;
use crate::utils::TimeStep;
use crate::{engine_fatal, engine_info, engine_warn};

const SOURCE: &str = "magma::EditorSceneRenderer";

const EDITOR_FOV: f32 = 75.0;
const EDITOR_NEAR: f32 = 0.001;
const EDITOR_FAR: f32 = 10_000.0;
const EDITOR_TRANSLATION_SPEED: f32 = 25.0;
const EDITOR_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 1.0, 15.0);

/// Quad vertices of one billboard (expanded in the vertex shader)
const BILLBOARD_VERTEX_COUNT: u32 = 6;
const BILLBOARD_SIZE: f32 = 1.0;

const FRUSTUM_COLOR: Vec3 = Vec3::ONE;
const OUTLINE_COLOR: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Icon kinds drawn for non-geometric entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillboardIcon {
    Camera,
    DirectionalLight,
    PointLight,
    Spotlight,
    Particles,
}

/// Icon textures, supplied by the asset layer
#[derive(Debug, Clone, Default)]
pub struct EditorIcons {
    pub camera: Option<Arc<dyn Texture>>,
    pub directional_light: Option<Arc<dyn Texture>>,
    pub point_light: Option<Arc<dyn Texture>>,
    pub spotlight: Option<Arc<dyn Texture>>,
    pub particles: Option<Arc<dyn Texture>>,
}

impl EditorIcons {
    pub fn texture(&self, icon: BillboardIcon) -> Option<&Arc<dyn Texture>> {
        match icon {
            BillboardIcon::Camera => self.camera.as_ref(),
            BillboardIcon::DirectionalLight => self.directional_light.as_ref(),
            BillboardIcon::PointLight => self.point_light.as_ref(),
            BillboardIcon::Spotlight => self.spotlight.as_ref(),
            BillboardIcon::Particles => self.particles.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Billboard {
    /// Inverted distance bits: ascending order is far-to-near
    key: u32,
    icon: BillboardIcon,
    position: Vec3,
}

impl Billboard {
    fn new(icon: BillboardIcon, position: Vec3, eye: Vec3) -> Self {
        // Non-negative floats order like their bit patterns
        let distance = position.distance(eye);
        Self { key: !distance.to_bits(), icon, position }
    }
}

impl RadixKey for Billboard {
    const LEVELS: usize = 4;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.key >> (level * 8)) as u8
    }
}

pub struct EditorSceneRenderer {
    controller: CameraController,
    input: ControllerInput,
    hovered: bool,
    icons: EditorIcons,

    output: Arc<Framebuffer>,
    mask: Arc<Framebuffer>,
    billboard_buffer: DrawBufferKey,

    grid_pass: RenderPassKey,
    billboard_pass: RenderPassKey,
    mesh_pass: RenderPassKey,
    mask_pass: RenderPassKey,
    outline_pass: RenderPassKey,
    line_pass: RenderPassKey,

    mesh_command: Option<CommandId>,
    line_command: Option<CommandId>,
    /// Mesh-pass command per material, for this frame
    material_commands: FxHashMap<MaterialId, CommandId>,
    billboards: Vec<Billboard>,
    selected: Option<EntityId>,
    selected_mesh: Option<(Arc<Mesh>, Mat4)>,

    has_camera: bool,
    has_directional_light: bool,
    point_light_count: u32,
    spotlight_count: u32,
}

impl EditorSceneRenderer {
    pub fn new(ctx: &mut RendererContext) -> Result<Self> {
        let config = ctx.config().clone();
        let (width, height) = (config.viewport_width, config.viewport_height);

        let camera = Camera::with_viewport(
            Projection::Stereographic { vertical_fov: EDITOR_FOV }, width, height, EDITOR_NEAR, EDITOR_FAR);
        let mut controller = CameraController::new(camera);
        controller.camera_mut().set_position(EDITOR_CAMERA_POSITION);
        controller.translation_speed = EDITOR_TRANSLATION_SPEED;

        let output = Arc::new(ctx.with_device(|device| {
            Framebuffer::create(device, &FramebufferDesc::color_depth("EditorOutput", width, height))
        })?);
        let mask = Arc::new(ctx.with_device(|device| {
            Framebuffer::create(device, &FramebufferDesc::color_depth("Mask", width, height))
        })?);

        let billboard_buffer = ctx.create_draw_buffer(DrawBufferSpecification {
            name: "Billboard".to_string(),
            vertex_layout: BufferLayout::new(&[], false, false),
            instance_layout: Some(BufferLayout::new(&[("a_Position", BufferDataType::Float3)], true, true)),
            max_vertices: 0,
            max_indices: 0,
            max_instances: config.max_billboards,
            vertices: None,
        })?;

        let mesh_buffer = Renderer3D::mesh_buffer(ctx);
        let line_buffer = Renderer3D::line_buffer(ctx);
        let screen_buffer = Renderer2D::screen_buffer(ctx);
        let graphics = |name: &str, target: &Arc<Framebuffer>, buffer| {
            RenderPassSpecification::graphics(name, Some(target.clone()), buffer)
        };

        let grid_pass = ctx.create_pass(graphics("Grid", &output, screen_buffer))?;
        let billboard_pass = ctx.create_pass(graphics("Billboard", &output, billboard_buffer))?;
        let mesh_pass = ctx.create_pass(graphics("Mesh", &output, mesh_buffer))?;
        let mask_pass = ctx.create_pass(graphics("Mask", &mask, mesh_buffer))?;
        let outline_pass = ctx.create_pass(graphics("Outline", &output, screen_buffer))?;
        let line_pass = ctx.create_pass(graphics("Line", &output, line_buffer))?;

        engine_info!(SOURCE, "Editor scene renderer created ({}x{})", width, height);

        Ok(Self {
            controller,
            input: ControllerInput::default(),
            hovered: false,
            icons: EditorIcons::default(),
            output,
            mask,
            billboard_buffer,
            grid_pass,
            billboard_pass,
            mesh_pass,
            mask_pass,
            outline_pass,
            line_pass,
            mesh_command: None,
            line_command: None,
            material_commands: FxHashMap::default(),
            billboards: Vec::new(),
            selected: None,
            selected_mesh: None,
            has_camera: false,
            has_directional_light: false,
            point_light_count: 0,
            spotlight_count: 0,
        })
    }

    pub fn destroy(self, ctx: &mut RendererContext) {
        for pass in [self.grid_pass, self.billboard_pass, self.mesh_pass,
                     self.mask_pass, self.outline_pass, self.line_pass] {
            ctx.destroy_pass(pass);
        }
        ctx.destroy_draw_buffer(self.billboard_buffer);
    }

    // ===== STATE =====

    /// Drop everything tied to the previous scene
    pub fn set_context(&mut self, ctx: &mut RendererContext) {
        Renderer3D::reset(ctx);
        self.material_commands.clear();
        self.selected = None;
        self.selected_mesh = None;
        self.billboards.clear();
    }

    pub fn set_selected(&mut self, entity: Option<EntityId>) {
        self.selected = entity;
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    /// The controller only moves the camera while the viewport is hovered
    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn set_input(&mut self, input: ControllerInput) {
        self.input = input;
    }

    pub fn set_icons(&mut self, icons: EditorIcons) {
        self.icons = icons;
    }

    // ===== ACCESSORS =====

    pub fn camera(&self) -> &Camera {
        self.controller.camera()
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn mask(&self) -> &Arc<Framebuffer> {
        &self.mask
    }

    pub fn billboard_buffer(&self) -> DrawBufferKey {
        self.billboard_buffer
    }

    /// Grid, Billboard, Mesh, Mask, Outline, Line
    pub fn passes(&self) -> [RenderPassKey; 6] {
        [self.grid_pass, self.billboard_pass, self.mesh_pass,
         self.mask_pass, self.outline_pass, self.line_pass]
    }

    pub fn mesh_command(&self) -> Option<CommandId> {
        self.mesh_command
    }

    pub fn line_command(&self) -> Option<CommandId> {
        self.line_command
    }

    pub fn has_camera(&self) -> bool {
        self.has_camera
    }

    pub fn has_directional_light(&self) -> bool {
        self.has_directional_light
    }

    pub fn point_light_count(&self) -> u32 {
        self.point_light_count
    }

    pub fn spotlight_count(&self) -> u32 {
        self.spotlight_count
    }

    fn mesh(&self) -> CommandId {
        match self.mesh_command {
            Some(id) => id,
            None => engine_fatal!(SOURCE, "Submission before EditorSceneRenderer::begin"),
        }
    }

    fn add_billboard(&mut self, icon: BillboardIcon, position: Vec3) {
        let eye = self.controller.camera().position();
        self.billboards.push(Billboard::new(icon, position, eye));
    }

    /// Append the frustum of `camera` to the line buffer, drawn by the line command
    fn draw_frustum(&mut self, ctx: &mut RendererContext, camera: &Camera) -> Result<()> {
        let Some(line) = self.line_command else {
            engine_fatal!(SOURCE, "Submission before EditorSceneRenderer::begin")
        };
        let vertices = Frustum::from_camera(camera)
            .line_points(camera.position())
            .map(|position| LineVertex { position, color: FRUSTUM_COLOR });

        let line_buffer = Renderer3D::line_buffer(ctx);
        let index_start = {
            let Some(buffer) = ctx.draw_buffer_mut(line_buffer) else {
                engine_fatal!(SOURCE, "Line buffer was destroyed")
            };
            let first_vertex = buffer.count(DrawBufferIndex::Vertices);
            let indices = FRUSTUM_LINE_INDICES.map(|index| first_vertex + index);
            buffer.append(DrawBufferIndex::Vertices, bytemuck::cast_slice(&vertices), vertices.len() as u32)?;
            buffer.append(DrawBufferIndex::Indices, bytemuck::cast_slice(&indices), indices.len() as u32)?
        };

        ctx.draw_command_mut(line).calls.push(DrawCall {
            primitive: PrimitiveType::Line,
            partition: PartitionType::Single,
            vertex_start: 0,
            vertex_count: vertices.len() as u32,
            index_start,
            index_count: FRUSTUM_LINE_INDICES.len() as u32,
            instance_start: 0,
            instance_count: 0,
        });
        Ok(())
    }

    fn render_selection(&mut self, ctx: &mut RendererContext, view_projection: Mat4) -> Result<()> {
        let Some((mesh, transform)) = self.selected_mesh.take() else {
            return Ok(());
        };

        let mask = ctx.create_command(Some(self.mask_pass));
        {
            let command = ctx.draw_command_mut(mask);
            command.clear = true;
            command.uniforms.set("u_ViewProj", view_projection);
            command.uniforms.set("u_Color", Vec4::ONE);
        }
        Renderer3D::draw_mesh(ctx, &mesh, &transform, Some(mask))?;

        let (width, height) = (self.output.width().max(1), self.output.height().max(1));
        ctx.start_pass(self.outline_pass, true);
        let top = ctx.get_command();
        {
            let uniforms = ctx.command_mut(top).uniforms_mut();
            uniforms.set("u_PixelSize", Vec2::new(1.0 / width as f32, 1.0 / height as f32));
            uniforms.set("u_Color", OUTLINE_COLOR);
        }
        Renderer2D::draw_fullscreen_quad(ctx, Some(&self.mask), AttachmentTarget::Color);
        ctx.end_pass();
        Ok(())
    }

    fn render_billboards(&mut self, ctx: &mut RendererContext, view: Mat4, view_projection: Mat4) -> Result<()> {
        let camera_position = self.controller.camera().position();

        let grid = ctx.create_command(Some(self.grid_pass));
        {
            let command = ctx.draw_command_mut(grid);
            command.depth_test = DepthTestingMode::On;
            command.blending = BlendingMode::Greatest;
            command.culling = CullingMode::Off;
            command.uniforms.set("u_View", view);
            command.uniforms.set("u_ViewProj", view_projection);
            command.uniforms.set("u_CameraPosition", camera_position);
            command.calls.push(DrawCall::single(PrimitiveType::Triangle, SCREEN_VERTEX_COUNT));
        }

        self.billboards.radix_sort_unstable();

        for billboard in &self.billboards {
            let instance_start = {
                let Some(buffer) = ctx.draw_buffer_mut(self.billboard_buffer) else {
                    engine_fatal!(SOURCE, "Billboard buffer was destroyed")
                };
                if buffer.count(DrawBufferIndex::Instances) >= buffer.capacity(DrawBufferIndex::Instances) {
                    engine_warn!(SOURCE, "Billboard capacity {} reached, skipping remaining icons",
                        buffer.capacity(DrawBufferIndex::Instances));
                    break;
                }
                buffer.append(DrawBufferIndex::Instances, bytemuck::bytes_of(&billboard.position), 1)?
            };

            let id = ctx.create_command(Some(self.billboard_pass));
            let command = ctx.draw_command_mut(id);
            command.depth_test = DepthTestingMode::On;
            command.blending = BlendingMode::Greatest;
            command.culling = CullingMode::Off;
            command.uniforms.set("u_View", view);
            command.uniforms.set("u_ViewProj", view_projection);
            command.uniforms.set("u_BillboardWidth", BILLBOARD_SIZE);
            command.uniforms.set("u_BillboardHeight", BILLBOARD_SIZE);
            if let Some(texture) = self.icons.texture(billboard.icon) {
                command.uniforms.set_texture("u_Texture", 0, texture.clone());
            }
            command.calls.push(DrawCall::instanced(
                PrimitiveType::Triangle, BILLBOARD_VERTEX_COUNT, instance_start, 1));
        }
        Ok(())
    }
}

impl SceneRenderer for EditorSceneRenderer {
    fn update(&mut self, _ctx: &mut RendererContext, ts: TimeStep) {
        if self.hovered {
            self.controller.on_update(ts, &self.input);
        }
    }

    fn begin(&mut self, ctx: &mut RendererContext) {
        let camera = self.controller.camera().clone();

        let mesh = ctx.create_command(Some(self.mesh_pass));
        {
            let command = ctx.draw_command_mut(mesh);
            command.clear = true;
            command.uniforms.set("u_ViewProj", camera.view_projection());
            command.uniforms.set("u_CameraPosition", camera.position());
        }
        self.mesh_command = Some(mesh);

        let line = ctx.create_command(Some(self.line_pass));
        {
            let command = ctx.draw_command_mut(line);
            command.depth_test = DepthTestingMode::On;
            command.blending = BlendingMode::Greatest;
            command.culling = CullingMode::Off;
            command.uniforms.set("u_ViewProj", camera.view_projection());
        }
        self.line_command = Some(line);

        if let Some(buffer) = ctx.draw_buffer_mut(self.billboard_buffer) {
            buffer.clear(DrawBufferIndex::Instances);
        }
        self.billboards.clear();
    }

    fn submit_camera(&mut self, ctx: &mut RendererContext, entity: EntityId, component: &CameraComponent) {
        let Some(camera) = &component.camera else {
            return;
        };
        self.has_camera = true;
        self.add_billboard(BillboardIcon::Camera, camera.position());

        if self.selected == Some(entity) {
            if let Err(err) = self.draw_frustum(ctx, camera) {
                engine_warn!(SOURCE, "Frustum of {:?} not drawn: {}", entity, err);
            }
        }
    }

    fn submit_skybox(&mut self, ctx: &mut RendererContext, entity: EntityId, skybox: &SkyboxComponent) {
        let Some(cubemap) = &skybox.cubemap else {
            engine_info!(SOURCE, "Skybox of {:?} has no cubemap", entity);
            return;
        };
        ctx.command_mut(self.mesh()).uniforms_mut().set_cubemap("u_Skybox", 0, cubemap.clone());
    }

    fn submit_light(&mut self, _ctx: &mut RendererContext, _entity: EntityId, light: &LightComponent) -> Result<()> {
        let icon = match light {
            LightComponent::Directional(_) => {
                self.has_directional_light = true;
                BillboardIcon::DirectionalLight
            }
            LightComponent::Point(_) => {
                self.point_light_count += 1;
                BillboardIcon::PointLight
            }
            LightComponent::Spot(_) => {
                self.spotlight_count += 1;
                BillboardIcon::Spotlight
            }
        };
        self.add_billboard(icon, light.position());
        Ok(())
    }

    fn submit_particles(&mut self, _ctx: &mut RendererContext, _entity: EntityId, emitter: &ParticleEmitterComponent) -> Result<()> {
        self.add_billboard(BillboardIcon::Particles, emitter.position);
        Ok(())
    }

    fn submit_mesh(&mut self, ctx: &mut RendererContext, entity: EntityId, transform: &Transform, component: &MeshComponent) -> Result<()> {
        let Some(mesh) = &component.mesh else {
            engine_info!(SOURCE, "Mesh of {:?} is not resolved", entity);
            return Ok(());
        };
        let matrix = transform.matrix();
        if self.selected == Some(entity) {
            self.selected_mesh = Some((mesh.clone(), matrix));
        }

        match &component.material {
            Some(material) => {
                let cached = self.material_commands.get(&material.id).copied();
                let id = match cached.filter(|id| ctx.is_live(*id)) {
                    Some(id) => id,
                    None => {
                        let id = ctx.create_command(Some(self.mesh_pass));
                        material.material.bind_diffuse(ctx.command_mut(id).uniforms_mut());
                        self.material_commands.insert(material.id, id);
                        id
                    }
                };
                Renderer3D::draw_mesh(ctx, mesh, &matrix, Some(id))
            }
            None => {
                ctx.start_pass(self.mesh_pass, false);
                let result = Renderer3D::draw_mesh(ctx, mesh, &matrix, None);
                ctx.end_pass();
                result
            }
        }
    }

    fn render(&mut self, ctx: &mut RendererContext) -> Result<()> {
        let mesh = self.mesh();
        Renderer3D::end(ctx);

        let (view, view_projection) = {
            let camera = self.controller.camera();
            (camera.view(), camera.view_projection())
        };

        let drawn = self.render_selection(ctx, view_projection)
            .and_then(|_| self.render_billboards(ctx, view, view_projection));
        Renderer3D::end(ctx);

        ctx.propagate_uniforms(mesh);
        let flushed = ctx.flush();
        let result = drawn.and(flushed);

        self.mesh_command = None;
        self.line_command = None;
        self.material_commands.clear();
        self.billboards.clear();
        self.selected_mesh = None;
        self.has_camera = false;
        self.has_directional_light = false;
        self.point_light_count = 0;
        self.spotlight_count = 0;
        result
    }

    fn output(&self) -> &Arc<Framebuffer> {
        &self.output
    }
}

#[cfg(test)]
#[path = "editor_scene_renderer_tests.rs"]
mod tests;
