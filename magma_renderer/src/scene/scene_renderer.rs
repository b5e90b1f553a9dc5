/// Scene rendering strategies.
///
/// A SceneRenderer turns one frame of resolved entity components into
/// queued commands. The external driver calls, per frame:
///
/// 1. `update` (outside the begin/render bracket)
/// 2. `begin`
/// 3. the `submit_*` methods once per matching entity, camera first
/// 4. `render`, which flushes the frame
///
/// Implementations: `RuntimeSceneRenderer` (lit, bloomed play mode) and
/// `EditorSceneRenderer` (preview with icons, grid and selection outline).

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::Framebuffer;
use crate::renderer::RendererContext;
use crate::scene::components::{
    CameraComponent, EntityId, LightComponent, MeshComponent, ParticleEmitterComponent,
    SkyboxComponent, Transform,
};
use crate::utils::TimeStep;

pub trait SceneRenderer {
    /// Per-frame simulation work (particles, camera controller)
    fn update(&mut self, ctx: &mut RendererContext, ts: TimeStep);

    /// Allocate this frame's long-lived commands
    fn begin(&mut self, ctx: &mut RendererContext);

    fn submit_camera(&mut self, ctx: &mut RendererContext, entity: EntityId, camera: &CameraComponent);

    fn submit_skybox(&mut self, ctx: &mut RendererContext, entity: EntityId, skybox: &SkyboxComponent);

    fn submit_light(&mut self, ctx: &mut RendererContext, entity: EntityId, light: &LightComponent) -> Result<()>;

    fn submit_particles(&mut self, ctx: &mut RendererContext, entity: EntityId, emitter: &ParticleEmitterComponent) -> Result<()>;

    fn submit_mesh(&mut self, ctx: &mut RendererContext, entity: EntityId, transform: &Transform, mesh: &MeshComponent) -> Result<()>;

    /// Finish the frame and flush every queued command
    fn render(&mut self, ctx: &mut RendererContext) -> Result<()>;

    /// Target holding the finished image
    fn output(&self) -> &Arc<Framebuffer>;
}
