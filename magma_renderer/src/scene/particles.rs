/// GPU particle emitters
///
/// Each emitter owns a particle SSBO and a free list SSBO. The CPU side only
/// decides how many particles to spawn per tick; spawning, simulation and
/// recycling run in the emit/update compute passes, and the draw pass
/// expands each live particle into a billboard.
///
/// Free list layout: element 0 is the number of free slots, followed by the
/// free particle indices, initially `max - 1` down to `0`.

use std::collections::BTreeMap;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use crate::config::ParticleSettings;
use crate::error::Result;
use crate::graphics_device::{Framebuffer, GraphicsDevice};
use crate::renderer::{
    BlendingMode, CullingMode, DepthTestingMode, DrawCall, PrimitiveType, RenderPassKey,
    RenderPassSpecification, RendererContext,
};
use crate::renderer::renderer_3d::Renderer3D;
use crate::resource::{Buffer, BufferDesc, BufferKind, FieldDesc, FieldType};
use crate::scene::components::{EntityId, ParticleEmitterComponent};
use crate::utils::TimeStep;
use crate::{engine_bail_warn, engine_debug, engine_warn};

const SOURCE: &str = "magma::Particles";

/// Storage bindings shared by the three particle passes
pub const PARTICLE_BINDING: u32 = 0;
pub const FREE_LIST_BINDING: u32 = 1;

/// Vertices of one particle billboard
pub const PARTICLE_VERTEX_COUNT: u32 = 6;

/// std430 particle record
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleData {
    pub position: Vec4,
    pub velocity: Vec4,
    /// Remaining life in milliseconds, dead at or below zero
    pub life: f32,
    pub _padding: [f32; 3],
}

/// Initial free list for `max` particles: `[max, max - 1, ..., 0]`
pub fn initial_free_list(max: u32) -> Vec<i32> {
    let max = max as i32;
    std::iter::once(max).chain((0..max).rev()).collect()
}

// ===== EMITTER =====

#[derive(Debug)]
pub struct ParticleEmitter {
    settings: ParticleEmitterComponent,
    particles: Buffer,
    free_list: Buffer,
    timer: f32,
}

impl ParticleEmitter {
    pub fn create(device: &mut dyn GraphicsDevice, entity: EntityId, settings: ParticleEmitterComponent) -> Result<Self> {
        let max = settings.max_particle_count;
        if max == 0 {
            engine_bail_warn!(SOURCE, "Emitter {:?} has a max particle count of 0", entity);
        }

        let particles = Buffer::create(device, BufferDesc {
            name: format!("Particles.{}", entity.0),
            kind: BufferKind::Storage,
            fields: vec![
                FieldDesc::new("Position", FieldType::Vec4),
                FieldDesc::new("Velocity", FieldType::Vec4),
                FieldDesc::new("Life", FieldType::Float),
            ],
            count: max,
        })?;
        particles.write_slice(0, &vec![ParticleData::default(); max as usize])?;

        let free_list = Buffer::create(device, BufferDesc {
            name: format!("FreeList.{}", entity.0),
            kind: BufferKind::Storage,
            fields: vec![FieldDesc::new("Index", FieldType::Int)],
            count: max + 1,
        })?;
        free_list.write_slice(0, &initial_free_list(max))?;

        engine_debug!(SOURCE, "Emitter {:?} allocated for {} particles", entity, max);
        Ok(Self { settings, particles, free_list, timer: 0.0 })
    }

    pub fn settings(&self) -> &ParticleEmitterComponent {
        &self.settings
    }

    pub fn particles(&self) -> &Buffer {
        &self.particles
    }

    pub fn free_list(&self) -> &Buffer {
        &self.free_list
    }

    /// Milliseconds accumulated toward the next spawn
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Accumulate `ts` and return the number of particles due this tick
    pub fn advance(&mut self, ts: TimeStep) -> u32 {
        let interval = self.settings.spawn_interval;
        if interval <= 0.0 {
            return 0;
        }
        self.timer += ts.milliseconds();
        let spawn = (self.timer / interval).floor() as u32;
        self.timer %= interval;
        spawn
    }
}

// ===== SYSTEM =====

#[derive(Debug)]
pub struct ParticleSystem {
    settings: ParticleSettings,
    emitters: BTreeMap<EntityId, ParticleEmitter>,
    emit_pass: RenderPassKey,
    update_pass: RenderPassKey,
    draw_pass: RenderPassKey,
}

impl ParticleSystem {
    /// Create the emit/update compute passes and the draw pass into `output`
    pub fn create(ctx: &mut RendererContext, output: Arc<Framebuffer>) -> Result<Self> {
        let mesh_buffer = Renderer3D::mesh_buffer(ctx);
        let emit_pass = ctx.create_pass(RenderPassSpecification::compute("Particle-Emit"))?;
        let update_pass = ctx.create_pass(RenderPassSpecification::compute("Particle-Update"))?;
        let draw_pass = ctx.create_pass(RenderPassSpecification::graphics("Particle-Draw", Some(output), mesh_buffer))?;

        Ok(Self {
            settings: ctx.config().particles,
            emitters: BTreeMap::new(),
            emit_pass,
            update_pass,
            draw_pass,
        })
    }

    pub fn destroy(self, ctx: &mut RendererContext) {
        ctx.destroy_pass(self.emit_pass);
        ctx.destroy_pass(self.update_pass);
        ctx.destroy_pass(self.draw_pass);
    }

    pub fn passes(&self) -> [RenderPassKey; 3] {
        [self.emit_pass, self.update_pass, self.draw_pass]
    }

    pub fn emitter(&self, entity: EntityId) -> Option<&ParticleEmitter> {
        self.emitters.get(&entity)
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// (Re)allocate the buffers of `entity` and restart its spawn timer
    pub fn set_emitter(&mut self, ctx: &RendererContext, entity: EntityId, component: &ParticleEmitterComponent) -> Result<()> {
        let emitter = ctx.with_device(|device| ParticleEmitter::create(device, entity, component.clone()))?;
        self.emitters.insert(entity, emitter);
        Ok(())
    }

    /// Refresh the settings of a live emitter, reallocating only when its
    /// capacity changed
    pub fn sync_emitter(&mut self, ctx: &RendererContext, entity: EntityId, component: &ParticleEmitterComponent) -> Result<()> {
        match self.emitters.get_mut(&entity) {
            Some(emitter) if emitter.settings.max_particle_count == component.max_particle_count => {
                emitter.settings = component.clone();
                Ok(())
            }
            _ => self.set_emitter(ctx, entity, component),
        }
    }

    pub fn remove_emitter(&mut self, entity: EntityId) -> bool {
        self.emitters.remove(&entity).is_some()
    }

    /// Drop every emitter (scene closed)
    pub fn clear(&mut self) {
        self.emitters.clear();
    }

    /// Queue the emit and update dispatches of every emitter
    pub fn update(&mut self, ctx: &mut RendererContext, ts: TimeStep) {
        if self.emitters.is_empty() {
            return;
        }

        ctx.start_pass(self.emit_pass, false);
        for emitter in self.emitters.values_mut() {
            let spawn = emitter.advance(ts);
            if spawn == 0 {
                continue;
            }
            let id = ctx.push_command();
            let command = ctx.compute_command_mut(id);
            command.workgroups = [spawn.div_ceil(self.settings.emit_workgroup_size), 1, 1];
            let uniforms = &mut command.uniforms;
            uniforms.set("u_TimeStep", ts.milliseconds());
            uniforms.set("u_ParticlesToSpawn", spawn as i32);
            uniforms.set("u_Emitter.Position", emitter.settings.position);
            uniforms.set("u_Emitter.ParticleLifetime", emitter.settings.particle_lifetime);
            uniforms.set("u_Emitter.Offset", emitter.settings.offset);
            uniforms.set_storage_buffer(PARTICLE_BINDING, emitter.particles.device_buffer().clone());
            uniforms.set_storage_buffer(FREE_LIST_BINDING, emitter.free_list.device_buffer().clone());
        }
        ctx.end_pass();

        ctx.start_pass(self.update_pass, false);
        for emitter in self.emitters.values() {
            let id = ctx.push_command();
            let command = ctx.compute_command_mut(id);
            command.workgroups = [emitter.settings.max_particle_count.div_ceil(self.settings.update_workgroup_size), 1, 1];
            command.uniforms.set("u_TimeStep", ts.milliseconds());
            command.uniforms.set_storage_buffer(PARTICLE_BINDING, emitter.particles.device_buffer().clone());
            command.uniforms.set_storage_buffer(FREE_LIST_BINDING, emitter.free_list.device_buffer().clone());
        }
        ctx.end_pass();
    }

    /// Queue the billboards of one emitter
    pub fn draw(&self, ctx: &mut RendererContext, entity: EntityId, view: &Mat4, view_projection: &Mat4) {
        let Some(emitter) = self.emitters.get(&entity) else {
            engine_warn!(SOURCE, "No particle emitter registered for {:?}", entity);
            return;
        };

        let id = ctx.create_command(Some(self.draw_pass));
        let command = ctx.draw_command_mut(id);
        command.depth_test = DepthTestingMode::On;
        command.culling = CullingMode::Off;
        command.blending = BlendingMode::Greatest;
        command.uniforms.set("u_View", *view);
        command.uniforms.set("u_ViewProj", *view_projection);
        command.uniforms.set("u_BillboardWidth", self.settings.billboard_size);
        command.uniforms.set("u_BillboardHeight", self.settings.billboard_size);
        if let Some(texture) = &emitter.settings.texture {
            command.uniforms.set_texture("u_Texture", 0, texture.clone());
        }
        command.uniforms.set_storage_buffer(PARTICLE_BINDING, emitter.particles.device_buffer().clone());
        command.calls.push(DrawCall::instanced(
            PrimitiveType::Triangle,
            PARTICLE_VERTEX_COUNT,
            0,
            emitter.settings.max_particle_count,
        ));
    }
}

#[cfg(test)]
#[path = "particles_tests.rs"]
mod tests;
