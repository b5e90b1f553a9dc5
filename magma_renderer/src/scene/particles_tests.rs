use super::*;
use glam::Vec3;
use crate::graphics_device::mock_graphics_device::{mock_texture, test_context, MockGraphicsDevice};
use crate::renderer::Command;

// ============================================================================
// Helpers
// ============================================================================

fn emitter_settings(max: u32, interval: f32) -> ParticleEmitterComponent {
    ParticleEmitterComponent {
        position: Vec3::new(1.0, 2.0, 3.0),
        max_particle_count: max,
        particle_lifetime: 500.0,
        spawn_interval: interval,
        offset: 0.5,
        texture: None,
    }
}

fn emitter(max: u32, interval: f32) -> ParticleEmitter {
    let mut device = MockGraphicsDevice::new();
    ParticleEmitter::create(&mut device, EntityId(1), emitter_settings(max, interval)).unwrap()
}

// ============================================================================
// Free list
// ============================================================================

#[test]
fn test_initial_free_list_counts_then_descends() {
    assert_eq!(initial_free_list(3), vec![3, 2, 1, 0]);
    assert_eq!(initial_free_list(0), vec![0]);
}

#[test]
fn test_emitter_uploads_free_list_and_dead_particles() {
    let mut device = MockGraphicsDevice::new();
    let emitter = ParticleEmitter::create(&mut device, EntityId(7), emitter_settings(500, 100.0)).unwrap();
    assert_eq!(emitter.free_list().count(), 501);
    assert_eq!(emitter.particles().stride(), std::mem::size_of::<ParticleData>() as u64);

    let free_list = device.buffer("FreeList.7").unwrap();
    assert_eq!(free_list.read::<i32>(0), 500);
    for slot in 1..=500usize {
        assert_eq!(free_list.read::<i32>(slot * 4), 500 - slot as i32);
    }

    let particles = device.buffer("Particles.7").unwrap();
    assert_eq!(particles.contents().len(), 48 * 500);
    assert_eq!(particles.read::<ParticleData>(48 * 499).life, 0.0);
}

#[test]
fn test_zero_capacity_emitter_is_rejected() {
    let mut device = MockGraphicsDevice::new();
    assert!(ParticleEmitter::create(&mut device, EntityId(1), emitter_settings(0, 100.0)).is_err());
    assert!(device.buffers.is_empty());
}

// ============================================================================
// Spawn accounting
// ============================================================================

#[test]
fn test_advance_spawns_floor_of_elapsed_intervals() {
    // Less than one interval
    let mut e = emitter(10, 100.0);
    assert_eq!(e.advance(TimeStep::from_milliseconds(40.0)), 0);
    assert_eq!(e.timer(), 40.0);

    // Exactly one interval
    let mut e = emitter(10, 100.0);
    assert_eq!(e.advance(TimeStep::from_milliseconds(100.0)), 1);
    assert_eq!(e.timer(), 0.0);

    // Several intervals
    let mut e = emitter(10, 100.0);
    assert_eq!(e.advance(TimeStep::from_milliseconds(350.0)), 3);
    assert_eq!(e.timer(), 50.0);

    // Zero elapsed
    let mut e = emitter(10, 100.0);
    assert_eq!(e.advance(TimeStep::from_milliseconds(0.0)), 0);
    assert_eq!(e.timer(), 0.0);
}

#[test]
fn test_advance_carries_remainder_between_ticks() {
    let mut e = emitter(10, 100.0);
    assert_eq!(e.advance(TimeStep::from_milliseconds(60.0)), 0);
    assert_eq!(e.advance(TimeStep::from_milliseconds(60.0)), 1);
    assert_eq!(e.timer(), 20.0);
}

#[test]
fn test_non_positive_interval_never_spawns() {
    let mut e = emitter(10, 0.0);
    assert_eq!(e.advance(TimeStep::from_milliseconds(1000.0)), 0);
}

// ============================================================================
// System
// ============================================================================

#[test]
fn test_update_dispatches_emit_then_update() {
    let (_device, mut ctx) = test_context();
    let output = Arc::new(ctx.with_device(|device| {
        Framebuffer::create(device, &crate::graphics_device::FramebufferDesc::color_depth("Output", 320, 180))
    }).unwrap());
    let mut system = ParticleSystem::create(&mut ctx, output).unwrap();
    system.set_emitter(&ctx, EntityId(1), &emitter_settings(500, 1.0)).unwrap();

    system.update(&mut ctx, TimeStep::from_milliseconds(130.0));
    let [emit, update, _] = system.passes();
    let commands = ctx.queued_commands();
    assert_eq!(commands.len(), 2);

    let spawn = commands[0].as_compute().unwrap();
    assert_eq!(spawn.pass, Some(emit));
    // 130 particles in groups of 64
    assert_eq!(spawn.workgroups, [3, 1, 1]);
    assert_eq!(spawn.uniforms.get_int("u_ParticlesToSpawn"), Some(130));
    assert_eq!(spawn.uniforms.get_float("u_TimeStep"), Some(130.0));
    assert_eq!(spawn.uniforms.get_vec3("u_Emitter.Position"), Some(Vec3::new(1.0, 2.0, 3.0)));
    assert_eq!(spawn.uniforms.get_float("u_Emitter.ParticleLifetime"), Some(500.0));
    assert_eq!(spawn.uniforms.get_float("u_Emitter.Offset"), Some(0.5));
    assert_eq!(spawn.uniforms.storage_buffer(FREE_LIST_BINDING).unwrap().size(), 501 * 4);

    let simulate = commands[1].as_compute().unwrap();
    assert_eq!(simulate.pass, Some(update));
    // 500 particles in groups of 128
    assert_eq!(simulate.workgroups, [4, 1, 1]);
    assert_eq!(ctx.active_pass(), None);
}

#[test]
fn test_update_skips_emit_when_nothing_due() {
    let (_device, mut ctx) = test_context();
    let output = Arc::new(ctx.with_device(|device| {
        Framebuffer::create(device, &crate::graphics_device::FramebufferDesc::color_depth("Output", 320, 180))
    }).unwrap());
    let mut system = ParticleSystem::create(&mut ctx, output).unwrap();
    system.set_emitter(&ctx, EntityId(1), &emitter_settings(100, 100.0)).unwrap();

    system.update(&mut ctx, TimeStep::from_milliseconds(10.0));
    let commands = ctx.queued_commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].pass(), Some(system.passes()[1]));
}

#[test]
fn test_sync_emitter_keeps_timer_unless_capacity_changes() {
    let (_device, mut ctx) = test_context();
    let output = Arc::new(ctx.with_device(|device| {
        Framebuffer::create(device, &crate::graphics_device::FramebufferDesc::color_depth("Output", 320, 180))
    }).unwrap());
    let mut system = ParticleSystem::create(&mut ctx, output).unwrap();
    let entity = EntityId(3);
    system.set_emitter(&ctx, entity, &emitter_settings(100, 100.0)).unwrap();
    system.update(&mut ctx, TimeStep::from_milliseconds(30.0));

    let mut moved = emitter_settings(100, 100.0);
    moved.position = Vec3::ZERO;
    system.sync_emitter(&ctx, entity, &moved).unwrap();
    assert_eq!(system.emitter(entity).unwrap().timer(), 30.0);
    assert_eq!(system.emitter(entity).unwrap().settings().position, Vec3::ZERO);

    system.sync_emitter(&ctx, entity, &emitter_settings(200, 100.0)).unwrap();
    assert_eq!(system.emitter(entity).unwrap().timer(), 0.0);
    assert_eq!(system.emitter(entity).unwrap().free_list().count(), 201);

    assert!(system.remove_emitter(entity));
    assert!(!system.remove_emitter(entity));
}

#[test]
fn test_draw_instances_every_particle() {
    let (_device, mut ctx) = test_context();
    let output = Arc::new(ctx.with_device(|device| {
        Framebuffer::create(device, &crate::graphics_device::FramebufferDesc::color_depth("Output", 320, 180))
    }).unwrap());
    let mut system = ParticleSystem::create(&mut ctx, output).unwrap();
    let mut settings = emitter_settings(250, 100.0);
    settings.texture = Some(mock_texture("Spark"));
    system.set_emitter(&ctx, EntityId(1), &settings).unwrap();

    let view = Mat4::from_translation(Vec3::X);
    system.draw(&mut ctx, EntityId(1), &view, &Mat4::IDENTITY);
    system.draw(&mut ctx, EntityId(2), &view, &Mat4::IDENTITY);

    let commands: Vec<_> = ctx.queued_commands().iter().filter_map(Command::as_draw).collect();
    assert_eq!(commands.len(), 1);
    let command = commands[0];
    assert_eq!(command.pass, Some(system.passes()[2]));
    assert_eq!(command.calls, vec![DrawCall::instanced(PrimitiveType::Triangle, 6, 0, 250)]);
    assert_eq!(command.blending, BlendingMode::Greatest);
    assert_eq!(command.culling, CullingMode::Off);
    assert_eq!(command.uniforms.get_mat4("u_View"), Some(view));
    assert_eq!(command.uniforms.get_float("u_BillboardWidth"), Some(0.1));
    assert_eq!(command.uniforms.texture("u_Texture").unwrap().slot, 0);
    assert!(command.uniforms.storage_buffer(PARTICLE_BINDING).is_some());
}
