use super::*;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;

// ============================================================================
// Helpers
// ============================================================================

fn point(x: f32, bloom: bool) -> LightComponent {
    LightComponent::Point(PointLight {
        position: Vec3::new(x, 0.0, 0.0),
        ambient: Vec3::splat(0.1),
        diffuse: Vec3::ONE,
        specular: Vec3::ONE,
        constant: 1.0,
        linear: 0.09,
        quadratic: 0.032,
        bloom,
    })
}

fn spot(x: f32) -> LightComponent {
    LightComponent::Spot(Spotlight {
        position: Vec3::new(x, 0.0, 0.0),
        ambient: Vec3::ZERO,
        diffuse: Vec3::ONE,
        specular: Vec3::ONE,
        direction: Vec3::NEG_Y,
        cutoff_angle: 0.97,
        outer_cutoff_angle: 0.95,
    })
}

fn directional(y: f32) -> LightComponent {
    LightComponent::Directional(DirectionalLight {
        position: Vec3::new(0.0, y, 0.0),
        ambient: Vec3::ZERO,
        diffuse: Vec3::ONE,
        specular: Vec3::ONE,
        direction: Vec3::NEG_Y,
    })
}

fn create(device: &mut MockGraphicsDevice, settings: LightSettings) -> LightBuffers {
    LightBuffers::create(device, &settings, &BloomSettings::default()).unwrap()
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_record_sizes_match_std140_layouts() {
    assert_eq!(std::mem::size_of::<DirectionalLightData>(), 80);
    assert_eq!(std::mem::size_of::<PointLightData>(), 80);
    assert_eq!(std::mem::size_of::<SpotlightData>(), 96);

    let mut device = MockGraphicsDevice::new();
    create(&mut device, LightSettings::default());
    assert_eq!(device.buffer("DirectionalLights").unwrap().contents().len(), 80);
    assert_eq!(device.buffer("PointLights").unwrap().contents().len(), 80 * 50);
    assert_eq!(device.buffer("Spotlights").unwrap().contents().len(), 96 * 50);
}

#[test]
fn test_bloom_strength_only_for_bloom_lights() {
    let LightComponent::Point(light) = point(0.0, true) else { unreachable!() };
    assert_eq!(PointLightData::new(&light, 0.04).bloom_strength, 0.04);
    let LightComponent::Point(light) = point(0.0, false) else { unreachable!() };
    assert_eq!(PointLightData::new(&light, 0.04).bloom_strength, 0.0);
}

// ============================================================================
// Submission
// ============================================================================

#[test]
fn test_point_lights_fill_slots_in_order_and_reset() {
    let mut device = MockGraphicsDevice::new();
    let mut lights = create(&mut device, LightSettings::default());

    for i in 0..3 {
        lights.submit(&point(i as f32, false)).unwrap();
    }
    assert_eq!(lights.point_count(), 3);

    let gpu = device.buffer("PointLights").unwrap();
    for i in 0..3 {
        let record = gpu.read::<PointLightData>(80 * i);
        assert_eq!(record.position, Vec4::new(i as f32, 0.0, 0.0, 0.0));
    }

    lights.reset();
    assert_eq!(lights.point_count(), 0);
    lights.submit(&point(9.0, false)).unwrap();
    assert_eq!(gpu.read::<PointLightData>(0).position.x, 9.0);
}

#[test]
fn test_directional_overwrites_single_slot() {
    let mut device = MockGraphicsDevice::new();
    let mut lights = create(&mut device, LightSettings::default());

    lights.submit(&directional(1.0)).unwrap();
    lights.submit(&directional(2.0)).unwrap();
    assert!(lights.has_directional());
    let record = device.buffer("DirectionalLights").unwrap().read::<DirectionalLightData>(0);
    assert_eq!(record.position.y, 2.0);
}

#[test]
fn test_full_arrays_drop_extra_lights() {
    let mut device = MockGraphicsDevice::new();
    let settings = LightSettings { max_directional: 1, max_point: 2, max_spot: 1 };
    let mut lights = create(&mut device, settings);

    for i in 0..4 {
        lights.submit(&point(i as f32, false)).unwrap();
        lights.submit(&spot(i as f32)).unwrap();
    }
    assert_eq!(lights.point_count(), 2);
    assert_eq!(lights.spot_count(), 1);
    let record = device.buffer("Spotlights").unwrap().read::<SpotlightData>(0);
    assert_eq!(record.position.x, 0.0);
}

#[test]
fn test_bind_sets_counts_and_buffers() {
    let mut device = MockGraphicsDevice::new();
    let mut lights = create(&mut device, LightSettings::default());
    lights.submit(&point(0.0, true)).unwrap();
    lights.submit(&spot(0.0)).unwrap();

    let mut uniforms = UniformData::new();
    lights.bind(&mut uniforms);
    assert_eq!(uniforms.get_int("u_DirectionalLightCount"), Some(0));
    assert_eq!(uniforms.get_int("u_PointLightCount"), Some(1));
    assert_eq!(uniforms.get_int("u_SpotlightCount"), Some(1));
    assert_eq!(uniforms.uniform_buffer(POINT_LIGHT_BINDING).unwrap().size(), 80 * 50);
    assert!(uniforms.uniform_buffer(SPOTLIGHT_BINDING).is_some());
}
