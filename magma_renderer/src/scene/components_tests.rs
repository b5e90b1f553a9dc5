use super::*;

// ============================================================================
// Components
// ============================================================================

#[test]
fn test_transform_matrix_order() {
    let transform = Transform {
        translation: Vec3::new(1.0, 2.0, 3.0),
        rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
        scale: Vec3::splat(2.0),
    };
    // Scale, then rotate +X onto -Z, then translate
    let point = transform.matrix().transform_point3(Vec3::X);
    assert!((point - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
}

#[test]
fn test_light_position() {
    let light = LightComponent::Point(PointLight {
        position: Vec3::Y,
        ambient: Vec3::ZERO,
        diffuse: Vec3::ONE,
        specular: Vec3::ONE,
        constant: 1.0,
        linear: 0.09,
        quadratic: 0.032,
        bloom: true,
    });
    assert_eq!(light.position(), Vec3::Y);
}
