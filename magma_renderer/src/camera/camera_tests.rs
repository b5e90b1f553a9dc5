use glam::{Mat4, Vec3};
use super::*;

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_defaults() {
    let camera = Camera::stereographic(45.0);
    assert_eq!(camera.position(), Vec3::ZERO);
    assert_eq!(camera.direction(), Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(camera.viewport_width(), 800);
    assert_eq!(camera.viewport_height(), 600);
    assert_eq!(camera.near(), 0.001);
    assert_eq!(camera.far(), 1000.0);
    assert_eq!(camera.projection_kind(), Projection::Stereographic { vertical_fov: 45.0 });
}

#[test]
#[should_panic(expected = "Viewport width and height must not be 0")]
fn test_zero_viewport_is_fatal() {
    Camera::with_viewport(Projection::Orthographic, 0, 600, 0.1, 10.0);
}

#[test]
#[should_panic(expected = "Near and far clip must be non-zero")]
fn test_zero_clip_is_fatal() {
    Camera::with_viewport(Projection::Orthographic, 800, 600, 0.0, 10.0);
}

// ============================================================================
// Matrices
// ============================================================================

#[test]
fn test_stereographic_matrices() {
    let mut camera = Camera::with_viewport(
        Projection::Stereographic { vertical_fov: 60.0 }, 1920, 1080, 0.1, 100.0);
    camera.set_position(Vec3::new(0.0, 1.0, 5.0));

    let view = Mat4::look_at_rh(Vec3::new(0.0, 1.0, 5.0), Vec3::new(0.0, 1.0, 4.0), Vec3::Y);
    let projection = Mat4::perspective_rh_gl(60f32.to_radians(), 1920.0 / 1080.0, 0.1, 100.0);
    assert_eq!(camera.view(), view);
    assert_eq!(camera.projection(), projection);
    assert_eq!(camera.view_projection(), projection * view);
}

#[test]
fn test_orthographic_projection_is_pixel_sized() {
    let camera = Camera::with_viewport(Projection::Orthographic, 200, 100, 0.1, 10.0);
    let expected = Mat4::orthographic_rh_gl(-100.0, 100.0, -50.0, 50.0, 0.1, 10.0);
    assert_eq!(camera.projection(), expected);
}

#[test]
fn test_set_direction_normalizes() {
    let mut camera = Camera::default();
    camera.set_direction(Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(camera.direction(), Vec3::X);

    // Degenerate input keeps the previous direction
    camera.set_direction(Vec3::ZERO);
    assert_eq!(camera.direction(), Vec3::X);
}

// ============================================================================
// Resize / clip range
// ============================================================================

#[test]
fn test_resize_ignores_zero_dimensions() {
    let mut camera = Camera::orthographic();
    camera.resize(0, 300);
    assert_eq!(camera.viewport_width(), 800);
    assert_eq!(camera.viewport_height(), 300);

    let projection = camera.projection();
    camera.resize(800, 300);
    assert_eq!(camera.projection(), projection);
}

#[test]
fn test_set_projection_ignores_zero_distances() {
    let mut camera = Camera::stereographic(45.0);
    camera.set_projection(0.0, 500.0);
    assert_eq!(camera.near(), 0.001);
    assert_eq!(camera.far(), 500.0);

    camera.set_projection(0.5, 0.0);
    assert_eq!(camera.near(), 0.5);
    assert_eq!(camera.far(), 500.0);
}

#[test]
fn test_vertical_fov_only_applies_to_stereographic() {
    let mut ortho = Camera::orthographic();
    let projection = ortho.projection();
    ortho.set_vertical_fov(90.0);
    assert_eq!(ortho.projection(), projection);

    let mut stereo = Camera::stereographic(45.0);
    stereo.set_vertical_fov(90.0);
    assert_eq!(stereo.projection_kind(), Projection::Stereographic { vertical_fov: 90.0 });
}
