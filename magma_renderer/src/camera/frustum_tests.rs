use glam::{Mat4, Vec3};
use super::*;
use crate::camera::{Camera, Projection};

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-2
}

// ============================================================================
// Corners
// ============================================================================

#[test]
fn test_identity_corners_are_ndc_cube() {
    let frustum = Frustum::from_view_projection(&Mat4::IDENTITY);
    assert_eq!(frustum.corners[NEAR_BOTTOM_LEFT], Vec3::new(-1.0, -1.0, -1.0));
    assert_eq!(frustum.corners[FAR_TOP_RIGHT], Vec3::new(1.0, 1.0, 1.0));
}

#[test]
fn test_perspective_corners_lie_on_clip_planes() {
    let camera = Camera::with_viewport(
        Projection::Stereographic { vertical_fov: 90.0 }, 100, 100, 1.0, 10.0);
    let frustum = Frustum::from_camera(&camera);

    // Camera at origin looking down -Z: near plane at z = -1, far at z = -10
    for corner in &frustum.corners[..4] {
        assert!((corner.z + 1.0).abs() < 1e-3, "near corner {:?}", corner);
    }
    for corner in &frustum.corners[4..] {
        assert!((corner.z + 10.0).abs() < 1e-2, "far corner {:?}", corner);
    }
    // 90 degree fov, square viewport: half extent equals distance
    assert!(approx(frustum.corners[FAR_TOP_RIGHT], Vec3::new(10.0, 10.0, -10.0)));
    assert!(approx(frustum.corners[NEAR_BOTTOM_LEFT], Vec3::new(-1.0, -1.0, -1.0)));
}

// ============================================================================
// Line list
// ============================================================================

#[test]
fn test_line_points_append_apex() {
    let frustum = Frustum::from_view_projection(&Mat4::IDENTITY);
    let apex = Vec3::new(0.0, 1.0, 15.0);
    let points = frustum.line_points(apex);

    assert_eq!(points[APEX], apex);
    assert_eq!(points[FAR_TOP_LEFT], frustum.corners[FAR_TOP_LEFT]);
}

#[test]
fn test_line_indices_cover_twelve_edges() {
    assert_eq!(FRUSTUM_LINE_INDICES.len(), 24);
    assert!(FRUSTUM_LINE_INDICES.iter().all(|&index| index as usize <= APEX));
    // Four rays start at the apex
    let rays = FRUSTUM_LINE_INDICES.chunks(2).filter(|edge| edge[0] as usize == APEX).count();
    assert_eq!(rays, 4);
}
