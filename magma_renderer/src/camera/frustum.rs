/// Frustum - world-space corners of a camera's clip volume.
///
/// Corners are found by unprojecting the eight NDC cube corners through
/// the inverse view-projection, which works for both projection kinds.

use glam::{Mat4, Vec3, Vec4};
use crate::camera::Camera;

/// Corner indices (near plane first, counter-clockwise from bottom left)
pub const NEAR_BOTTOM_LEFT: usize = 0;
pub const NEAR_BOTTOM_RIGHT: usize = 1;
pub const NEAR_TOP_RIGHT: usize = 2;
pub const NEAR_TOP_LEFT: usize = 3;
pub const FAR_BOTTOM_LEFT: usize = 4;
pub const FAR_BOTTOM_RIGHT: usize = 5;
pub const FAR_TOP_RIGHT: usize = 6;
pub const FAR_TOP_LEFT: usize = 7;
/// Camera position, appended after the corners by `line_points`
pub const APEX: usize = 8;

/// Line-list indices into `line_points`: apex rays, near rectangle, far rectangle
#[rustfmt::skip]
pub const FRUSTUM_LINE_INDICES: [u32; 24] = [
    8, 7,  8, 6,  8, 4,  8, 5,
    3, 2,  0, 1,  3, 0,  2, 1,
    7, 6,  4, 5,  7, 4,  6, 5,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub corners: [Vec3; 8],
}

impl Frustum {
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let inverse = view_projection.inverse();
        let unproject = |x: f32, y: f32, z: f32| {
            let point = inverse * Vec4::new(x, y, z, 1.0);
            point.truncate() / point.w
        };

        Self {
            corners: [
                unproject(-1.0, -1.0, -1.0),
                unproject(1.0, -1.0, -1.0),
                unproject(1.0, 1.0, -1.0),
                unproject(-1.0, 1.0, -1.0),
                unproject(-1.0, -1.0, 1.0),
                unproject(1.0, -1.0, 1.0),
                unproject(1.0, 1.0, 1.0),
                unproject(-1.0, 1.0, 1.0),
            ],
        }
    }

    pub fn from_camera(camera: &Camera) -> Self {
        Self::from_view_projection(&camera.view_projection())
    }

    /// Corners followed by `apex`, ready for `FRUSTUM_LINE_INDICES`
    pub fn line_points(&self, apex: Vec3) -> [Vec3; 9] {
        let mut points = [apex; 9];
        points[..8].copy_from_slice(&self.corners);
        points
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
