/// Camera - view and projection for one point of view.
///
/// The set of projections is closed, so the camera is one struct with a
/// `Projection` tag instead of a trait object. Every setter recomputes the
/// cached matrices it affects; `view_projection()` is always current.

use glam::{Mat4, Vec3};
use crate::{engine_assert, engine_trace};

const SOURCE: &str = "magma::Camera";

/// Default stereographic vertical field of view in degrees
pub const DEFAULT_VERTICAL_FOV: f32 = 45.0;

/// Projection kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Pixel-unit box centered on the view axis
    Orthographic,
    /// Perspective with a vertical field of view in degrees
    Stereographic { vertical_fov: f32 },
}

#[derive(Debug, Clone)]
pub struct Camera {
    projection_kind: Projection,
    position: Vec3,
    direction: Vec3,
    viewport_width: u32,
    viewport_height: u32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
}

impl Camera {
    /// Camera with the default 800x600 viewport and [0.001, 1000] clip range
    pub fn new(projection: Projection) -> Self {
        Self::with_viewport(projection, 800, 600, 0.001, 1000.0)
    }

    pub fn orthographic() -> Self {
        Self::new(Projection::Orthographic)
    }

    pub fn stereographic(vertical_fov: f32) -> Self {
        Self::new(Projection::Stereographic { vertical_fov })
    }

    /// Zero viewport sizes or clip distances are fatal
    pub fn with_viewport(projection: Projection, width: u32, height: u32, near: f32, far: f32) -> Self {
        engine_assert!(width != 0 && height != 0, SOURCE,
            "Viewport width and height must not be 0 (got {}x{})", width, height);
        engine_assert!(near != 0.0 && far != 0.0, SOURCE,
            "Near and far clip must be non-zero (got {}, {})", near, far);

        let mut camera = Self {
            projection_kind: projection,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            viewport_width: width,
            viewport_height: height,
            near,
            far,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
        };
        camera.calculate_projection();
        camera.calculate_view();
        camera
    }

    // ===== GETTERS =====

    pub fn projection_kind(&self) -> Projection { self.projection_kind }
    pub fn position(&self) -> Vec3 { self.position }
    pub fn direction(&self) -> Vec3 { self.direction }
    pub fn viewport_width(&self) -> u32 { self.viewport_width }
    pub fn viewport_height(&self) -> u32 { self.viewport_height }
    pub fn near(&self) -> f32 { self.near }
    pub fn far(&self) -> f32 { self.far }
    pub fn view(&self) -> Mat4 { self.view }
    pub fn projection(&self) -> Mat4 { self.projection }
    pub fn view_projection(&self) -> Mat4 { self.view_projection }

    // ===== SETTERS =====

    /// Resize the viewport; a zero dimension keeps its current value
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.viewport_width && height == self.viewport_height {
            return;
        }
        if width != 0 {
            self.viewport_width = width;
        }
        if height != 0 {
            self.viewport_height = height;
        }
        engine_trace!(SOURCE, "Resized to {}x{}", self.viewport_width, self.viewport_height);
        self.calculate_projection();
    }

    /// Change the clip range; a zero distance keeps its current value
    pub fn set_projection(&mut self, near: f32, far: f32) {
        if near == self.near && far == self.far {
            return;
        }
        if near != 0.0 {
            self.near = near;
        }
        if far != 0.0 {
            self.far = far;
        }
        self.calculate_projection();
    }

    /// Only meaningful for stereographic cameras
    pub fn set_vertical_fov(&mut self, vertical_fov: f32) {
        if let Projection::Stereographic { vertical_fov: fov } = &mut self.projection_kind {
            *fov = vertical_fov;
            self.calculate_projection();
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.calculate_view();
    }

    /// Direction is normalized
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction.normalize_or(self.direction);
        self.calculate_view();
    }

    pub fn set_position_direction(&mut self, position: Vec3, direction: Vec3) {
        self.position = position;
        self.direction = direction;
        self.calculate_view();
    }

    // ===== MATRICES =====

    fn calculate_view(&mut self) {
        self.view = match self.projection_kind {
            // The orthographic view looks at `direction` as a point
            Projection::Orthographic => Mat4::look_at_rh(self.position, self.direction, Vec3::Y),
            Projection::Stereographic { .. } => {
                Mat4::look_at_rh(self.position, self.position + self.direction, Vec3::Y)
            }
        };
        self.view_projection = self.projection * self.view;
    }

    fn calculate_projection(&mut self) {
        let width = self.viewport_width as f32;
        let height = self.viewport_height as f32;
        self.projection = match self.projection_kind {
            Projection::Orthographic => Mat4::orthographic_rh_gl(
                -width / 2.0, width / 2.0, -height / 2.0, height / 2.0, self.near, self.far),
            Projection::Stereographic { vertical_fov } => Mat4::perspective_rh_gl(
                vertical_fov.to_radians(), width / height, self.near, self.far),
        };
        self.view_projection = self.projection * self.view;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::stereographic(DEFAULT_VERTICAL_FOV)
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
