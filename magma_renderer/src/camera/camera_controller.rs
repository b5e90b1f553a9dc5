/// CameraController - fly-through movement for an editor camera.
///
/// Input is passed in explicitly each tick; the controller never polls a
/// window. Rotation only happens while the mouse button is held.

use glam::{Quat, Vec2, Vec3};
use crate::camera::Camera;
use crate::utils::TimeStep;

/// Mouse pixels to radians (before `rotation_speed`)
const MOUSE_SENSITIVITY: f32 = 0.001;

/// Input snapshot for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerInput {
    pub mouse_position: Vec2,
    /// Rotation and movement are only applied while held
    pub mouse_held: bool,
    /// Right/left on x, up/down on y, forward/backward on z, each in [-1, 1]
    pub movement: Vec3,
}

#[derive(Debug, Clone)]
pub struct CameraController {
    camera: Camera,
    pub translation_speed: f32,
    pub rotation_speed: f32,
    last_mouse_position: Vec2,
}

impl CameraController {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            translation_speed: 5.0,
            rotation_speed: 2.0,
            last_mouse_position: Vec2::ZERO,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Advance by `ts`; returns whether the camera moved
    pub fn on_update(&mut self, ts: TimeStep, input: &ControllerInput) -> bool {
        let delta = (input.mouse_position - self.last_mouse_position) * MOUSE_SENSITIVITY;
        self.last_mouse_position = input.mouse_position;

        if !input.mouse_held {
            return false;
        }

        let forward = self.camera.direction();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let mut position = self.camera.position();
        let mut direction = forward;
        let mut moved = false;

        let axes = input.movement;
        if axes != Vec3::ZERO {
            let move_dir = axes.x * right + axes.y * Vec3::Y + axes.z * forward;
            let speed = self.translation_speed * 0.001;
            position += move_dir.normalize_or_zero() * speed * ts.milliseconds();
            moved = true;
        }

        if delta != Vec2::ZERO && self.rotation_speed != 0.0 {
            let pitch = delta.y * self.rotation_speed;
            let yaw = delta.x * self.rotation_speed;
            let rotation = Quat::from_axis_angle(right, -pitch) * Quat::from_axis_angle(Vec3::Y, -yaw);
            direction = rotation.normalize() * forward;
            moved = true;
        }

        if moved {
            self.camera.set_position_direction(position, direction);
        }
        moved
    }
}

#[cfg(test)]
#[path = "camera_controller_tests.rs"]
mod tests;
