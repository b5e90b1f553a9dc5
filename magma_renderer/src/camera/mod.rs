//! Camera module - projection cameras, fly-through controller and frustum
//! geometry.

mod camera;
mod camera_controller;
mod frustum;

pub use camera::{Camera, Projection, DEFAULT_VERTICAL_FOV};
pub use camera_controller::{CameraController, ControllerInput};
pub use frustum::{
    Frustum, FRUSTUM_LINE_INDICES,
    NEAR_BOTTOM_LEFT, NEAR_BOTTOM_RIGHT, NEAR_TOP_RIGHT, NEAR_TOP_LEFT,
    FAR_BOTTOM_LEFT, FAR_BOTTOM_RIGHT, FAR_TOP_RIGHT, FAR_TOP_LEFT, APEX,
};
