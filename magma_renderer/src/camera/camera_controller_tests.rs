use super::*;

fn controller() -> CameraController {
    let mut controller = CameraController::new(Camera::stereographic(45.0));
    controller.translation_speed = 10.0;
    controller.rotation_speed = 1.0;
    controller
}

#[test]
fn test_released_mouse_does_nothing() {
    let mut controller = controller();
    let input = ControllerInput {
        mouse_position: Vec2::new(50.0, 0.0),
        mouse_held: false,
        movement: Vec3::Z,
    };
    assert!(!controller.on_update(TimeStep::from_milliseconds(16.0), &input));
    assert_eq!(controller.camera().position(), Vec3::ZERO);
}

#[test]
fn test_forward_movement_scales_with_time_step() {
    let mut controller = controller();
    let input = ControllerInput { mouse_held: true, movement: Vec3::Z, ..Default::default() };

    assert!(controller.on_update(TimeStep::from_milliseconds(100.0), &input));
    // 10 * 0.001 * 100 along -Z
    let position = controller.camera().position();
    assert!((position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    assert_eq!(controller.camera().direction(), Vec3::NEG_Z);
}

#[test]
fn test_mouse_delta_rotates_direction() {
    let mut controller = controller();
    let hold = |x: f32| ControllerInput {
        mouse_position: Vec2::new(x, 0.0),
        mouse_held: true,
        movement: Vec3::ZERO,
    };

    // First held tick only records the position delta from the origin
    controller.on_update(TimeStep::from_milliseconds(16.0), &hold(0.0));
    assert!(controller.on_update(TimeStep::from_milliseconds(16.0), &hold(100.0)));

    let direction = controller.camera().direction();
    assert!((direction.length() - 1.0).abs() < 1e-4);
    // Moving the mouse right yaws to the right (towards +X)
    assert!(direction.x > 0.0);
    assert_eq!(controller.camera().position(), Vec3::ZERO);
}
