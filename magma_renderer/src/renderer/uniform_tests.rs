use super::*;
use crate::graphics_device::mock_graphics_device::mock_texture;

#[test]
fn test_typed_getters() {
    let mut uniforms = UniformData::new();
    uniforms.set("u_Radius", 1.0f32);
    uniforms.set("u_PointLightCount", 3i32);
    uniforms.set("u_Material.IsTextured", true);
    uniforms.set("u_CameraPosition", Vec3::new(0.0, 1.0, 15.0));
    uniforms.set("u_ViewProj", Mat4::IDENTITY);

    assert_eq!(uniforms.get_float("u_Radius"), Some(1.0));
    assert_eq!(uniforms.get_int("u_PointLightCount"), Some(3));
    assert_eq!(uniforms.get_bool("u_Material.IsTextured"), Some(true));
    assert_eq!(uniforms.get_vec3("u_CameraPosition"), Some(Vec3::new(0.0, 1.0, 15.0)));
    assert_eq!(uniforms.get_mat4("u_ViewProj"), Some(Mat4::IDENTITY));

    // Wrong type or missing name
    assert_eq!(uniforms.get_int("u_Radius"), None);
    assert_eq!(uniforms.get_float("u_Missing"), None);
}

#[test]
fn test_set_overwrites_value() {
    let mut uniforms = UniformData::new();
    uniforms.set("u_Exposure", 1.0f32);
    uniforms.set("u_Exposure", 2.0f32);
    assert_eq!(uniforms.get_float("u_Exposure"), Some(2.0));
}

#[test]
fn test_is_empty_considers_every_table() {
    let mut uniforms = UniformData::new();
    assert!(uniforms.is_empty());

    uniforms.set_texture("u_ScreenTexture", 0, mock_texture("screen"));
    assert!(!uniforms.is_empty());
    assert_eq!(uniforms.texture("u_ScreenTexture").unwrap().slot, 0);
}

#[test]
fn test_inherit_keeps_existing_entries() {
    let mut sticky = UniformData::new();
    sticky.set("u_TimeStep", 16.0f32);
    sticky.set("u_Exposure", 1.0f32);

    let mut uniforms = UniformData::new();
    uniforms.set("u_Exposure", 3.0f32);
    uniforms.inherit(&sticky);

    assert_eq!(uniforms.get_float("u_TimeStep"), Some(16.0));
    assert_eq!(uniforms.get_float("u_Exposure"), Some(3.0));
}

#[test]
fn test_merge_overwrites_entries() {
    let mut sticky = UniformData::new();
    sticky.set("u_Exposure", 1.0f32);

    let mut popped = UniformData::new();
    popped.set("u_Exposure", 3.0f32);
    popped.set_cubemap("u_Skybox", 0, mock_texture("sky"));

    sticky.merge(&popped);
    assert_eq!(sticky.get_float("u_Exposure"), Some(3.0));
    assert!(sticky.cubemap("u_Skybox").is_some());
}
