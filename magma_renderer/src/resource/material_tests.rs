use super::*;
use crate::graphics_device::mock_graphics_device::mock_texture;

#[test]
fn test_from_color_is_untextured() {
    let material = Material::from_color(Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert!(!material.is_textured());
    assert_eq!(material.diffuse_color, Vec4::new(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn test_bind_sets_every_slot() {
    let material = Material {
        diffuse: Some(mock_texture("albedo")),
        specular: Some(mock_texture("spec")),
        emissive: None,
        ..Material::default()
    };
    let mut uniforms = UniformData::new();
    material.bind(&mut uniforms);

    assert_eq!(uniforms.get_bool("u_Material.IsTextured"), Some(true));
    assert_eq!(uniforms.texture("u_Material.Diffuse").unwrap().slot, 0);
    assert_eq!(uniforms.texture("u_Material.Specular").unwrap().slot, 1);
    assert!(uniforms.texture("u_Material.Emissive").is_none());
    assert_eq!(uniforms.get_vec4("u_Material.DiffuseColor"), Some(Vec4::ONE));
    assert_eq!(uniforms.get_vec4("u_Material.EmissiveColor"), Some(Vec4::ZERO));
}

#[test]
fn test_bind_diffuse_skips_specular_and_emissive() {
    let material = Material::from_texture(mock_texture("albedo"), Vec4::ONE);
    let mut uniforms = UniformData::new();
    material.bind_diffuse(&mut uniforms);

    assert!(uniforms.texture("u_Material.Diffuse").is_some());
    assert!(uniforms.get("u_Material.SpecularColor").is_none());
}
