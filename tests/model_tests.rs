//! Model Tests
//!
//! Tests for:
//! - OBJ + MTL loading, with the material texture owned by the model
//! - glTF loading from a self-contained file (base64 buffer)
//! - Skeletal animation loading, validation and CPU skinning
//! - Mesh generators, export and failure paths

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use raywrap::prelude::*;
use raywrap::sys::{self, MaterialMapIndex};
use raywrap::{AsRaw, ResourceKind};

const QUAD_OBJ: &str = "\
mtllib quad.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl red
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

const QUAD_MTL: &str = "\
newmtl red
Kd 1 0 0
map_Kd red.png
";

fn write_obj_fixture(dir: &Path) {
    fs::write(dir.join("quad.obj"), QUAD_OBJ).unwrap();
    fs::write(dir.join("quad.mtl"), QUAD_MTL).unwrap();
    image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]))
        .save(dir.join("red.png"))
        .unwrap();
}

fn push_f32s(buffer: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        buffer.extend_from_slice(&v.to_le_bytes());
    }
}

/// One skinned triangle bound to a single joint, and an animation that
/// lifts the joint from y = 0 to y = 2 over one second.
fn skinned_gltf() -> String {
    let mut buffer = Vec::new();
    // positions: offset 0, 36 bytes
    push_f32s(&mut buffer, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // joints: offset 36, 12 bytes
    buffer.extend_from_slice(&[0u8; 12]);
    // weights: offset 48, 48 bytes
    for _ in 0..3 {
        push_f32s(&mut buffer, &[1.0, 0.0, 0.0, 0.0]);
    }
    // key times: offset 96, 8 bytes
    push_f32s(&mut buffer, &[0.0, 1.0]);
    // translations: offset 104, 24 bytes
    push_f32s(&mut buffer, &[0.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
    assert_eq!(buffer.len(), 128);

    let uri = format!("data:application/octet-stream;base64,{}", STANDARD.encode(&buffer));
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0, 1] }}],
  "nodes": [
    {{ "mesh": 0, "skin": 0 }},
    {{ "name": "root" }}
  ],
  "skins": [{{ "joints": [1] }}],
  "materials": [{{ "pbrMetallicRoughness": {{ "baseColorFactor": [1.0, 0.0, 0.0, 1.0] }} }}],
  "meshes": [{{
    "primitives": [{{
      "attributes": {{ "POSITION": 0, "JOINTS_0": 1, "WEIGHTS_0": 2 }},
      "material": 0
    }}]
  }}],
  "animations": [{{
    "name": "lift",
    "samplers": [{{ "input": 3, "output": 4, "interpolation": "LINEAR" }}],
    "channels": [{{ "sampler": 0, "target": {{ "node": 1, "path": "translation" }} }}]
  }}],
  "buffers": [{{ "byteLength": 128, "uri": "{uri}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 12 }},
    {{ "buffer": 0, "byteOffset": 48, "byteLength": 48 }},
    {{ "buffer": 0, "byteOffset": 96, "byteLength": 8 }},
    {{ "buffer": 0, "byteOffset": 104, "byteLength": 24 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5121, "count": 3, "type": "VEC4" }},
    {{ "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC4" }},
    {{ "bufferView": 3, "componentType": 5126, "count": 2, "type": "SCALAR",
       "min": [0.0], "max": [1.0] }},
    {{ "bufferView": 4, "componentType": 5126, "count": 2, "type": "VEC3" }}
  ]
}}"#
    )
}

// ============================================================================
// OBJ
// ============================================================================

#[test]
fn obj_model_owns_its_material_texture() {
    let dir = tempfile::tempdir().unwrap();
    write_obj_fixture(dir.path());

    let model = Model::load(dir.path().join("quad.obj")).unwrap();
    assert_eq!(model.mesh_count(), 1);
    assert_eq!(model.material_count(), 1);
    assert_eq!(model.mesh(0).unwrap().triangle_count(), 2);

    let material = model.material(0).unwrap();
    let albedo = material.maps[MaterialMapIndex::Albedo as usize];
    assert_eq!(albedo.color, Color::new(255, 0, 0, 255));
    assert_eq!(albedo.texture.width, 2);
    assert_eq!(sys::resource_stats().live(ResourceKind::Texture), 1);

    drop(model);
    let stats = sys::resource_stats();
    assert_eq!(stats.live(ResourceKind::Texture), 0);
    assert_eq!(stats.live(ResourceKind::Mesh), 0);
    assert_eq!(stats.live(ResourceKind::Material), 0);
    assert_eq!(stats.stray_releases(), 0);
}

#[test]
fn mtl_library_loads_owned_materials() {
    let dir = tempfile::tempdir().unwrap();
    write_obj_fixture(dir.path());

    let materials = Material::load_all(dir.path().join("quad.mtl")).unwrap();
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].texture(MaterialMapIndex::Albedo).width(), 2);

    drop(materials);
    assert_eq!(sys::resource_stats().live(ResourceKind::Texture), 0);
    assert_eq!(sys::resource_stats().stray_releases(), 0);
}

#[test]
fn missing_or_broken_models_fail_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.gltf");
    fs::write(&broken, "{ not json").unwrap();

    assert!(Model::load(dir.path().join("missing.obj")).is_err());
    assert!(Model::load(&broken).is_err());
    assert!(Model::load(dir.path().join("model.iqm")).is_err());

    let stats = sys::resource_stats();
    assert_eq!(stats.live(ResourceKind::Model), 0);
    assert_eq!(stats.live(ResourceKind::Mesh), 0);
}

// ============================================================================
// glTF
// ============================================================================

#[test]
fn gltf_model_with_default_material_slot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triangle.gltf");
    fs::write(&path, skinned_gltf()).unwrap();

    let model = Model::load(&path).unwrap();
    assert_eq!(model.mesh_count(), 1);
    assert_eq!(model.material_count(), 2);
    assert_eq!(model.bones().len(), 1);
    assert_eq!(model.bones()[0].name, "root");

    let red = model.material(1).unwrap().maps[MaterialMapIndex::Albedo as usize].color;
    assert_eq!(red, Color::new(255, 0, 0, 255));
}

#[test]
fn gltf_animation_skins_the_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triangle.gltf");
    fs::write(&path, skinned_gltf()).unwrap();

    let mut model = Model::load(&path).unwrap();
    let animations = ModelAnimation::load_all(&path).unwrap();
    assert_eq!(animations.len(), 1);

    let lift = &animations[0];
    assert_eq!(lift.name(), "lift");
    assert_eq!(lift.bone_count(), 1);
    assert!(lift.frame_count() > 40);
    assert!(model.is_animation_valid(lift));

    model.update_animation(lift, 40);
    let data = model.mesh(0).unwrap().data().unwrap();
    let expected = 40.0 * 0.017 * 2.0;
    assert!((data.anim_vertices[1] - expected).abs() < 1e-3);

    drop(animations);
    assert_eq!(sys::resource_stats().live(ResourceKind::ModelAnimation), 0);
}

#[test]
fn obj_files_have_no_animations() {
    let dir = tempfile::tempdir().unwrap();
    write_obj_fixture(dir.path());
    assert!(ModelAnimation::load_all(dir.path().join("quad.obj")).is_err());
}

// ============================================================================
// Meshes
// ============================================================================

#[test]
fn generated_meshes_are_uploaded_and_bounded() {
    let cube = Mesh::gen_cube(2.0, 2.0, 2.0).unwrap();
    assert!(cube.is_uploaded());
    assert_eq!(cube.triangle_count(), 12);
    let bounds = cube.bounding_box();
    assert!((bounds.max.x - 1.0).abs() < 1e-6);
    assert!((bounds.min.y + 1.0).abs() < 1e-6);
}

#[test]
fn heightmap_mesh_from_image() {
    let heights = Image::gen_gradient_linear(8, 8, 0, Color::BLACK, Color::WHITE).unwrap();
    let terrain = Mesh::gen_heightmap(&heights, Vector3::new(4.0, 1.0, 4.0)).unwrap();
    assert!(terrain.vertex_count() > 0);
    assert!(terrain.bounding_box().max.y <= 1.0 + 1e-6);
}

#[test]
fn mesh_export_writes_obj() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("poly.obj");
    let mesh = Mesh::gen_poly(6, 1.0).unwrap();
    mesh.export(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.lines().any(|l| l.starts_with("v ")));
    assert!(text.lines().any(|l| l.starts_with("f ")));

    let model = Model::load(&path).unwrap();
    assert_eq!(model.mesh(0).unwrap().triangle_count(), mesh.triangle_count());
}

#[test]
fn model_mesh_views_do_not_release() {
    let model = Model::from_mesh(Mesh::gen_sphere(1.0, 8, 8).unwrap()).unwrap();
    let views: Vec<_> = model.meshes().collect();
    assert_eq!(views.len(), 1);
    assert!(views[0].as_raw().vertex_count > 0);
    drop(views);
    assert_eq!(sys::resource_stats().live(ResourceKind::Mesh), 1);
}
