//! Models and skeletal animations.
//!
//! File formats are parsed into a [`SceneSource`] first; nothing is
//! allocated until the whole file parsed, so a failed load leaves no
//! partial resources behind.

use std::path::Path;

use crate::math::{BoundingBox, Color, Matrix, Transform, Vector3};
use crate::sys::context::{with_core, ResourceKind};
use crate::sys::files::{get_file_extension, load_file_data};
use crate::sys::material::{load_material_default, load_material_source, MaterialSource};
use crate::sys::mesh::{
    draw_mesh, get_mesh_bounding_box, is_mesh_ready, load_mesh_data, unload_mesh, upload_mesh,
};
use crate::sys::trace::{trace_info, trace_warn};
use crate::sys::types::{BoneInfo, MeshData, RawMaterial, RawMesh, RawModel, RawModelAnimation};

/// Parsed model file.
#[derive(Debug, Clone, Default)]
pub(crate) struct SceneSource {
    pub meshes: Vec<MeshData>,
    pub mesh_material: Vec<usize>,
    /// Empty means "one default material".
    pub materials: Vec<MaterialSource>,
    pub bones: Vec<BoneInfo>,
    pub bind_pose: Vec<Transform>,
}

fn alloc_model(
    meshes: Vec<RawMesh>,
    materials: Vec<RawMaterial>,
    mesh_material: Vec<usize>,
    bones: Vec<BoneInfo>,
    bind_pose: Vec<Transform>,
) -> RawModel {
    let id = with_core(|core| {
        let id = core.alloc_id();
        core.models.insert(id);
        core.track_load(ResourceKind::Model);
        id
    });
    RawModel {
        id,
        transform: Matrix::IDENTITY,
        meshes,
        materials,
        mesh_material,
        bones,
        bind_pose,
    }
}

fn build_model(source: SceneSource) -> RawModel {
    let meshes: Vec<RawMesh> = source
        .meshes
        .into_iter()
        .map(|data| {
            let mut mesh = load_mesh_data(data);
            upload_mesh(&mut mesh, false);
            mesh
        })
        .collect();

    let materials: Vec<RawMaterial> = if source.materials.is_empty() {
        vec![load_material_default()]
    } else {
        source.materials.iter().map(load_material_source).collect()
    };
    let last = materials.len() - 1;
    let mesh_material = source
        .mesh_material
        .into_iter()
        .map(|m| {
            if m > last {
                trace_warn!("MODEL: Mesh material index {m} out of range, using 0");
                0
            } else {
                m
            }
        })
        .collect();

    alloc_model(meshes, materials, mesh_material, source.bones, source.bind_pose)
}

fn parse_obj_scene(bytes: &[u8], base_dir: &Path) -> Option<SceneSource> {
    let scene = crate::sys::obj::parse_obj(bytes, base_dir)?;
    if scene.meshes.is_empty() {
        trace_warn!("MODEL: OBJ data contains no meshes");
        return None;
    }
    let materials: Vec<MaterialSource> = scene
        .materials
        .iter()
        .map(|m| MaterialSource::from_mtl(m, base_dir))
        .collect();
    let (meshes, mesh_material) = scene
        .meshes
        .into_iter()
        .map(|(data, material)| (data, material.unwrap_or(0)))
        .unzip();
    Some(SceneSource {
        meshes,
        mesh_material,
        materials,
        ..SceneSource::default()
    })
}

fn parse_scene(path: &Path) -> Option<SceneSource> {
    let bytes = load_file_data(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    match get_file_extension(path).as_deref() {
        Some(".obj") => parse_obj_scene(&bytes, base_dir),
        #[cfg(feature = "gltf")]
        Some(".gltf" | ".glb") => crate::sys::gltf::parse_gltf(&bytes, base_dir),
        _ => {
            trace_warn!("MODEL: [{}] Unsupported model file format", path.display());
            None
        }
    }
}

/// Loads meshes and materials from an OBJ or glTF file.
pub fn load_model(path: impl AsRef<Path>) -> RawModel {
    let path = path.as_ref();
    let Some(source) = parse_scene(path) else {
        trace_warn!("MODEL: [{}] Failed to load model", path.display());
        return RawModel::default();
    };
    let model = build_model(source);
    trace_info!(
        "MODEL: [{}] Model loaded successfully ({} meshes, {} materials)",
        path.display(),
        model.meshes.len(),
        model.materials.len()
    );
    model
}

/// Wraps one mesh in a model with a default material. The mesh moves into
/// the model; it is uploaded first if needed.
pub fn load_model_from_mesh(mut mesh: RawMesh) -> RawModel {
    if mesh.vao_id == 0 && mesh.data != 0 {
        upload_mesh(&mut mesh, false);
    }
    alloc_model(vec![mesh], vec![load_material_default()], vec![0], Vec::new(), Vec::new())
}

#[must_use]
pub fn is_model_ready(model: &RawModel) -> bool {
    model.id != 0
        && !model.meshes.is_empty()
        && !model.materials.is_empty()
        && with_core(|core| core.models.contains(&model.id))
        && model
            .meshes
            .iter()
            .all(|&mesh| mesh.vao_id != 0 && is_mesh_ready(mesh))
}

/// Frees every mesh and the material array.
///
/// Shaders and textures referenced by the materials are left alone; they
/// belong to whoever loaded them.
pub fn unload_model(model: RawModel) {
    if model.id == 0 {
        return;
    }
    let known = with_core(|core| {
        let known = core.models.remove(&model.id);
        if known {
            for material in &model.materials {
                if core.material_blocks.remove(&material.id) {
                    core.track_unload(ResourceKind::Material);
                }
            }
            core.track_unload(ResourceKind::Model);
        } else {
            core.track_stray();
        }
        known
    });
    if !known {
        trace_warn!("MODEL: [ID {}] Unload of unknown model", model.id);
        return;
    }

    for mesh in model.meshes {
        unload_mesh(mesh);
    }
    trace_info!("MODEL: Unloaded model (and meshes) from RAM and VRAM");
}

#[must_use]
pub fn get_model_bounding_box(model: &RawModel) -> BoundingBox {
    model
        .meshes
        .iter()
        .map(|&mesh| get_mesh_bounding_box(mesh))
        .reduce(|a, b| a.merge(&b))
        .unwrap_or_default()
}

/// Points mesh `mesh_id` at material `material_id`.
pub fn set_model_mesh_material(model: &mut RawModel, mesh_id: usize, material_id: usize) {
    if mesh_id >= model.meshes.len() {
        trace_warn!("MESH: Id greater than mesh count");
    } else if material_id >= model.materials.len() {
        trace_warn!("MATERIAL: Id greater than material count");
    } else {
        model.mesh_material[mesh_id] = material_id;
    }
}

// ============================================================================
// Drawing
// ============================================================================

pub fn draw_model(model: &RawModel, position: Vector3, scale: f32, tint: Color) {
    draw_model_ex(
        model,
        position,
        Vector3::UP,
        0.0,
        Vector3::new(scale, scale, scale),
        tint,
    );
}

/// Draws every mesh with its material, transformed by scale, rotation
/// (degrees around `axis`), translation and the model's own transform.
pub fn draw_model_ex(
    model: &RawModel,
    position: Vector3,
    axis: Vector3,
    angle: f32,
    scale: Vector3,
    tint: Color,
) {
    let transform = Matrix::scale(scale.x, scale.y, scale.z)
        .multiply(Matrix::rotate(axis, angle.to_radians()))
        .multiply(Matrix::translate(position.x, position.y, position.z));
    let world = model.transform.multiply(transform);

    for (i, &mesh) in model.meshes.iter().enumerate() {
        let Some(material) = model
            .mesh_material
            .get(i)
            .and_then(|&m| model.materials.get(m))
        else {
            continue;
        };
        let mut material = *material;
        let albedo = &mut material.maps[0].color;
        *albedo = albedo.tint(tint);
        draw_mesh(mesh, &material, world);
    }
}

pub fn draw_model_wires(model: &RawModel, position: Vector3, scale: f32, tint: Color) {
    draw_model(model, position, scale, tint);
}

// ============================================================================
// Animations
// ============================================================================

pub(crate) fn alloc_animation(
    name: String,
    bones: Vec<BoneInfo>,
    frame_poses: Vec<Vec<Transform>>,
) -> RawModelAnimation {
    let id = with_core(|core| {
        let id = core.alloc_id();
        core.animations.insert(id);
        core.track_load(ResourceKind::ModelAnimation);
        id
    });
    RawModelAnimation {
        id,
        name,
        bones,
        frame_poses,
    }
}

/// Loads every animation of a glTF file.
pub fn load_model_animations(path: impl AsRef<Path>) -> Vec<RawModelAnimation> {
    let path = path.as_ref();
    let Some(bytes) = load_file_data(path) else {
        return Vec::new();
    };
    match get_file_extension(path).as_deref() {
        #[cfg(feature = "gltf")]
        Some(".gltf" | ".glb") => {
            let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
            let animations: Vec<RawModelAnimation> =
                crate::sys::gltf::parse_gltf_animations(&bytes, base_dir)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|a| alloc_animation(a.name, a.bones, a.frame_poses))
                    .collect();
            trace_info!(
                "MODEL: [{}] {} animations loaded",
                path.display(),
                animations.len()
            );
            animations
        }
        _ => {
            trace_warn!("MODEL: [{}] Format has no animation support", path.display());
            Vec::new()
        }
    }
}

/// Same bone count and hierarchy.
#[must_use]
pub fn is_model_animation_valid(model: &RawModel, anim: &RawModelAnimation) -> bool {
    model.bones.len() == anim.bones.len()
        && model
            .bones
            .iter()
            .zip(&anim.bones)
            .all(|(a, b)| a.parent == b.parent)
}

/// Skins every mesh on the CPU to `frame` (wrapped to the frame count).
///
/// Results land in each mesh's `anim_vertices`/`anim_normals`.
pub fn update_model_animation(model: &RawModel, anim: &RawModelAnimation, frame: i32) {
    if anim.frame_poses.is_empty() || model.bind_pose.is_empty() {
        return;
    }
    if !is_model_animation_valid(model, anim) {
        trace_warn!("ANIM: [{}] Animation does not match the model skeleton", anim.name);
        return;
    }

    let frame = frame.rem_euclid(anim.frame_poses.len() as i32) as usize;
    let skin: Vec<glam::Mat4> = anim.frame_poses[frame]
        .iter()
        .zip(&model.bind_pose)
        .map(|(pose, bind)| pose.to_matrix().to_glam() * bind.to_matrix().to_glam().inverse())
        .collect();

    with_core(|core| {
        for mesh in &model.meshes {
            let Some(data) = core.mesh_data.get_mut(&mesh.data) else {
                continue;
            };
            if data.bone_ids.is_empty() || data.bone_weights.is_empty() {
                continue;
            }
            skin_mesh(data, &skin);
        }
    });
}

fn skin_mesh(data: &mut MeshData, skin: &[glam::Mat4]) {
    let count = data.vertex_count();
    let has_normals = data.normals.len() == count * 3;
    data.anim_vertices.resize(count * 3, 0.0);
    if has_normals {
        data.anim_normals.resize(count * 3, 0.0);
    }

    for v in 0..count {
        let position = glam::Vec3::from_slice(&data.vertices[v * 3..v * 3 + 3]);
        let normal = has_normals.then(|| glam::Vec3::from_slice(&data.normals[v * 3..v * 3 + 3]));
        let mut skinned = glam::Vec3::ZERO;
        let mut skinned_normal = glam::Vec3::ZERO;
        let mut total = 0.0;

        for k in 0..4 {
            let weight = data.bone_weights.get(v * 4 + k).copied().unwrap_or(0.0);
            let bone = data.bone_ids.get(v * 4 + k).copied().map(usize::from);
            let Some(matrix) = bone.and_then(|b| skin.get(b)).filter(|_| weight > 0.0) else {
                continue;
            };
            skinned += matrix.transform_point3(position) * weight;
            if let Some(n) = normal {
                skinned_normal += matrix.transform_vector3(n) * weight;
            }
            total += weight;
        }

        let (p, n) = if total > 0.0 {
            (skinned / total, skinned_normal.normalize_or_zero())
        } else {
            (position, normal.unwrap_or_default())
        };
        data.anim_vertices[v * 3..v * 3 + 3].copy_from_slice(&p.to_array());
        if has_normals {
            data.anim_normals[v * 3..v * 3 + 3].copy_from_slice(&n.to_array());
        }
    }
}

pub fn unload_model_animation(anim: RawModelAnimation) {
    if anim.id == 0 {
        return;
    }
    let known = with_core(|core| {
        let known = core.animations.remove(&anim.id);
        if known {
            core.track_unload(ResourceKind::ModelAnimation);
        } else {
            core.track_stray();
        }
        known
    });
    if !known {
        trace_warn!("ANIM: [{}] Unload of unknown animation", anim.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quaternion;
    use crate::sys::context::resource_stats;
    use crate::sys::mesh::{gen_mesh_cube, get_mesh_data};

    #[test]
    fn model_from_mesh_owns_the_mesh() {
        let model = load_model_from_mesh(gen_mesh_cube(1.0, 1.0, 1.0));
        assert!(is_model_ready(&model));
        assert_eq!(model.mesh_material, vec![0]);

        unload_model(model.clone());
        let stats = resource_stats();
        assert_eq!(stats.live(ResourceKind::Mesh), 0);
        assert_eq!(stats.live(ResourceKind::Material), 0);
        assert_eq!(stats.live(ResourceKind::Model), 0);

        unload_model(model);
        assert_eq!(resource_stats().stray_releases(), 1);
    }

    #[test]
    fn missing_file_is_not_ready() {
        let model = load_model("definitely/not/here.obj");
        assert!(!is_model_ready(&model));
        assert_eq!(resource_stats().loaded(ResourceKind::Mesh), 0);
    }

    #[test]
    fn mesh_material_bounds_are_checked() {
        let mut model = load_model_from_mesh(gen_mesh_cube(1.0, 1.0, 1.0));
        set_model_mesh_material(&mut model, 0, 3);
        set_model_mesh_material(&mut model, 2, 0);
        assert_eq!(model.mesh_material, vec![0]);
        unload_model(model);
    }

    #[test]
    fn skinning_follows_the_bone() {
        let mut data = crate::sys::primitives::create_cube(1.0, 1.0, 1.0);
        let count = data.vertex_count();
        data.bone_ids = vec![0; count * 4];
        data.bone_weights = (0..count).flat_map(|_| [1.0, 0.0, 0.0, 0.0]).collect();
        let mut mesh = load_mesh_data(data);
        upload_mesh(&mut mesh, false);

        let mut model = load_model_from_mesh(mesh);
        model.bones = vec![BoneInfo { name: "root".into(), parent: -1 }];
        model.bind_pose = vec![Transform::default()];

        let moved = Transform {
            translation: Vector3::new(0.0, 2.0, 0.0),
            rotation: Quaternion::IDENTITY,
            scale: Vector3::ONE,
        };
        let anim = alloc_animation(
            "lift".into(),
            model.bones.clone(),
            vec![vec![Transform::default()], vec![moved]],
        );
        assert!(is_model_animation_valid(&model, &anim));

        update_model_animation(&model, &anim, 3);
        let skinned = get_mesh_data(model.meshes[0]).expect("mesh data");
        for (a, b) in skinned.anim_vertices.chunks_exact(3).zip(skinned.vertices.chunks_exact(3)) {
            assert!((a[1] - b[1] - 2.0).abs() < 1e-5);
        }

        unload_model_animation(anim.clone());
        unload_model_animation(anim);
        unload_model(model);
        assert_eq!(resource_stats().stray_releases(), 1);
    }
}
