//! glTF 2.0 models and animations.
//!
//! Buffers may live in the GLB binary chunk, in base64 `data:` URIs or in
//! files next to the model (read through the file-data callback). Meshes of
//! non-skinned nodes are baked into model space; animations are resampled
//! at a fixed rate into model-space bone poses.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::math::{Color, Transform, Vector3, Vector4};
use crate::sys::files::load_file_data;
use crate::sys::material::{MaterialSource, TextureSource};
use crate::sys::model::SceneSource;
use crate::sys::trace::trace_warn;
use crate::sys::types::{BoneInfo, MaterialMapIndex, MeshData};

/// Sampling step of animations, in seconds.
const ANIMATION_STEP: f32 = 0.017;

/// Animation resampled into per-frame model-space poses.
pub(crate) struct AnimationSource {
    pub name: String,
    pub bones: Vec<BoneInfo>,
    pub frame_poses: Vec<Vec<Transform>>,
}

fn decode_data_uri(uri: &str) -> Option<(&str, Vec<u8>)> {
    let (header, payload) = uri.strip_prefix("data:")?.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    STANDARD.decode(payload).ok().map(|bytes| (mime, bytes))
}

fn mime_extension(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => ".jpg",
        "image/bmp" => ".bmp",
        _ => ".png",
    }
}

fn open(bytes: &[u8], base_dir: &Path) -> Option<(gltf::Gltf, Vec<Vec<u8>>)> {
    let gltf = match gltf::Gltf::from_slice(bytes) {
        Ok(gltf) => gltf,
        Err(err) => {
            trace_warn!("MODEL: Failed to parse glTF data: {err}");
            return None;
        }
    };

    let mut buffers = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf.blob.clone(),
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                decode_data_uri(uri).map(|(_, bytes)| bytes)
            }
            gltf::buffer::Source::Uri(uri) => load_file_data(base_dir.join(uri)),
        };
        let Some(data) = data.filter(|d| d.len() >= buffer.length()) else {
            trace_warn!("MODEL: glTF buffer {} could not be loaded", buffer.index());
            return None;
        };
        buffers.push(data);
    }
    Some((gltf, buffers))
}

/// Parent node index of every node that has one.
fn parent_map(gltf: &gltf::Gltf) -> FxHashMap<usize, usize> {
    gltf.nodes()
        .flat_map(|node| node.children().map(move |child| (child.index(), node.index())))
        .collect()
}

fn local_matrix(node: &gltf::Node) -> Mat4 {
    Mat4::from_cols_array_2d(&node.transform().matrix())
}

fn to_transform(m: Mat4) -> Transform {
    let (scale, rotation, translation) = m.to_scale_rotation_translation();
    Transform {
        translation: Vector3::from(translation),
        rotation: Vector4::from_quat(rotation),
        scale: Vector3::from(scale),
    }
}

// ============================================================================
// Materials
// ============================================================================

fn texture_source(
    image: &gltf::Image,
    buffers: &[Vec<u8>],
    base_dir: &Path,
) -> Option<TextureSource> {
    match image.source() {
        gltf::image::Source::View { view, mime_type } => {
            let start = view.offset();
            let bytes = buffers.get(view.buffer().index())?.get(start..start + view.length())?;
            Some(TextureSource::Encoded {
                file_type: mime_extension(mime_type).to_owned(),
                bytes: bytes.to_vec(),
            })
        }
        gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => {
            let (mime, bytes) = decode_data_uri(uri)?;
            Some(TextureSource::Encoded {
                file_type: mime_extension(mime).to_owned(),
                bytes,
            })
        }
        gltf::image::Source::Uri { uri, .. } => Some(TextureSource::File(base_dir.join(uri))),
    }
}

fn material_source(
    material: &gltf::Material,
    buffers: &[Vec<u8>],
    base_dir: &Path,
) -> MaterialSource {
    let pbr = material.pbr_metallic_roughness();
    let mut source = MaterialSource {
        name: material.name().unwrap_or("material").to_owned(),
        ..MaterialSource::default()
    };

    source.colors.push((
        MaterialMapIndex::Albedo,
        Color::from_normalized(Vector4::from(glam::Vec4::from_array(pbr.base_color_factor()))),
    ));
    let [r, g, b] = material.emissive_factor();
    source.colors.push((
        MaterialMapIndex::Emission,
        Color::from_normalized(Vector4::new(r, g, b, 1.0)),
    ));
    source.values.push((MaterialMapIndex::Metalness, pbr.metallic_factor()));
    source.values.push((MaterialMapIndex::Roughness, pbr.roughness_factor()));

    let mut push = |index: MaterialMapIndex, texture: Option<gltf::Texture>| {
        if let Some(texture) = texture.and_then(|t| texture_source(&t.source(), buffers, base_dir)) {
            source.textures.push((index, texture));
        }
    };
    push(MaterialMapIndex::Albedo, pbr.base_color_texture().map(|i| i.texture()));
    push(MaterialMapIndex::Metalness, pbr.metallic_roughness_texture().map(|i| i.texture()));
    push(MaterialMapIndex::Normal, material.normal_texture().map(|t| t.texture()));
    push(MaterialMapIndex::Occlusion, material.occlusion_texture().map(|t| t.texture()));
    push(MaterialMapIndex::Emission, material.emissive_texture().map(|i| i.texture()));
    source
}

// ============================================================================
// Meshes
// ============================================================================

fn primitive_data(
    primitive: &gltf::Primitive,
    buffers: &[Vec<u8>],
    world: Option<Mat4>,
) -> Option<MeshData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normal_matrix = world.map(|m| m.inverse().transpose());

    let mut data = MeshData {
        vertices: positions
            .iter()
            .flat_map(|&p| match world {
                Some(m) => m.transform_point3(Vec3::from_array(p)).to_array(),
                None => p,
            })
            .collect(),
        ..MeshData::default()
    };

    if let Some(normals) = reader.read_normals() {
        data.normals = normals
            .flat_map(|n| match normal_matrix {
                Some(m) => m.transform_vector3(Vec3::from_array(n)).normalize_or_zero().to_array(),
                None => n,
            })
            .collect();
    }
    if let Some(tangents) = reader.read_tangents() {
        data.tangents = tangents.flatten().collect();
    }
    if let Some(uvs) = reader.read_tex_coords(0) {
        data.texcoords = uvs.into_f32().flatten().collect();
    }
    if let Some(uvs) = reader.read_tex_coords(1) {
        data.texcoords2 = uvs.into_f32().flatten().collect();
    }
    if let Some(colors) = reader.read_colors(0) {
        data.colors = colors.into_rgba_u8().flatten().collect();
    }
    if let Some(joints) = reader.read_joints(0) {
        data.bone_ids = joints
            .into_u16()
            .flatten()
            .map(|j| u8::try_from(j).unwrap_or(0))
            .collect();
    }
    if let Some(weights) = reader.read_weights(0) {
        data.bone_weights = weights.into_f32().flatten().collect();
    }
    if !data.bone_ids.is_empty() {
        data.anim_vertices = data.vertices.clone();
        data.anim_normals = data.normals.clone();
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    data.set_indices(&indices);
    Some(data)
}

fn collect_meshes(
    node: gltf::Node,
    parent: Mat4,
    buffers: &[Vec<u8>],
    scene: &mut SceneSource,
) {
    let world = parent * local_matrix(&node);
    if let Some(mesh) = node.mesh() {
        // Skinned vertices stay in bind space; the skeleton moves them.
        let bake = node.skin().is_none().then_some(world);
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            if let Some(data) = primitive_data(&primitive, buffers, bake) {
                scene.meshes.push(data);
                scene
                    .mesh_material
                    .push(primitive.material().index().map_or(0, |i| i + 1));
            }
        }
    }
    for child in node.children() {
        collect_meshes(child, world, buffers, scene);
    }
}

fn root_nodes(gltf: &gltf::Gltf) -> Vec<gltf::Node<'_>> {
    match gltf.default_scene().or_else(|| gltf.scenes().next()) {
        Some(scene) => scene.nodes().collect(),
        None => {
            let parents = parent_map(gltf);
            gltf.nodes().filter(|n| !parents.contains_key(&n.index())).collect()
        }
    }
}

// ============================================================================
// Skeleton
// ============================================================================

struct Skeleton {
    joints: Vec<usize>,
    bones: Vec<BoneInfo>,
    inverse_bind: Vec<Mat4>,
}

fn skeleton(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Option<Skeleton> {
    let skin = gltf.skins().next()?;
    let joints: Vec<usize> = skin.joints().map(|n| n.index()).collect();
    let parents = parent_map(gltf);

    let bones = skin
        .joints()
        .enumerate()
        .map(|(i, node)| BoneInfo {
            name: node.name().map_or_else(|| format!("BONE_{i}"), str::to_owned),
            parent: parents
                .get(&node.index())
                .and_then(|p| joints.iter().position(|j| j == p))
                .map_or(-1, |p| p as i32),
        })
        .collect();

    let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let inverse_bind = match reader.read_inverse_bind_matrices() {
        Some(matrices) => matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
        None => vec![Mat4::IDENTITY; joints.len()],
    };

    Some(Skeleton {
        joints,
        bones,
        inverse_bind,
    })
}

/// Parses meshes, materials and the first skin. Material 0 is a default
/// material; glTF material `i` lands at `i + 1`.
pub(crate) fn parse_gltf(bytes: &[u8], base_dir: &Path) -> Option<SceneSource> {
    let (gltf, buffers) = open(bytes, base_dir)?;

    let mut scene = SceneSource::default();
    scene.materials.push(MaterialSource::default());
    scene
        .materials
        .extend(gltf.materials().map(|m| material_source(&m, &buffers, base_dir)));

    for node in root_nodes(&gltf) {
        collect_meshes(node, Mat4::IDENTITY, &buffers, &mut scene);
    }
    if scene.meshes.is_empty() {
        trace_warn!("MODEL: glTF data contains no triangle meshes");
        return None;
    }

    if let Some(skeleton) = skeleton(&gltf, &buffers) {
        scene.bind_pose = skeleton
            .inverse_bind
            .iter()
            .map(|ibm| to_transform(ibm.inverse()))
            .collect();
        scene.bones = skeleton.bones;
    }
    Some(scene)
}

// ============================================================================
// Animations
// ============================================================================

#[derive(Clone, Copy)]
struct Trs {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Trs {
    fn matrix(self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

enum Keys {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

struct Channel {
    bone: usize,
    step: bool,
    times: Vec<f32>,
    keys: Keys,
}

impl Channel {
    /// Key pair around `t` and the blend factor between them.
    fn locate(&self, t: f32) -> (usize, usize, f32) {
        let last = self.times.len() - 1;
        match self.times.iter().position(|&k| k > t) {
            None => (last, last, 0.0),
            Some(0) => (0, 0, 0.0),
            Some(next) => {
                let prev = next - 1;
                let span = self.times[next] - self.times[prev];
                let f = if self.step || span <= 0.0 {
                    0.0
                } else {
                    (t - self.times[prev]) / span
                };
                (prev, next, f)
            }
        }
    }

    fn apply(&self, t: f32, pose: &mut Trs) {
        let (a, b, f) = self.locate(t);
        match &self.keys {
            Keys::Translation(v) => pose.translation = v[a].lerp(v[b], f),
            Keys::Rotation(q) => pose.rotation = q[a].slerp(q[b], f),
            Keys::Scale(v) => pose.scale = v[a].lerp(v[b], f),
        }
    }
}

fn read_channel(
    channel: &gltf::animation::Channel,
    buffers: &[Vec<u8>],
    joints: &[usize],
) -> Option<Channel> {
    use gltf::animation::util::ReadOutputs;
    use gltf::animation::Interpolation;

    let bone = joints.iter().position(|&j| j == channel.target().node().index())?;
    let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let times: Vec<f32> = reader.read_inputs()?.collect();
    let interpolation = channel.sampler().interpolation();
    let cubic = interpolation == Interpolation::CubicSpline;

    // Cubic spline outputs come as (in-tangent, value, out-tangent) triples.
    fn values<T>(all: impl Iterator<Item = T>, cubic: bool) -> Vec<T> {
        if cubic {
            all.skip(1).step_by(3).collect()
        } else {
            all.collect()
        }
    }

    let keys = match reader.read_outputs()? {
        ReadOutputs::Translations(v) => Keys::Translation(values(v.map(Vec3::from_array), cubic)),
        ReadOutputs::Rotations(r) => {
            Keys::Rotation(values(r.into_f32().map(Quat::from_array), cubic))
        }
        ReadOutputs::Scales(v) => Keys::Scale(values(v.map(Vec3::from_array), cubic)),
        ReadOutputs::MorphTargetWeights(_) => return None,
    };

    let key_count = match &keys {
        Keys::Translation(v) | Keys::Scale(v) => v.len(),
        Keys::Rotation(q) => q.len(),
    };
    if times.is_empty() || key_count != times.len() {
        return None;
    }

    Some(Channel {
        bone,
        step: interpolation == Interpolation::Step,
        times,
        keys,
    })
}

/// Model-space matrix of every bone, parents resolved recursively.
fn model_space(locals: &[Trs], bones: &[BoneInfo]) -> Vec<Mat4> {
    fn resolve(
        i: usize,
        locals: &[Trs],
        bones: &[BoneInfo],
        out: &mut [Option<Mat4>],
        depth: usize,
    ) -> Mat4 {
        if let Some(m) = out[i] {
            return m;
        }
        let local = locals[i].matrix();
        // The depth bound stops malformed (cyclic) hierarchies.
        let parent = usize::try_from(bones[i].parent)
            .ok()
            .filter(|&p| p < locals.len() && depth < locals.len());
        let m = match parent {
            Some(p) => resolve(p, locals, bones, out, depth + 1) * local,
            None => local,
        };
        out[i] = Some(m);
        m
    }

    let mut out = vec![None; locals.len()];
    (0..locals.len())
        .map(|i| resolve(i, locals, bones, &mut out, 0))
        .collect()
}

pub(crate) fn parse_gltf_animations(
    bytes: &[u8],
    base_dir: &Path,
) -> Option<Vec<AnimationSource>> {
    let (gltf, buffers) = open(bytes, base_dir)?;
    let Some(skeleton) = skeleton(&gltf, &buffers) else {
        trace_warn!("MODEL: glTF data has no skin to animate");
        return None;
    };

    let rest: Vec<Trs> = skeleton
        .joints
        .iter()
        .filter_map(|&j| gltf.nodes().nth(j))
        .map(|node| {
            let (t, r, s) = node.transform().decomposed();
            Trs {
                translation: Vec3::from_array(t),
                rotation: Quat::from_array(r),
                scale: Vec3::from_array(s),
            }
        })
        .collect();
    if rest.len() != skeleton.joints.len() {
        return None;
    }

    let animations = gltf
        .animations()
        .enumerate()
        .map(|(index, animation)| {
            let channels: Vec<Channel> = animation
                .channels()
                .filter_map(|c| read_channel(&c, &buffers, &skeleton.joints))
                .collect();
            let duration = channels
                .iter()
                .filter_map(|c| c.times.last().copied())
                .fold(0.0f32, f32::max);
            let frame_count = (duration / ANIMATION_STEP) as usize + 1;

            let frame_poses = (0..frame_count)
                .map(|frame| {
                    let t = frame as f32 * ANIMATION_STEP;
                    let mut locals = rest.clone();
                    for channel in &channels {
                        channel.apply(t, &mut locals[channel.bone]);
                    }
                    model_space(&locals, &skeleton.bones)
                        .into_iter()
                        .map(to_transform)
                        .collect()
                })
                .collect();

            AnimationSource {
                name: animation
                    .name()
                    .map_or_else(|| format!("animation_{index}"), str::to_owned),
                bones: skeleton.bones.clone(),
                frame_poses,
            }
        })
        .collect();
    Some(animations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_decodes() {
        let (mime, bytes) =
            decode_data_uri("data:application/octet-stream;base64,AAEC").expect("uri");
        assert_eq!(mime, "application/octet-stream");
        assert_eq!(bytes, vec![0, 1, 2]);
        assert!(decode_data_uri("buffer.bin").is_none());
    }

    #[test]
    fn channel_interpolates_between_keys() {
        let channel = Channel {
            bone: 0,
            step: false,
            times: vec![0.0, 1.0],
            keys: Keys::Translation(vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)]),
        };
        let mut pose = Trs {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        };
        channel.apply(0.5, &mut pose);
        assert!((pose.translation.x - 1.0).abs() < 1e-6);
        channel.apply(5.0, &mut pose);
        assert!((pose.translation.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn broken_json_is_rejected() {
        assert!(parse_gltf(b"{ not json", Path::new(".")).is_none());
    }
}
