//! Meshes: CPU attribute blocks plus vertex arrays.
//!
//! Vertex buffer slots follow the usual layout: 0 positions, 1 texcoords,
//! 2 normals, 3 colors, 4 tangents, 5 second texcoords, 6 indices.

use std::path::Path;

use crate::math::{BoundingBox, Matrix, Vector3};
use crate::sys::context::{with_core, ResourceKind, VertexArray};
use crate::sys::image::load_image_colors;
use crate::sys::primitives;
use crate::sys::trace::{trace_info, trace_warn};
use crate::sys::types::{MeshData, RawImage, RawMaterial, RawMesh, MAX_MESH_VERTEX_BUFFERS};
use crate::sys::window::count_draw_call;

const BUFFER_POSITIONS: usize = 0;
const BUFFER_TEXCOORDS: usize = 1;
const BUFFER_NORMALS: usize = 2;
const BUFFER_COLORS: usize = 3;
const BUFFER_TANGENTS: usize = 4;
const BUFFER_TEXCOORDS2: usize = 5;
const BUFFER_INDICES: usize = 6;

fn counts(data: &MeshData) -> (i32, i32) {
    (data.vertex_count() as i32, data.triangle_count() as i32)
}

/// Registers CPU mesh data. The mesh is not uploaded.
pub fn load_mesh_data(data: MeshData) -> RawMesh {
    let (vertex_count, triangle_count) = counts(&data);
    with_core(|core| {
        let id = core.alloc_id();
        core.mesh_data.insert(id, data);
        core.track_load(ResourceKind::Mesh);
        RawMesh {
            vertex_count,
            triangle_count,
            data: id,
            vao_id: 0,
            vbo_id: [0; MAX_MESH_VERTEX_BUFFERS],
        }
    })
}

/// Copy of the CPU attributes.
#[must_use]
pub fn get_mesh_data(mesh: RawMesh) -> Option<MeshData> {
    with_core(|core| core.mesh_data.get(&mesh.data).cloned())
}

#[must_use]
pub fn is_mesh_ready(mesh: RawMesh) -> bool {
    mesh.data != 0 && mesh.vertex_count > 0 && with_core(|core| core.mesh_data.contains_key(&mesh.data))
}

/// Creates the vertex array and one buffer per present attribute.
pub fn upload_mesh(mesh: &mut RawMesh, dynamic: bool) {
    if mesh.vao_id != 0 {
        trace_warn!("VAO: [ID {}] Trying to re-load an already loaded mesh", mesh.vao_id);
        return;
    }

    let uploaded = with_core(|core| {
        let data = core.mesh_data.get(&mesh.data)?;
        let present = [
            !data.vertices.is_empty(),
            !data.texcoords.is_empty(),
            !data.normals.is_empty(),
            !data.colors.is_empty(),
            !data.tangents.is_empty(),
            !data.texcoords2.is_empty(),
            !data.indices.is_empty(),
        ];

        let vao = core.alloc_id();
        let mut vbo_id = [0; MAX_MESH_VERTEX_BUFFERS];
        for (slot, has) in present.into_iter().enumerate() {
            if has {
                let id = core.alloc_id();
                core.vertex_buffers.insert(id);
                vbo_id[slot] = id;
            }
        }
        core.vertex_arrays.insert(
            vao,
            VertexArray {
                buffers: vbo_id.iter().copied().filter(|&id| id != 0).collect(),
                dynamic,
            },
        );
        Some((vao, vbo_id))
    });

    match uploaded {
        Some((vao, vbo_id)) => {
            mesh.vao_id = vao;
            mesh.vbo_id = vbo_id;
            trace_info!("VAO: [ID {vao}] Mesh uploaded successfully to VRAM (GPU)");
        }
        None => trace_warn!("MESH: Upload of a mesh without data"),
    }
}

/// Frees the vertex array, its buffers and the CPU attributes.
pub fn unload_mesh(mesh: RawMesh) {
    if mesh.data == 0 && mesh.vao_id == 0 {
        return;
    }
    let known = with_core(|core| {
        if let Some(vao) = core.vertex_arrays.remove(&mesh.vao_id) {
            for id in vao.buffers {
                core.vertex_buffers.remove(&id);
            }
        }
        let known = core.mesh_data.remove(&mesh.data).is_some();
        if known {
            core.track_unload(ResourceKind::Mesh);
        } else {
            core.track_stray();
        }
        known
    });
    if known {
        trace_info!("VAO: [ID {}] Unloaded vertex array data from VRAM (GPU)", mesh.vao_id);
    } else {
        trace_warn!("MESH: Unload of unknown mesh data");
    }
}

/// Overwrites part of a vertex buffer and the matching CPU attribute.
///
/// `bytes` are little-endian floats, or `u8` colors for slot 3, or `u16`
/// indices for slot 6; `offset` is in bytes.
pub fn update_mesh_buffer(mesh: RawMesh, index: usize, bytes: &[u8], offset: usize) {
    fn patch<T: bytemuck::Pod>(dst: &mut [T], bytes: &[u8], offset: usize) -> bool {
        let size = std::mem::size_of::<T>();
        if offset % size != 0 || bytes.len() % size != 0 {
            return false;
        }
        let values: Vec<T> = bytemuck::pod_collect_to_vec(bytes);
        let start = offset / size;
        match dst.get_mut(start..start + values.len()) {
            Some(slot) => {
                slot.copy_from_slice(&values);
                true
            }
            None => false,
        }
    }

    let ok = with_core(|core| {
        let Some(data) = core.mesh_data.get_mut(&mesh.data) else {
            return false;
        };
        match index {
            BUFFER_POSITIONS => patch(&mut data.vertices, bytes, offset),
            BUFFER_TEXCOORDS => patch(&mut data.texcoords, bytes, offset),
            BUFFER_NORMALS => patch(&mut data.normals, bytes, offset),
            BUFFER_COLORS => patch(&mut data.colors, bytes, offset),
            BUFFER_TANGENTS => patch(&mut data.tangents, bytes, offset),
            BUFFER_TEXCOORDS2 => patch(&mut data.texcoords2, bytes, offset),
            BUFFER_INDICES => patch(&mut data.indices, bytes, offset),
            _ => false,
        }
    });
    if !ok {
        trace_warn!("VBO: Failed to update buffer {index} of mesh (out of range or misaligned)");
    }
}

#[must_use]
pub fn get_mesh_bounding_box(mesh: RawMesh) -> BoundingBox {
    with_core(|core| {
        core.mesh_data
            .get(&mesh.data)
            .map(|data| BoundingBox::from_points((0..data.vertex_count()).map(|i| data.vertex(i))))
            .unwrap_or_default()
    })
}

/// Computes per-vertex tangents from positions, normals and texcoords.
pub fn gen_mesh_tangents(mesh: &mut RawMesh) {
    let Some(mut data) = get_mesh_data(*mesh) else {
        return;
    };
    if data.texcoords.is_empty() || data.normals.is_empty() {
        trace_warn!("MESH: Tangents generation requires texcoords and normals");
        return;
    }

    let count = data.vertex_count();
    let mut tan = vec![glam::Vec3::ZERO; count];
    let mut bitan = vec![glam::Vec3::ZERO; count];
    let triangles: Vec<[usize; 3]> = if data.indices.is_empty() {
        (0..count / 3).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect()
    } else {
        data.indices
            .chunks_exact(3)
            .map(|t| [usize::from(t[0]), usize::from(t[1]), usize::from(t[2])])
            .collect()
    };

    let uv = |i: usize| glam::Vec2::new(data.texcoords[i * 2], data.texcoords[i * 2 + 1]);
    for [a, b, c] in triangles {
        let (p0, p1, p2) = (data.vertex(a).to_glam(), data.vertex(b).to_glam(), data.vertex(c).to_glam());
        let (e1, e2) = (p1 - p0, p2 - p0);
        let (d1, d2) = (uv(b) - uv(a), uv(c) - uv(a));
        let det = d1.x * d2.y - d2.x * d1.y;
        let r = if det.abs() < 1e-8 { 0.0 } else { 1.0 / det };
        let t = (e1 * d2.y - e2 * d1.y) * r;
        let bt = (e2 * d1.x - e1 * d2.x) * r;
        for i in [a, b, c] {
            tan[i] += t;
            bitan[i] += bt;
        }
    }

    data.tangents = (0..count)
        .flat_map(|i| {
            let n = glam::Vec3::from_slice(&data.normals[i * 3..i * 3 + 3]);
            // Gram-Schmidt, handedness in w.
            let t = (tan[i] - n * n.dot(tan[i])).normalize_or_zero();
            let w = if n.cross(t).dot(bitan[i]) < 0.0 { -1.0 } else { 1.0 };
            [t.x, t.y, t.z, w]
        })
        .collect();

    let needs_buffer = mesh.vao_id != 0 && mesh.vbo_id[BUFFER_TANGENTS] == 0;
    let vbo = with_core(|core| {
        core.mesh_data.insert(mesh.data, data);
        needs_buffer.then(|| {
            let id = core.alloc_id();
            core.vertex_buffers.insert(id);
            if let Some(vao) = core.vertex_arrays.get_mut(&mesh.vao_id) {
                vao.buffers.push(id);
            }
            id
        })
    });
    if let Some(id) = vbo {
        mesh.vbo_id[BUFFER_TANGENTS] = id;
    }
    trace_info!("MESH: Tangents data computed and uploaded for provided mesh");
}

/// Writes the mesh as Wavefront OBJ.
pub fn export_mesh(mesh: RawMesh, path: impl AsRef<Path>) -> bool {
    let Some(data) = get_mesh_data(mesh) else {
        return false;
    };
    let text = crate::sys::obj::write_obj(&data);
    crate::sys::files::save_file_data(path, text.as_bytes())
}

// ============================================================================
// Generators
// ============================================================================

fn uploaded(data: MeshData) -> RawMesh {
    let mut mesh = load_mesh_data(data);
    upload_mesh(&mut mesh, false);
    mesh
}

pub fn gen_mesh_poly(sides: i32, radius: f32) -> RawMesh {
    uploaded(primitives::create_poly(sides, radius))
}

pub fn gen_mesh_plane(width: f32, length: f32, res_x: i32, res_z: i32) -> RawMesh {
    uploaded(primitives::create_plane(width, length, res_x, res_z))
}

pub fn gen_mesh_cube(width: f32, height: f32, length: f32) -> RawMesh {
    uploaded(primitives::create_cube(width, height, length))
}

pub fn gen_mesh_sphere(radius: f32, rings: i32, slices: i32) -> RawMesh {
    uploaded(primitives::create_sphere(radius, rings, slices))
}

pub fn gen_mesh_hemisphere(radius: f32, rings: i32, slices: i32) -> RawMesh {
    uploaded(primitives::create_hemisphere(radius, rings, slices))
}

pub fn gen_mesh_cylinder(radius: f32, height: f32, slices: i32) -> RawMesh {
    uploaded(primitives::create_cylinder(radius, height, slices))
}

pub fn gen_mesh_cone(radius: f32, height: f32, slices: i32) -> RawMesh {
    uploaded(primitives::create_cone(radius, height, slices))
}

/// Terrain from the image's luminance.
pub fn gen_mesh_heightmap(heightmap: RawImage, size: Vector3) -> RawMesh {
    let heights: Vec<u8> = load_image_colors(heightmap)
        .into_iter()
        .map(|c| ((u16::from(c.r) + u16::from(c.g) + u16::from(c.b)) / 3) as u8)
        .collect();
    if heights.is_empty() {
        trace_warn!("MESH: Heightmap image is not loaded");
        return RawMesh::default();
    }
    uploaded(primitives::create_heightmap(&heights, heightmap.width, heightmap.height, size))
}

// ============================================================================
// Drawing
// ============================================================================

pub fn draw_mesh(mesh: RawMesh, _material: &RawMaterial, _transform: Matrix) {
    if mesh.vao_id == 0 {
        trace_warn!("MESH: Drawing a mesh that was not uploaded");
        return;
    }
    count_draw_call();
}

pub fn draw_mesh_instanced(mesh: RawMesh, _material: &RawMaterial, transforms: &[Matrix]) {
    if mesh.vao_id == 0 || transforms.is_empty() {
        return;
    }
    count_draw_call();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::context::resource_stats;

    #[test]
    fn upload_allocates_buffers_per_attribute() {
        let mesh = gen_mesh_cube(1.0, 1.0, 1.0);
        assert!(is_mesh_ready(mesh));
        assert_ne!(mesh.vao_id, 0);
        // Positions, texcoords, normals and indices.
        assert_eq!(mesh.vbo_id.iter().filter(|&&id| id != 0).count(), 4);

        unload_mesh(mesh);
        assert!(!is_mesh_ready(mesh));
        unload_mesh(mesh);
        assert_eq!(resource_stats().stray_releases(), 1);
    }

    #[test]
    fn bounding_box_matches_generator() {
        let mesh = gen_mesh_cube(2.0, 2.0, 2.0);
        let bb = get_mesh_bounding_box(mesh);
        assert_eq!(bb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(bb.max, Vector3::ONE);
        unload_mesh(mesh);
    }

    #[test]
    fn tangents_are_generated_and_uploaded() {
        let mut mesh = gen_mesh_plane(1.0, 1.0, 1, 1);
        gen_mesh_tangents(&mut mesh);
        let data = get_mesh_data(mesh).expect("mesh data");
        assert_eq!(data.tangents.len(), 4 * 4);
        assert_ne!(mesh.vbo_id[BUFFER_TANGENTS], 0);
        for t in data.tangents.chunks_exact(4) {
            assert!((t[0].abs() - 1.0).abs() < 1e-5, "tangent follows +-X: {t:?}");
        }
        unload_mesh(mesh);
    }

    #[test]
    fn buffer_update_patches_positions() {
        let mesh = gen_mesh_poly(3, 1.0);
        let moved: Vec<u8> = bytemuck::cast_slice(&[5.0f32, 6.0, 7.0]).to_vec();
        update_mesh_buffer(mesh, BUFFER_POSITIONS, &moved, 12);
        let data = get_mesh_data(mesh).expect("mesh data");
        assert_eq!(data.vertex(1), Vector3::new(5.0, 6.0, 7.0));
        unload_mesh(mesh);
    }
}
