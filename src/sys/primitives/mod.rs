//! Procedural mesh generators.
//!
//! Every generator returns CPU [`MeshData`] with positions, normals and
//! texcoords; uploading is left to the caller.

mod cube;
mod cylinder;
mod heightmap;
mod plane;
mod poly;
mod sphere;

pub use cube::create_cube;
pub use cylinder::{create_cone, create_cylinder};
pub use heightmap::create_heightmap;
pub use plane::create_plane;
pub use poly::create_poly;
pub use sphere::{create_hemisphere, create_sphere};

use crate::sys::types::MeshData;

/// Flattens per-vertex arrays into a mesh.
///
/// Index buffers are 16 bit: meshes with more vertices are expanded into
/// plain triangle lists.
fn finish(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    uvs: &[[f32; 2]],
    indices: &[u32],
) -> MeshData {
    let indexed = positions.len() <= usize::from(u16::MAX);
    let order: Vec<usize> = if indexed {
        (0..positions.len()).collect()
    } else {
        indices.iter().map(|&i| i as usize).collect()
    };

    MeshData {
        vertices: order.iter().flat_map(|&i| positions[i]).collect(),
        normals: order.iter().flat_map(|&i| normals[i]).collect(),
        texcoords: order.iter().flat_map(|&i| uvs[i]).collect(),
        indices: if indexed {
            indices.iter().map(|&i| i as u16).collect()
        } else {
            Vec::new()
        },
        ..MeshData::default()
    }
}

/// Two triangles per cell of a `columns` x `rows` vertex grid.
fn grid_indices(columns: u32, rows: u32) -> Vec<u32> {
    let cells = columns.saturating_sub(1) * rows.saturating_sub(1);
    let mut indices = Vec::with_capacity(cells as usize * 6);
    for row in 0..rows.saturating_sub(1) {
        for col in 0..columns.saturating_sub(1) {
            let a = row * columns + col;
            let b = a + columns;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::BoundingBox;

    fn bounds(mesh: &MeshData) -> BoundingBox {
        BoundingBox::from_points((0..mesh.vertex_count()).map(|i| mesh.vertex(i)))
    }

    fn normals_are_unit(mesh: &MeshData) -> bool {
        mesh.normals
            .chunks_exact(3)
            .all(|n| ((n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() - 1.0).abs() < 1e-4)
    }

    #[test]
    fn cube_has_four_vertices_per_face() {
        let mesh = create_cube(2.0, 4.0, 6.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        let bb = bounds(&mesh);
        assert_eq!(bb.size().to_glam().to_array(), [2.0, 4.0, 6.0]);
        assert!(normals_are_unit(&mesh));
    }

    #[test]
    fn plane_lies_on_xz() {
        let mesh = create_plane(10.0, 4.0, 5, 2);
        assert_eq!(mesh.vertex_count(), 6 * 3);
        assert_eq!(mesh.triangle_count(), 5 * 2 * 2);
        let bb = bounds(&mesh);
        assert_eq!(bb.min.y, 0.0);
        assert_eq!(bb.max.y, 0.0);
        assert_eq!(bb.size().x, 10.0);
        assert_eq!(bb.size().z, 4.0);
    }

    #[test]
    fn sphere_radius_and_normals() {
        let mesh = create_sphere(2.0, 8, 16);
        assert!((0..mesh.vertex_count()).all(|i| (mesh.vertex(i).length() - 2.0).abs() < 1e-4));
        assert!(normals_are_unit(&mesh));
    }

    #[test]
    fn poly_is_a_fan() {
        let mesh = create_poly(6, 1.0);
        assert_eq!(mesh.triangle_count(), 6);
        assert!(mesh.normals.chunks_exact(3).all(|n| n == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn cylinder_height_and_caps() {
        let mesh = create_cylinder(1.0, 3.0, 12);
        let bb = bounds(&mesh);
        assert!((bb.max.y - 3.0).abs() < 1e-5);
        assert_eq!(bb.min.y, 0.0);
        // Sides plus two caps.
        assert_eq!(mesh.triangle_count(), 12 * 2 + 12 * 2);
    }

    #[test]
    fn large_meshes_drop_the_index_buffer() {
        let heights = vec![0u8; 300 * 300];
        let mesh = create_heightmap(&heights, 300, 300, crate::math::Vector3::new(10.0, 1.0, 10.0));
        assert!(mesh.indices.is_empty());
        assert_eq!(mesh.triangle_count(), 299 * 299 * 2);
    }
}
