use std::f32::consts::PI;

use super::finish;
use crate::sys::types::MeshData;

/// Cylinder standing on the XZ plane, capped at both ends.
#[must_use]
pub fn create_cylinder(radius: f32, height: f32, slices: i32) -> MeshData {
    frustum(radius, radius, height, slices)
}

/// Cone with its base on the XZ plane.
#[must_use]
pub fn create_cone(radius: f32, height: f32, slices: i32) -> MeshData {
    frustum(radius, 0.0, height, slices)
}

fn frustum(bottom: f32, top: f32, height: f32, slices: i32) -> MeshData {
    let slices = slices.max(3) as u32;
    let slope = (bottom - top) / height.max(f32::EPSILON);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    // Side: a bottom and a top vertex per slice, seam duplicated.
    for slice in 0..=slices {
        let u = slice as f32 / slices as f32;
        let (sin, cos) = (u * 2.0 * PI).sin_cos();
        let normal = glam::Vec3::new(sin, slope, cos).normalize();
        positions.push([sin * bottom, 0.0, cos * bottom]);
        positions.push([sin * top, height, cos * top]);
        normals.extend([normal.to_array(); 2]);
        uvs.extend([[u, 1.0], [u, 0.0]]);
    }
    for slice in 0..slices {
        let a = slice * 2;
        indices.extend_from_slice(&[a, a + 2, a + 1, a + 1, a + 2, a + 3]);
    }

    // Caps as fans around a center vertex.
    for (y, r, up) in [(0.0, bottom, false), (height, top, true)] {
        let center = positions.len() as u32;
        let normal = if up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
        positions.push([0.0, y, 0.0]);
        normals.push(normal);
        uvs.push([0.5, 0.5]);
        for slice in 0..slices {
            let (sin, cos) = (slice as f32 / slices as f32 * 2.0 * PI).sin_cos();
            positions.push([sin * r, y, cos * r]);
            normals.push(normal);
            uvs.push([(sin + 1.0) / 2.0, (cos + 1.0) / 2.0]);
        }
        for slice in 0..slices {
            let a = center + 1 + slice;
            let b = center + 1 + (slice + 1) % slices;
            if up {
                indices.extend_from_slice(&[center, a, b]);
            } else {
                indices.extend_from_slice(&[center, b, a]);
            }
        }
    }

    finish(&positions, &normals, &uvs, &indices)
}
