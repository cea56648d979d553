use std::f32::consts::PI;

use super::{finish, grid_indices};
use crate::sys::types::MeshData;

/// Latitude/longitude sphere centered on the origin.
#[must_use]
pub fn create_sphere(radius: f32, rings: i32, slices: i32) -> MeshData {
    sphere_band(radius, rings, slices, PI)
}

/// Upper half of a sphere, open at the bottom.
#[must_use]
pub fn create_hemisphere(radius: f32, rings: i32, slices: i32) -> MeshData {
    sphere_band(radius, rings, slices, PI / 2.0)
}

/// Rings from the north pole down to polar angle `extent`.
fn sphere_band(radius: f32, rings: i32, slices: i32, extent: f32) -> MeshData {
    let rings = rings.max(2) as u32;
    let slices = slices.max(3) as u32;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let theta = v * extent;
        let (ring_radius, y) = (theta.sin(), theta.cos());

        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let phi = u * 2.0 * PI;
            let normal = [ring_radius * phi.sin(), y, ring_radius * phi.cos()];
            positions.push(normal.map(|n| n * radius));
            normals.push(normal);
            uvs.push([u, v]);
        }
    }

    finish(&positions, &normals, &uvs, &grid_indices(slices + 1, rings + 1))
}
