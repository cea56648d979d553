use glam::Vec3;

use super::{finish, grid_indices};
use crate::math::Vector3;
use crate::sys::types::MeshData;

/// Terrain from a `width` x `height` grid of 8-bit heights, scaled to `size`.
#[must_use]
pub fn create_heightmap(heights: &[u8], width: i32, height: i32, size: Vector3) -> MeshData {
    let (columns, rows) = (width.max(2) as u32, height.max(2) as u32);
    let scale = Vec3::new(
        size.x / (columns - 1) as f32,
        size.y / 255.0,
        size.z / (rows - 1) as f32,
    );
    let (map_w, map_h) = (width.max(1) as u32, height.max(1) as u32);
    let sample = |x: u32, z: u32| {
        let i = (z.min(map_h - 1) * map_w + x.min(map_w - 1)) as usize;
        f32::from(heights.get(i).copied().unwrap_or(0))
    };

    let mut positions = Vec::with_capacity((columns * rows) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut uvs = Vec::with_capacity(positions.capacity());
    for z in 0..rows {
        for x in 0..columns {
            positions.push([x as f32 * scale.x, sample(x, z) * scale.y, z as f32 * scale.z]);
            uvs.push([x as f32 / (columns - 1) as f32, z as f32 / (rows - 1) as f32]);

            // Central differences over the neighbors.
            let dx = (sample(x + 1, z) - sample(x.saturating_sub(1), z)) * scale.y;
            let dz = (sample(x, z + 1) - sample(x, z.saturating_sub(1))) * scale.y;
            let normal = Vec3::new(-dx / (2.0 * scale.x), 1.0, -dz / (2.0 * scale.z)).normalize();
            normals.push(normal.to_array());
        }
    }

    finish(&positions, &normals, &uvs, &grid_indices(columns, rows))
}
