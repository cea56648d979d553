use super::{finish, grid_indices};
use crate::sys::types::MeshData;

/// Plane on XZ facing +Y, `res_x` by `res_z` cells.
#[must_use]
pub fn create_plane(width: f32, length: f32, res_x: i32, res_z: i32) -> MeshData {
    let cells_x = res_x.max(1) as u32;
    let cells_z = res_z.max(1) as u32;
    let (columns, rows) = (cells_x + 1, cells_z + 1);

    let mut positions = Vec::with_capacity((columns * rows) as usize);
    let mut uvs = Vec::with_capacity(positions.capacity());
    for iz in 0..rows {
        let tz = iz as f32 / cells_z as f32;
        for ix in 0..columns {
            let tx = ix as f32 / cells_x as f32;
            positions.push([(tx - 0.5) * width, 0.0, (tz - 0.5) * length]);
            uvs.push([tx, tz]);
        }
    }
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];

    finish(&positions, &normals, &uvs, &grid_indices(columns, rows))
}
