use std::f32::consts::PI;

use super::finish;
use crate::sys::types::MeshData;

/// Regular polygon on XZ facing +Y.
#[must_use]
pub fn create_poly(sides: i32, radius: f32) -> MeshData {
    let sides = sides.max(3) as u32;

    let mut positions = vec![[0.0, 0.0, 0.0]];
    let mut uvs = vec![[0.5, 0.5]];
    for side in 0..sides {
        let (sin, cos) = (side as f32 / sides as f32 * 2.0 * PI).sin_cos();
        positions.push([sin * radius, 0.0, cos * radius]);
        uvs.push([(sin + 1.0) / 2.0, (cos + 1.0) / 2.0]);
    }
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];

    let indices: Vec<u32> = (0..sides)
        .flat_map(|side| [0, 1 + side, 1 + (side + 1) % sides])
        .collect();

    finish(&positions, &normals, &uvs, &indices)
}
