use super::finish;
use crate::sys::types::MeshData;

/// (normal, u axis, v axis) of each face.
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
];

/// Axis-aligned box centered on the origin.
#[must_use]
pub fn create_cube(width: f32, height: f32, length: f32) -> MeshData {
    let half = [width / 2.0, height / 2.0, length / 2.0];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in FACES {
        let base = positions.len() as u32;
        // Corners counter-clockwise seen from outside.
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner: [f32; 3] =
                std::array::from_fn(|i| (normal[i] + u[i] * su + v[i] * sv) * half[i]);
            positions.push(corner);
            normals.push(normal);
            uvs.push([(su + 1.0) / 2.0, (1.0 - sv) / 2.0]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    finish(&positions, &normals, &uvs, &indices)
}
