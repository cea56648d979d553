//! Wavefront OBJ/MTL reading through `tobj`, plus a plain OBJ writer.

use std::fmt::Write as _;
use std::io::Cursor;
use std::path::Path;

use crate::sys::files::load_file_data;
use crate::sys::trace::trace_warn;
use crate::sys::types::MeshData;

/// Meshes of one OBJ file, each with the index of its MTL material.
pub(crate) struct ObjScene {
    pub meshes: Vec<(MeshData, Option<usize>)>,
    pub materials: Vec<tobj::Material>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..tobj::LoadOptions::default()
    }
}

/// Reads MTL libraries relative to `base_dir` through the file-data callback.
fn mtl_loader(base_dir: &Path, name: &Path) -> tobj::MTLLoadResult {
    match load_file_data(base_dir.join(name)) {
        Some(bytes) => tobj::load_mtl_buf(&mut Cursor::new(bytes)),
        None => Err(tobj::LoadError::OpenFileFailed),
    }
}

fn to_mesh_data(mesh: &tobj::Mesh) -> MeshData {
    // OBJ texcoords have their origin at the bottom left.
    let texcoords: Vec<f32> = mesh
        .texcoords
        .chunks_exact(2)
        .flat_map(|t| [t[0], 1.0 - t[1]])
        .collect();
    let colors: Vec<u8> = mesh
        .vertex_color
        .chunks_exact(3)
        .flat_map(|c| {
            let [r, g, b] = [c[0], c[1], c[2]].map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
            [r, g, b, 255]
        })
        .collect();

    let mut data = MeshData {
        vertices: mesh.positions.clone(),
        texcoords,
        normals: mesh.normals.clone(),
        colors,
        ..MeshData::default()
    };
    data.set_indices(&mesh.indices);
    data
}

/// Parses OBJ text. One mesh per object/material group.
pub(crate) fn parse_obj(bytes: &[u8], base_dir: &Path) -> Option<ObjScene> {
    let (models, materials) = match tobj::load_obj_buf(
        &mut Cursor::new(bytes),
        &load_options(),
        |name| mtl_loader(base_dir, name),
    ) {
        Ok(result) => result,
        Err(err) => {
            trace_warn!("MODEL: Failed to parse OBJ data: {err}");
            return None;
        }
    };

    let materials = materials.unwrap_or_else(|err| {
        trace_warn!("MODEL: Failed to load MTL library: {err}");
        Vec::new()
    });

    let meshes = models
        .iter()
        .filter(|model| !model.mesh.positions.is_empty())
        .map(|model| (to_mesh_data(&model.mesh), model.mesh.material_id))
        .collect();

    Some(ObjScene { meshes, materials })
}

pub(crate) fn parse_mtl(bytes: &[u8]) -> Option<Vec<tobj::Material>> {
    match tobj::load_mtl_buf(&mut Cursor::new(bytes)) {
        Ok((materials, _)) => Some(materials),
        Err(err) => {
            trace_warn!("MATERIAL: Failed to parse MTL data: {err}");
            None
        }
    }
}

/// Serializes one mesh. Indices are 1-based; v is flipped back.
pub(crate) fn write_obj(data: &MeshData) -> String {
    let mut out = String::new();
    let count = data.vertex_count();
    let has_uv = data.texcoords.len() >= count * 2 && count > 0;
    let has_normal = data.normals.len() >= count * 3 && count > 0;

    let _ = writeln!(out, "# vertex count: {count}");
    let _ = writeln!(out, "# triangle count: {}", data.triangle_count());
    let _ = writeln!(out, "g mesh");
    for v in data.vertices.chunks_exact(3) {
        let _ = writeln!(out, "v {:.6} {:.6} {:.6}", v[0], v[1], v[2]);
    }
    if has_uv {
        for t in data.texcoords.chunks_exact(2) {
            let _ = writeln!(out, "vt {:.6} {:.6}", t[0], 1.0 - t[1]);
        }
    }
    if has_normal {
        for n in data.normals.chunks_exact(3) {
            let _ = writeln!(out, "vn {:.6} {:.6} {:.6}", n[0], n[1], n[2]);
        }
    }

    let corner = |i: usize| -> String {
        let i = i + 1;
        match (has_uv, has_normal) {
            (true, true) => format!("{i}/{i}/{i}"),
            (true, false) => format!("{i}/{i}"),
            (false, true) => format!("{i}//{i}"),
            (false, false) => i.to_string(),
        }
    };
    let triangles: Vec<[usize; 3]> = if data.indices.is_empty() {
        (0..count / 3).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect()
    } else {
        data.indices
            .chunks_exact(3)
            .map(|t| [usize::from(t[0]), usize::from(t[1]), usize::from(t[2])])
            .collect()
    };
    for [a, b, c] in triangles {
        let _ = writeln!(out, "f {} {} {}", corner(a), corner(b), corner(c));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn quad_is_triangulated_with_flipped_v() {
        let scene = parse_obj(QUAD.as_bytes(), Path::new(".")).expect("valid obj");
        assert_eq!(scene.meshes.len(), 1);
        let (mesh, material) = &scene.meshes[0];
        assert_eq!(*material, None);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(&mesh.texcoords[0..2], &[0.0, 1.0]);
    }

    #[test]
    fn mtl_colors_and_maps() {
        let mtl = "newmtl brick\nKd 0.5 0.25 1.0\nmap_Kd brick.png\n";
        let materials = parse_mtl(mtl.as_bytes()).expect("valid mtl");
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].name, "brick");
        assert_eq!(materials[0].diffuse, Some([0.5, 0.25, 1.0]));
        assert_eq!(materials[0].diffuse_texture.as_deref(), Some("brick.png"));
    }

    #[test]
    fn written_obj_reads_back() {
        let scene = parse_obj(QUAD.as_bytes(), Path::new(".")).expect("valid obj");
        let text = write_obj(&scene.meshes[0].0);
        assert!(text.contains("f 1/1 2/2 3/3"));

        let again = parse_obj(text.as_bytes(), Path::new(".")).expect("valid obj");
        assert_eq!(again.meshes[0].0.triangle_count(), 2);
        assert_eq!(again.meshes[0].0.texcoords, scene.meshes[0].0.texcoords);
    }
}
