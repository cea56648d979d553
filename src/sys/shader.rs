//! Shader programs and their location tables.
//!
//! "Compiling" a program means scanning the GLSL for `uniform` declarations
//! and vertex inputs and assigning them locations in declaration order, which
//! is what a driver reports for simple programs. Sources without a `main`
//! entry point fail to compile.

use std::path::Path;

use crate::sys::context::{with_core, ResourceKind, ShaderProgram, DEFAULT_SHADER_LOCS};
use crate::sys::files::load_file_text;
use crate::sys::trace::{trace_info, trace_warn};
use crate::sys::types::{
    RawShader, RawTexture, ShaderLocationIndex, ShaderValue, DEFAULT_SHADER_ID,
    MAX_SHADER_LOCATIONS,
};

pub const DEFAULT_VERTEX_SHADER: &str = "#version 330
in vec3 vertexPosition;
in vec2 vertexTexCoord;
in vec4 vertexColor;
out vec2 fragTexCoord;
out vec4 fragColor;
uniform mat4 mvp;
void main()
{
    fragTexCoord = vertexTexCoord;
    fragColor = vertexColor;
    gl_Position = mvp*vec4(vertexPosition, 1.0);
}
";

pub const DEFAULT_FRAGMENT_SHADER: &str = "#version 330
in vec2 fragTexCoord;
in vec4 fragColor;
out vec4 finalColor;
uniform sampler2D texture0;
uniform vec4 colDiffuse;
void main()
{
    vec4 texelColor = texture(texture0, fragTexCoord);
    finalColor = texelColor*colDiffuse*fragColor;
}
";

/// Attribute and uniform names bound to the standard location slots.
const STANDARD_ATTRIBS: [(ShaderLocationIndex, &str); 6] = [
    (ShaderLocationIndex::VertexPosition, "vertexPosition"),
    (ShaderLocationIndex::VertexTexcoord01, "vertexTexCoord"),
    (ShaderLocationIndex::VertexTexcoord02, "vertexTexCoord2"),
    (ShaderLocationIndex::VertexNormal, "vertexNormal"),
    (ShaderLocationIndex::VertexTangent, "vertexTangent"),
    (ShaderLocationIndex::VertexColor, "vertexColor"),
];

const STANDARD_UNIFORMS: [(ShaderLocationIndex, &str); 9] = [
    (ShaderLocationIndex::MatrixMvp, "mvp"),
    (ShaderLocationIndex::MatrixView, "matView"),
    (ShaderLocationIndex::MatrixProjection, "matProjection"),
    (ShaderLocationIndex::MatrixModel, "matModel"),
    (ShaderLocationIndex::MatrixNormal, "matNormal"),
    (ShaderLocationIndex::ColorDiffuse, "colDiffuse"),
    (ShaderLocationIndex::MapAlbedo, "texture0"),
    (ShaderLocationIndex::MapMetalness, "texture1"),
    (ShaderLocationIndex::MapNormal, "texture2"),
];

// ============================================================================
// Compilation
// ============================================================================

/// Names declared with `keyword`, in declaration order.
fn declarations<'a>(source: &'a str, keywords: &[&str]) -> Vec<&'a str> {
    let mut names = Vec::new();
    for line in source.lines() {
        let code = line.split("//").next().unwrap_or_default();
        for statement in code.split(';') {
            let tokens: Vec<&str> = statement.split_whitespace().collect();
            let Some(pos) = tokens.iter().position(|t| keywords.contains(t)) else {
                continue;
            };
            // Skip precision qualifiers between the keyword and the type.
            let rest: Vec<&str> = tokens[pos + 1..]
                .iter()
                .copied()
                .filter(|t| !matches!(*t, "lowp" | "mediump" | "highp" | "flat"))
                .collect();
            if let Some(name) = rest.get(1) {
                let name = name.split('[').next().unwrap_or(name);
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }
    names
}

fn has_entry_point(source: &str) -> bool {
    source.contains("void main")
}

pub(crate) fn compile(vs_code: &str, fs_code: &str) -> Option<ShaderProgram> {
    if !has_entry_point(vs_code) || !has_entry_point(fs_code) {
        return None;
    }

    let mut program = ShaderProgram::default();
    for (location, name) in declarations(vs_code, &["in", "attribute"]).into_iter().enumerate() {
        program.attribs.insert(name.to_owned(), location as i32);
    }

    let mut uniforms = declarations(vs_code, &["uniform"]);
    for name in declarations(fs_code, &["uniform"]) {
        if !uniforms.contains(&name) {
            uniforms.push(name);
        }
    }
    for (location, name) in uniforms.into_iter().enumerate() {
        program.uniforms.insert(name.to_owned(), location as i32);
    }

    Some(program)
}

pub(crate) fn default_program() -> ShaderProgram {
    compile(DEFAULT_VERTEX_SHADER, DEFAULT_FRAGMENT_SHADER).unwrap_or_default()
}

/// Location table with the standard slots filled from `program`.
pub(crate) fn standard_locations(program: &ShaderProgram) -> Vec<i32> {
    let mut locs = vec![-1; MAX_SHADER_LOCATIONS];
    for (index, name) in STANDARD_ATTRIBS {
        locs[index as usize] = program.attribs.get(name).copied().unwrap_or(-1);
    }
    for (index, name) in STANDARD_UNIFORMS {
        locs[index as usize] = program.uniforms.get(name).copied().unwrap_or(-1);
    }
    locs
}

// ============================================================================
// Loading
// ============================================================================

/// Compiles a program; `None` stages use the default stage sources.
///
/// Both `None` gives the default program with a location table of its own.
pub fn load_shader_from_memory(vs_code: Option<&str>, fs_code: Option<&str>) -> RawShader {
    if vs_code.is_none() && fs_code.is_none() {
        let (locs, table) = with_core(|core| {
            let table = core
                .programs
                .get(&DEFAULT_SHADER_ID)
                .map_or_else(|| vec![-1; MAX_SHADER_LOCATIONS], standard_locations);
            let locs = core.alloc_id();
            core.shader_locs.insert(locs, table.clone());
            core.track_load(ResourceKind::Shader);
            (locs, table)
        });
        debug_assert_eq!(table.len(), MAX_SHADER_LOCATIONS);
        trace_info!("SHADER: [ID {DEFAULT_SHADER_ID}] Default shader loaded successfully");
        return RawShader {
            id: DEFAULT_SHADER_ID,
            locs,
        };
    }

    let vs = vs_code.unwrap_or(DEFAULT_VERTEX_SHADER);
    let fs = fs_code.unwrap_or(DEFAULT_FRAGMENT_SHADER);
    let Some(program) = compile(vs, fs) else {
        trace_warn!("SHADER: Failed to compile shader code, no entry point found");
        return RawShader::default();
    };

    let table = standard_locations(&program);
    let shader = with_core(|core| {
        let id = core.alloc_id();
        let locs = core.alloc_id();
        core.programs.insert(id, program);
        core.shader_locs.insert(locs, table);
        core.track_load(ResourceKind::Shader);
        RawShader { id, locs }
    });
    trace_info!("SHADER: [ID {}] Program shader loaded successfully", shader.id);
    shader
}

/// Loads and compiles stage files. A path that cannot be read fails the load.
pub fn load_shader(vs_path: Option<&Path>, fs_path: Option<&Path>) -> RawShader {
    let read = |path: Option<&Path>| match path {
        Some(path) => load_file_text(path).map(Some),
        None => Some(None),
    };

    let (Some(vs), Some(fs)) = (read(vs_path), read(fs_path)) else {
        trace_warn!("SHADER: Failed to load shader files");
        return RawShader::default();
    };
    load_shader_from_memory(vs.as_deref(), fs.as_deref())
}

#[must_use]
pub fn get_shader_default() -> RawShader {
    RawShader {
        id: DEFAULT_SHADER_ID,
        locs: DEFAULT_SHADER_LOCS,
    }
}

#[must_use]
pub fn is_shader_ready(shader: RawShader) -> bool {
    shader.id > 0
        && shader.locs != 0
        && with_core(|core| {
            core.programs.contains_key(&shader.id) && core.shader_locs.contains_key(&shader.locs)
        })
}

/// Frees the program and the location table. The default shader is kept.
pub fn unload_shader(shader: RawShader) {
    if shader == RawShader::default() || shader.locs == DEFAULT_SHADER_LOCS {
        return;
    }

    let known = with_core(|core| {
        let known = core.shader_locs.remove(&shader.locs).is_some();
        if shader.id != DEFAULT_SHADER_ID {
            core.programs.remove(&shader.id);
        }
        if known {
            core.track_unload(ResourceKind::Shader);
        } else {
            core.track_stray();
        }
        known
    });

    if known {
        trace_info!("SHADER: [ID {}] Unloaded shader program data from VRAM (GPU)", shader.id);
    } else {
        trace_warn!("SHADER: [ID {}] Unload of unknown shader", shader.id);
    }
}

// ============================================================================
// Locations and values
// ============================================================================

#[must_use]
pub fn get_shader_location(shader: RawShader, name: &str) -> i32 {
    let loc = with_core(|core| {
        core.programs
            .get(&shader.id)
            .and_then(|p| p.uniforms.get(name).copied())
    });
    loc.unwrap_or_else(|| {
        trace_warn!("SHADER: [ID {}] Failed to find shader uniform: {name}", shader.id);
        -1
    })
}

#[must_use]
pub fn get_shader_location_attrib(shader: RawShader, name: &str) -> i32 {
    let loc = with_core(|core| {
        core.programs
            .get(&shader.id)
            .and_then(|p| p.attribs.get(name).copied())
    });
    loc.unwrap_or_else(|| {
        trace_warn!("SHADER: [ID {}] Failed to find shader attribute: {name}", shader.id);
        -1
    })
}

/// Entry `index` of the location table, -1 when unset.
#[must_use]
pub fn get_shader_loc(shader: RawShader, index: ShaderLocationIndex) -> i32 {
    with_core(|core| {
        core.shader_locs
            .get(&shader.locs)
            .and_then(|t| t.get(index as usize).copied())
            .unwrap_or(-1)
    })
}

pub fn set_shader_loc(shader: RawShader, index: ShaderLocationIndex, location: i32) {
    with_core(|core| {
        if let Some(slot) = core
            .shader_locs
            .get_mut(&shader.locs)
            .and_then(|t| t.get_mut(index as usize))
        {
            *slot = location;
        }
    });
}

/// Stores a uniform value; negative locations are ignored.
pub fn set_shader_value(shader: RawShader, location: i32, value: ShaderValue) {
    if location < 0 {
        return;
    }
    with_core(|core| {
        if let Some(program) = core.programs.get_mut(&shader.id) {
            program.values.insert(location, value);
        }
    });
}

pub fn set_shader_value_texture(shader: RawShader, location: i32, texture: RawTexture) {
    set_shader_value(shader, location, ShaderValue::Sampler2D(texture.id));
}

/// Last value stored at `location`.
#[must_use]
pub fn get_shader_value(shader: RawShader, location: i32) -> Option<ShaderValue> {
    with_core(|core| {
        core.programs
            .get(&shader.id)
            .and_then(|p| p.values.get(&location).copied())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::context::resource_stats;

    const FRAGMENT: &str = "#version 330
in vec2 fragTexCoord;
uniform sampler2D texture0;
uniform vec4 colDiffuse;
uniform float time; // animated
uniform vec2 lights[4];
out vec4 finalColor;
void main() { finalColor = colDiffuse; }
";

    #[test]
    fn declarations_get_sequential_locations() {
        let shader = load_shader_from_memory(None, Some(FRAGMENT));
        assert!(is_shader_ready(shader));

        // Vertex uniforms come first.
        assert_eq!(get_shader_location(shader, "mvp"), 0);
        assert_eq!(get_shader_location(shader, "time"), 3);
        assert_eq!(get_shader_location(shader, "lights"), 4);
        assert_eq!(get_shader_location(shader, "missing"), -1);
        assert_eq!(get_shader_location_attrib(shader, "vertexColor"), 2);

        assert_eq!(get_shader_loc(shader, ShaderLocationIndex::MatrixMvp), 0);
        assert_eq!(get_shader_loc(shader, ShaderLocationIndex::MapAlbedo), 1);
        assert_eq!(get_shader_loc(shader, ShaderLocationIndex::VertexNormal), -1);

        unload_shader(shader);
        assert!(!is_shader_ready(shader));
    }

    #[test]
    fn source_without_main_fails() {
        let shader = load_shader_from_memory(None, Some("uniform float x;"));
        assert_eq!(shader, RawShader::default());
        assert_eq!(resource_stats().loaded(ResourceKind::Shader), 0);
    }

    #[test]
    fn default_shader_is_never_released() {
        let default = get_shader_default();
        assert!(is_shader_ready(default));
        unload_shader(default);
        assert!(is_shader_ready(default));
        assert_eq!(resource_stats().stray_releases(), 0);
    }

    #[test]
    fn double_unload_is_a_stray_release() {
        let shader = load_shader_from_memory(None, None);
        assert_eq!(shader.id, DEFAULT_SHADER_ID);
        unload_shader(shader);
        unload_shader(shader);
        let stats = resource_stats();
        assert_eq!(stats.unloaded(ResourceKind::Shader), 1);
        assert_eq!(stats.stray_releases(), 1);
        assert!(is_shader_ready(get_shader_default()));
    }

    #[test]
    fn values_are_recorded() {
        let shader = load_shader_from_memory(None, Some(FRAGMENT));
        let loc = get_shader_location(shader, "time");
        set_shader_value(shader, loc, 1.5f32.into());
        assert_eq!(get_shader_value(shader, loc), Some(ShaderValue::Float(1.5)));
        unload_shader(shader);
    }
}
