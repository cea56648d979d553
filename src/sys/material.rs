//! Materials: a shader plus texture slots.

use std::path::{Path, PathBuf};

use crate::math::Color;
use crate::sys::context::{with_core, ResourceKind};
use crate::sys::files::load_file_data;
use crate::sys::image::{load_image_from_memory, unload_image};
use crate::sys::shader::{get_shader_default, unload_shader};
use crate::sys::texture::{
    get_default_texture, load_texture, load_texture_from_image, unload_texture,
};
use crate::sys::trace::{trace_info, trace_warn};
use crate::sys::types::{
    MaterialMapIndex, RawMaterial, RawMaterialMap, RawShader, RawTexture, DEFAULT_SHADER_ID,
    DEFAULT_TEXTURE_ID, MAX_MATERIAL_MAPS,
};

/// Allocates the map block of a material and counts the load.
pub(crate) fn alloc_material(
    shader: RawShader,
    maps: [RawMaterialMap; MAX_MATERIAL_MAPS],
) -> RawMaterial {
    let id = with_core(|core| {
        let id = core.alloc_id();
        core.material_blocks.insert(id);
        core.track_load(ResourceKind::Material);
        id
    });
    RawMaterial {
        id,
        shader,
        maps,
        params: [0.0; 4],
    }
}

fn default_maps() -> [RawMaterialMap; MAX_MATERIAL_MAPS] {
    let mut maps = [RawMaterialMap::default(); MAX_MATERIAL_MAPS];
    maps[MaterialMapIndex::Albedo as usize] = RawMaterialMap {
        texture: get_default_texture(),
        color: Color::WHITE,
        value: 0.0,
    };
    maps[MaterialMapIndex::Metalness as usize].color = Color::WHITE;
    maps
}

/// Default shader, default texture in the albedo slot, white diffuse.
pub fn load_material_default() -> RawMaterial {
    alloc_material(get_shader_default(), default_maps())
}

#[must_use]
pub fn is_material_ready(material: &RawMaterial) -> bool {
    material.id != 0
        && material.shader.id > 0
        && with_core(|core| core.material_blocks.contains(&material.id))
}

/// Frees the map block, the shader unless it is the default one, and every
/// non-default map texture.
///
/// Nothing is de-duplicated: a texture referenced from two slots is unloaded
/// twice.
pub fn unload_material(material: RawMaterial) {
    if material.id == 0 {
        return;
    }
    let known = with_core(|core| {
        let known = core.material_blocks.remove(&material.id);
        if known {
            core.track_unload(ResourceKind::Material);
        } else {
            core.track_stray();
        }
        known
    });
    if !known {
        trace_warn!("MATERIAL: [ID {}] Unload of unknown material", material.id);
        return;
    }

    if material.shader.id != DEFAULT_SHADER_ID {
        unload_shader(material.shader);
    }
    for map in material.maps {
        if map.texture.id != 0 && map.texture.id != DEFAULT_TEXTURE_ID {
            unload_texture(map.texture);
        }
    }
}

pub fn set_material_texture(material: &mut RawMaterial, map: MaterialMapIndex, texture: RawTexture) {
    material.maps[map as usize].texture = texture;
}

fn to_color(rgb: [f32; 3]) -> Color {
    let [r, g, b] = rgb.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color::new(r, g, b, 255)
}

/// Where a material map's texture comes from.
#[derive(Debug, Clone)]
pub(crate) enum TextureSource {
    File(PathBuf),
    Encoded { file_type: String, bytes: Vec<u8> },
}

/// Parsed material, not yet allocated.
#[derive(Debug, Clone, Default)]
pub(crate) struct MaterialSource {
    pub name: String,
    pub colors: Vec<(MaterialMapIndex, Color)>,
    pub values: Vec<(MaterialMapIndex, f32)>,
    pub textures: Vec<(MaterialMapIndex, TextureSource)>,
}

impl MaterialSource {
    /// Reads an MTL entry; texture names resolve against `base_dir`.
    pub(crate) fn from_mtl(mtl: &tobj::Material, base_dir: &Path) -> Self {
        let mut source = Self {
            name: mtl.name.clone(),
            ..Self::default()
        };
        let maps = [
            (MaterialMapIndex::Albedo, &mtl.diffuse_texture),
            (MaterialMapIndex::Metalness, &mtl.specular_texture),
            (MaterialMapIndex::Normal, &mtl.normal_texture),
        ];
        for (index, name) in maps {
            if let Some(name) = name.as_deref().filter(|n| !n.is_empty()) {
                source.textures.push((index, TextureSource::File(base_dir.join(name))));
            }
        }
        if let Some(kd) = mtl.diffuse {
            source.colors.push((MaterialMapIndex::Albedo, to_color(kd)));
        }
        if let Some(ks) = mtl.specular {
            source.colors.push((MaterialMapIndex::Metalness, to_color(ks)));
        }
        if let Some(shininess) = mtl.shininess {
            source.values.push((MaterialMapIndex::Roughness, shininess));
        }
        source
    }
}

fn load_texture_source(source: &TextureSource) -> RawTexture {
    match source {
        TextureSource::File(path) => load_texture(path),
        TextureSource::Encoded { file_type, bytes } => {
            let image = load_image_from_memory(file_type, bytes);
            if image.data == 0 {
                return RawTexture::default();
            }
            let texture = load_texture_from_image(image);
            unload_image(image);
            texture
        }
    }
}

/// Allocates a material on the default shader, uploading its textures.
/// Textures that fail to load leave the slot's default in place.
pub(crate) fn load_material_source(source: &MaterialSource) -> RawMaterial {
    let mut maps = default_maps();
    for &(index, color) in &source.colors {
        maps[index as usize].color = color;
    }
    for &(index, value) in &source.values {
        maps[index as usize].value = value;
    }
    for (index, texture) in &source.textures {
        let loaded = load_texture_source(texture);
        if loaded.id != 0 {
            maps[*index as usize].texture = loaded;
        } else {
            trace_warn!("MATERIAL: [{}] Failed to load map texture", source.name);
        }
    }
    alloc_material(get_shader_default(), maps)
}

/// Loads every material of an MTL library.
pub fn load_materials(path: impl AsRef<Path>) -> Vec<RawMaterial> {
    let path = path.as_ref();
    let Some(bytes) = load_file_data(path) else {
        return Vec::new();
    };
    let Some(mtls) = crate::sys::obj::parse_mtl(&bytes) else {
        return Vec::new();
    };
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let materials: Vec<RawMaterial> = mtls
        .iter()
        .map(|m| load_material_source(&MaterialSource::from_mtl(m, base_dir)))
        .collect();
    trace_info!("MATERIAL: [{}] {} materials loaded", path.display(), materials.len());
    materials
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::context::resource_stats;
    use crate::sys::image::gen_image_color;
    use crate::sys::shader::load_shader_from_memory;

    fn texture() -> RawTexture {
        let image = gen_image_color(2, 2, Color::RED);
        let texture = load_texture_from_image(image);
        unload_image(image);
        texture
    }

    #[test]
    fn default_material_uses_builtins() {
        let material = load_material_default();
        assert!(is_material_ready(&material));
        assert_eq!(material.shader, get_shader_default());
        assert_eq!(material.maps[0].texture.id, DEFAULT_TEXTURE_ID);
        unload_material(material);

        let stats = resource_stats();
        assert_eq!(stats.live(ResourceKind::Material), 0);
        assert_eq!(stats.unloaded(ResourceKind::Shader), 0);
        assert_eq!(stats.unloaded(ResourceKind::Texture), 0);
    }

    #[test]
    fn unload_releases_attached_parts() {
        let mut material = load_material_default();
        let fragment = "#version 330\nuniform float t;\nvoid main() {}\n";
        material.shader = load_shader_from_memory(None, Some(fragment));
        assert_ne!(material.shader.id, DEFAULT_SHADER_ID);
        set_material_texture(&mut material, MaterialMapIndex::Normal, texture());
        unload_material(material);

        let stats = resource_stats();
        assert_eq!(stats.live(ResourceKind::Shader), 0);
        assert_eq!(stats.live(ResourceKind::Texture), 0);
        assert_eq!(stats.stray_releases(), 0);
    }

    #[test]
    fn shared_texture_is_released_twice() {
        let mut material = load_material_default();
        let shared = texture();
        set_material_texture(&mut material, MaterialMapIndex::Albedo, shared);
        set_material_texture(&mut material, MaterialMapIndex::Emission, shared);
        unload_material(material);
        assert_eq!(resource_stats().stray_releases(), 1);
    }

    #[test]
    fn double_unload_is_stray() {
        let material = load_material_default();
        unload_material(material);
        unload_material(material);
        assert_eq!(resource_stats().stray_releases(), 1);
    }
}
