//! Materials and the ownership of their parts.
//!
//! A material references a shader and up to [`MAX_MATERIAL_MAPS`] textures.
//! Each of those parts is either owned by the material or borrowed from
//! someone else, which is recorded in a [`MaterialOwnership`]. Before the
//! library's `unload_material` runs, borrowed parts are detached and
//! textures referenced from several maps are kept only once, so every part
//! is released exactly once by exactly one owner.

use std::path::Path;

use crate::errors::{RaywrapError, Result};
use crate::handle::{AsRaw, Owned, Ownership, Unmanaged};
use crate::math::Color;
use crate::resources::shader::{Shader, ShaderUnmanaged};
use crate::resources::texture::{Texture, TextureUnmanaged};
use crate::sys::{
    self, MaterialMapIndex, RawMaterial, RawShader, RawTexture, ResourceKind, DEFAULT_SHADER_ID,
    DEFAULT_TEXTURE_ID, MAX_MATERIAL_MAPS,
};

/// Which parts of a material it releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialOwnership {
    pub shader: Ownership,
    pub maps: [Ownership; MAX_MATERIAL_MAPS],
}

impl MaterialOwnership {
    /// Everything owned: what a loader hands back.
    pub const OWNED: Self = Self {
        shader: Ownership::Owned,
        maps: [Ownership::Owned; MAX_MATERIAL_MAPS],
    };
}

fn is_builtin_shader(shader: RawShader) -> bool {
    shader.id == 0 || shader.locs == sys::get_shader_default().locs
}

fn is_builtin_texture(texture: RawTexture) -> bool {
    texture.id == 0 || texture.id == DEFAULT_TEXTURE_ID
}

/// Clears borrowed parts and duplicate texture references so that
/// `unload_material` releases each owned part once.
///
/// The library never frees a program with the default id, so a default
/// program with a location table of its own is released here.
pub(crate) fn prepare_release(raw: &mut RawMaterial, ownership: &MaterialOwnership) {
    match ownership.shader {
        Ownership::Borrowed => raw.shader = sys::get_shader_default(),
        Ownership::Owned if raw.shader.id == DEFAULT_SHADER_ID && !is_builtin_shader(raw.shader) => {
            sys::unload_shader(raw.shader);
            raw.shader = sys::get_shader_default();
        }
        Ownership::Owned => {}
    }

    let mut seen: Vec<u32> = Vec::new();
    for (map, owned) in raw.maps.iter_mut().zip(ownership.maps) {
        let id = map.texture.id;
        if owned == Ownership::Borrowed || seen.contains(&id) {
            map.texture = RawTexture::default();
        } else if !is_builtin_texture(map.texture) {
            seen.push(id);
        }
    }
}

/// Owned shader and texture handles of a material, without duplicates.
pub(crate) fn owned_parts(raw: &RawMaterial, ownership: &MaterialOwnership) -> (Option<RawShader>, Vec<RawTexture>) {
    let shader = (ownership.shader == Ownership::Owned && !is_builtin_shader(raw.shader)).then_some(raw.shader);
    let mut textures: Vec<RawTexture> = Vec::new();
    for (map, owned) in raw.maps.iter().zip(ownership.maps) {
        if owned == Ownership::Owned
            && !is_builtin_texture(map.texture)
            && !textures.iter().any(|t| t.id == map.texture.id)
        {
            textures.push(map.texture);
        }
    }
    (shader, textures)
}

// ============================================================================
// Material
// ============================================================================

/// Shader plus texture maps, with a per-part ownership record.
#[derive(Debug, Default)]
pub struct Material {
    inner: Owned<RawMaterial>,
    ownership: MaterialOwnership,
}

impl Material {
    /// Default shader and the white default texture.
    pub fn load_default() -> Result<Self> {
        Ok(Self::from_raw(
            Owned::from_load(sys::load_material_default(), "defaults")?.into_raw(),
            MaterialOwnership::OWNED,
        ))
    }

    /// Every material of an MTL library. The materials own their textures.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let materials: Vec<Self> = sys::load_materials(path)
            .into_iter()
            .map(|raw| Self::from_raw(raw, MaterialOwnership::OWNED))
            .collect();
        if materials.is_empty() || !materials.iter().all(Material::is_ready) {
            return Err(RaywrapError::load_failed(ResourceKind::Material, origin));
        }
        Ok(materials)
    }

    /// Takes a raw material together with the record of what it owns.
    #[must_use]
    pub fn from_raw(raw: RawMaterial, ownership: MaterialOwnership) -> Self {
        Self {
            inner: Owned::from_raw(raw),
            ownership,
        }
    }

    /// Gives up the material without releasing anything.
    #[must_use = "the returned material has to be unloaded by the caller"]
    pub fn into_parts(mut self) -> (RawMaterial, MaterialOwnership) {
        (self.inner.take().into_raw(), self.ownership)
    }

    #[must_use]
    pub fn raw(&self) -> &RawMaterial {
        self.inner.raw()
    }

    #[must_use]
    pub fn ownership(&self) -> &MaterialOwnership {
        &self.ownership
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    #[must_use]
    pub fn shader(&self) -> ShaderUnmanaged {
        Unmanaged::new(self.raw().shader)
    }

    #[must_use]
    pub fn texture(&self, map: MaterialMapIndex) -> TextureUnmanaged {
        Unmanaged::new(self.raw().maps[map as usize].texture)
    }

    #[must_use]
    pub fn color(&self, map: MaterialMapIndex) -> Color {
        self.raw().maps[map as usize].color
    }

    #[must_use]
    pub fn value(&self, map: MaterialMapIndex) -> f32 {
        self.raw().maps[map as usize].value
    }

    /// Moves `shader` in; the material releases it.
    pub fn set_shader(&mut self, shader: Shader) -> &mut Self {
        self.replace_shader(shader.into_raw(), Ownership::Owned);
        self
    }

    /// Uses `shader` without taking it over. It must outlive the material.
    pub fn share_shader(&mut self, shader: &impl AsRaw<RawShader>) -> &mut Self {
        self.replace_shader(*shader.as_raw(), Ownership::Borrowed);
        self
    }

    /// Moves `texture` into slot `map`; the material releases it.
    pub fn set_texture(&mut self, map: MaterialMapIndex, texture: Texture) -> &mut Self {
        self.replace_texture(map, texture.into_raw(), Ownership::Owned);
        self
    }

    /// Uses `texture` in slot `map` without taking it over.
    pub fn share_texture(&mut self, map: MaterialMapIndex, texture: &impl AsRaw<RawTexture>) -> &mut Self {
        self.replace_texture(map, *texture.as_raw(), Ownership::Borrowed);
        self
    }

    pub fn set_color(&mut self, map: MaterialMapIndex, color: Color) -> &mut Self {
        self.inner.raw_mut().maps[map as usize].color = color;
        self
    }

    pub fn set_value(&mut self, map: MaterialMapIndex, value: f32) -> &mut Self {
        self.inner.raw_mut().maps[map as usize].value = value;
        self
    }

    /// Releases the material and the parts it owns. Idempotent.
    pub fn unload(&mut self) {
        prepare_release(self.inner.raw_mut(), &self.ownership);
        self.inner.unload();
        self.ownership = MaterialOwnership::OWNED;
    }

    fn replace_shader(&mut self, shader: RawShader, ownership: Ownership) {
        let old = self.raw().shader;
        if self.ownership.shader == Ownership::Owned && !is_builtin_shader(old) && old != shader {
            sys::unload_shader(old);
        }
        self.inner.raw_mut().shader = shader;
        self.ownership.shader = ownership;
    }

    fn replace_texture(&mut self, map: MaterialMapIndex, texture: RawTexture, ownership: Ownership) {
        let slot = map as usize;
        let old = self.raw().maps[slot].texture;
        if self.ownership.maps[slot] == Ownership::Owned && !is_builtin_texture(old) && old.id != texture.id {
            let others: Vec<usize> = self
                .raw()
                .maps
                .iter()
                .enumerate()
                .filter(|(i, m)| *i != slot && m.texture.id == old.id)
                .map(|(i, _)| i)
                .collect();
            if others.iter().all(|&i| self.ownership.maps[i] == Ownership::Borrowed) {
                match others.first() {
                    // The texture stays in use; the remaining slot takes over its release.
                    Some(&heir) => self.ownership.maps[heir] = Ownership::Owned,
                    None => sys::unload_texture(old),
                }
            }
        }
        self.inner.raw_mut().maps[slot].texture = texture;
        self.ownership.maps[slot] = ownership;
    }
}

impl Drop for Material {
    fn drop(&mut self) {
        prepare_release(self.inner.raw_mut(), &self.ownership);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::image::Image;

    fn texture() -> Texture {
        let image = Image::gen_color(2, 2, Color::RED).unwrap();
        Texture::from_image(&image).unwrap()
    }

    #[test]
    fn shared_texture_in_two_maps_is_released_once() {
        let mut material = Material::load_default().unwrap();
        let owned = texture();
        let raw = *owned.raw();
        material.set_texture(MaterialMapIndex::Albedo, owned);
        material.share_texture(MaterialMapIndex::Emission, &Unmanaged::new(raw));
        drop(material);

        let stats = sys::resource_stats();
        assert_eq!(stats.live(ResourceKind::Texture), 0);
        assert_eq!(stats.stray_releases(), 0);
    }

    #[test]
    fn replacing_an_owned_texture_hands_release_to_a_sharing_slot() {
        let mut material = Material::load_default().unwrap();
        let first = texture();
        let raw = *first.raw();
        material.set_texture(MaterialMapIndex::Albedo, first);
        material.share_texture(MaterialMapIndex::Emission, &Unmanaged::new(raw));

        material.set_texture(MaterialMapIndex::Albedo, texture());
        assert!(sys::is_texture_ready(raw));
        assert_eq!(material.ownership().maps[MaterialMapIndex::Emission as usize], Ownership::Owned);

        drop(material);
        let stats = sys::resource_stats();
        assert_eq!(stats.live(ResourceKind::Texture), 0);
        assert_eq!(stats.stray_releases(), 0);
    }

    #[test]
    fn borrowed_shader_survives() {
        let shader = Shader::load_from_memory(None, Some("#version 330\nvoid main() {}\n")).unwrap();
        let mut a = Material::load_default().unwrap();
        let mut b = Material::load_default().unwrap();
        a.share_shader(&shader);
        b.share_shader(&shader);
        drop(a);
        drop(b);
        assert!(shader.is_ready());
        drop(shader);
        assert_eq!(sys::resource_stats().live(ResourceKind::Shader), 0);
        assert_eq!(sys::resource_stats().stray_releases(), 0);
    }

    #[test]
    fn replacing_an_owned_texture_releases_it() {
        let mut material = Material::load_default().unwrap();
        material.set_texture(MaterialMapIndex::Albedo, texture());
        material.set_texture(MaterialMapIndex::Albedo, texture());
        assert_eq!(sys::resource_stats().live(ResourceKind::Texture), 1);
        material.unload();
        material.unload();
        assert_eq!(sys::resource_stats().live(ResourceKind::Texture), 0);
        assert_eq!(sys::resource_stats().stray_releases(), 0);
    }
}
