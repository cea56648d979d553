//! Models and their animations.

use std::path::Path;

use crate::errors::{RaywrapError, Result};
use crate::handle::{Owned, Unmanaged};
use crate::math::{BoundingBox, Color, Matrix, Vector3};
use crate::resources::material::{owned_parts, prepare_release, Material, MaterialOwnership};
use crate::resources::mesh::{Mesh, MeshUnmanaged};
use crate::sys::{self, BoneInfo, RawMaterial, RawModel, RawModelAnimation, RawShader, RawTexture, ResourceKind};

/// Meshes, materials and skeleton.
///
/// The library's `unload_model` frees the meshes and the material blocks but
/// leaves shaders and textures alone. The model keeps a [`MaterialOwnership`]
/// per material and releases the owned ones itself, each once, even when
/// several materials point at the same texture.
#[derive(Debug, Default)]
pub struct Model {
    inner: Owned<RawModel>,
    materials: Vec<MaterialOwnership>,
}

/// Releases the owned shaders and textures of every material, de-duplicated
/// by id, then the model itself.
fn release_model(raw: RawModel, ownership: &[MaterialOwnership]) {
    let mut shaders: Vec<RawShader> = Vec::new();
    let mut textures: Vec<RawTexture> = Vec::new();
    for (material, record) in raw.materials.iter().zip(ownership) {
        let (shader, owned) = owned_parts(material, record);
        if let Some(shader) = shader.filter(|s| !shaders.contains(s)) {
            shaders.push(shader);
        }
        for texture in owned {
            if !textures.iter().any(|t| t.id == texture.id) {
                textures.push(texture);
            }
        }
    }
    for shader in shaders {
        sys::unload_shader(shader);
    }
    for texture in textures {
        sys::unload_texture(texture);
    }
    sys::unload_model(raw);
}

impl Model {
    /// Loads an OBJ (with MTL) or glTF file. The model owns every material
    /// and texture the loader created.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = sys::load_model(path);
        let ownership = vec![MaterialOwnership::OWNED; raw.materials.len()];
        if !sys::is_model_ready(&raw) {
            log::warn!("Model {} is not ready", path.display());
            if raw.id != 0 {
                release_model(raw, &ownership);
            }
            return Err(RaywrapError::load_failed(ResourceKind::Model, path.display().to_string()));
        }
        Ok(Self {
            inner: Owned::from_raw(raw),
            materials: ownership,
        })
    }

    /// Promotes a mesh to a model with a default material. The mesh moves in.
    pub fn from_mesh(mesh: Mesh) -> Result<Self> {
        let inner = Owned::from_load(sys::load_model_from_mesh(mesh.into_raw()), "mesh")?;
        let materials = vec![MaterialOwnership::OWNED; inner.raw().materials.len()];
        Ok(Self { inner, materials })
    }

    #[must_use]
    pub fn raw(&self) -> &RawModel {
        self.inner.raw()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    #[must_use]
    pub fn transform(&self) -> Matrix {
        self.raw().transform
    }

    pub fn set_transform(&mut self, transform: Matrix) -> &mut Self {
        self.inner.raw_mut().transform = transform;
        self
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.raw().meshes.len()
    }

    #[must_use]
    pub fn material_count(&self) -> usize {
        self.raw().materials.len()
    }

    /// View of mesh `index`. The model keeps ownership.
    pub fn mesh(&self, index: usize) -> Result<MeshUnmanaged> {
        self.raw()
            .meshes
            .get(index)
            .map(|&mesh| Unmanaged::new(mesh))
            .ok_or_else(|| RaywrapError::IndexOutOfBounds {
                context: "model mesh".into(),
                index,
            })
    }

    pub fn meshes(&self) -> impl Iterator<Item = MeshUnmanaged> + '_ {
        self.raw().meshes.iter().map(|&mesh| Unmanaged::new(mesh))
    }

    pub fn material(&self, index: usize) -> Result<&RawMaterial> {
        self.raw()
            .materials
            .get(index)
            .ok_or_else(|| RaywrapError::IndexOutOfBounds {
                context: "model material".into(),
                index,
            })
    }

    #[must_use]
    pub fn material_ownership(&self, index: usize) -> Option<&MaterialOwnership> {
        self.materials.get(index)
    }

    /// Moves `material` into slot `index`. The material previously there is
    /// released together with the parts it owned.
    pub fn set_material(&mut self, index: usize, material: Material) -> Result<&mut Self> {
        if index >= self.material_count() {
            return Err(RaywrapError::IndexOutOfBounds {
                context: "model material".into(),
                index,
            });
        }
        let (raw, ownership) = material.into_parts();
        let mut old = std::mem::replace(&mut self.inner.raw_mut().materials[index], raw);
        let old_ownership = std::mem::replace(&mut self.materials[index], ownership);
        prepare_release(&mut old, &old_ownership);
        sys::unload_material(old);
        Ok(self)
    }

    pub fn set_mesh_material(&mut self, mesh: usize, material: usize) -> Result<&mut Self> {
        if mesh >= self.mesh_count() {
            return Err(RaywrapError::IndexOutOfBounds {
                context: "model mesh".into(),
                index: mesh,
            });
        }
        if material >= self.material_count() {
            return Err(RaywrapError::IndexOutOfBounds {
                context: "model material".into(),
                index: material,
            });
        }
        sys::set_model_mesh_material(self.inner.raw_mut(), mesh, material);
        Ok(self)
    }

    #[must_use]
    pub fn bones(&self) -> &[BoneInfo] {
        &self.raw().bones
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        sys::get_model_bounding_box(self.raw())
    }

    pub fn draw(&self, position: Vector3, scale: f32, tint: Color) {
        sys::draw_model(self.raw(), position, scale, tint);
    }

    pub fn draw_ex(&self, position: Vector3, axis: Vector3, angle: f32, scale: Vector3, tint: Color) {
        sys::draw_model_ex(self.raw(), position, axis, angle, scale, tint);
    }

    pub fn draw_wires(&self, position: Vector3, scale: f32, tint: Color) {
        sys::draw_model_wires(self.raw(), position, scale, tint);
    }

    #[must_use]
    pub fn is_animation_valid(&self, animation: &ModelAnimation) -> bool {
        sys::is_model_animation_valid(self.raw(), animation.raw())
    }

    /// Skins the meshes to `frame` of `animation`.
    pub fn update_animation(&mut self, animation: &ModelAnimation, frame: i32) -> &mut Self {
        sys::update_model_animation(self.raw(), animation.raw(), frame);
        self
    }

    /// Releases the model and everything it owns. Idempotent.
    pub fn unload(&mut self) {
        let raw = self.inner.take().into_raw();
        if raw.id != 0 {
            release_model(raw, &self.materials);
        }
        self.materials.clear();
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        self.unload();
    }
}

// ============================================================================
// ModelAnimation
// ============================================================================

/// Bone poses for every frame.
pub type ModelAnimation = Owned<RawModelAnimation>;

impl ModelAnimation {
    /// Every animation of a glTF file.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let path = path.as_ref();
        let animations: Vec<Self> = sys::load_model_animations(path)
            .into_iter()
            .map(Self::from_raw)
            .collect();
        if animations.is_empty() {
            return Err(RaywrapError::load_failed(
                ResourceKind::ModelAnimation,
                path.display().to_string(),
            ));
        }
        Ok(animations)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.raw().name
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.raw().bones.len()
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.raw().frame_poses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::image::Image;
    use crate::resources::texture::Texture;
    use crate::sys::MaterialMapIndex;

    #[test]
    fn model_takes_over_the_mesh() {
        let mesh = Mesh::gen_cube(1.0, 1.0, 1.0).unwrap();
        let model = Model::from_mesh(mesh).unwrap();
        assert_eq!(model.mesh_count(), 1);
        drop(model);

        let stats = sys::resource_stats();
        assert_eq!(stats.live(ResourceKind::Mesh), 0);
        assert_eq!(stats.live(ResourceKind::Material), 0);
        assert_eq!(stats.live(ResourceKind::Model), 0);
        assert_eq!(stats.stray_releases(), 0);
    }

    #[test]
    fn material_textures_are_released_with_the_model() {
        let mut model = Model::from_mesh(Mesh::gen_plane(1.0, 1.0, 1, 1).unwrap()).unwrap();
        let image = Image::gen_color(2, 2, Color::BLUE).unwrap();
        let mut material = Material::load_default().unwrap();
        material.set_texture(MaterialMapIndex::Albedo, Texture::from_image(&image).unwrap());
        model.set_material(0, material).unwrap();
        assert!(model.set_material(3, Material::load_default().unwrap()).is_err());

        model.unload();
        model.unload();
        let stats = sys::resource_stats();
        assert_eq!(stats.live(ResourceKind::Texture), 0);
        assert_eq!(stats.live(ResourceKind::Material), 0);
        assert_eq!(stats.stray_releases(), 0);
    }

    #[test]
    fn out_of_range_slots_are_errors() {
        let mut model = Model::from_mesh(Mesh::gen_cube(1.0, 1.0, 1.0).unwrap()).unwrap();
        assert!(model.mesh(1).is_err());
        assert!(matches!(
            model.set_mesh_material(0, 2),
            Err(RaywrapError::IndexOutOfBounds { index: 2, .. })
        ));
    }
}
