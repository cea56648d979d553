//! Meshes.

use std::path::Path;

use crate::errors::{RaywrapError, Result};
use crate::handle::{AsRaw, Owned, Unmanaged};
use crate::math::{BoundingBox, Matrix, Vector3};
use crate::resources::image::Image;
use crate::resources::material::Material;
use crate::sys::{self, MeshData, RawMesh};

/// Vertex data plus its GPU buffers, released as one unit.
pub type Mesh = Owned<RawMesh>;

/// A mesh owned by a model.
pub type MeshUnmanaged = Unmanaged<RawMesh>;

/// Read-only operations shared by owned meshes and model meshes.
pub trait MeshOps: AsRaw<RawMesh> {
    fn vertex_count(&self) -> i32 {
        self.as_raw().vertex_count
    }

    fn triangle_count(&self) -> i32 {
        self.as_raw().triangle_count
    }

    fn is_uploaded(&self) -> bool {
        self.as_raw().vao_id != 0
    }

    /// Copy of the CPU attributes.
    fn data(&self) -> Option<MeshData> {
        sys::get_mesh_data(*self.as_raw())
    }

    fn bounding_box(&self) -> BoundingBox {
        sys::get_mesh_bounding_box(*self.as_raw())
    }

    /// Writes the mesh as Wavefront OBJ.
    fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if sys::export_mesh(*self.as_raw(), path) {
            Ok(())
        } else {
            Err(RaywrapError::ExportFailed(path.display().to_string()))
        }
    }

    fn draw(&self, material: &Material, transform: Matrix) {
        sys::draw_mesh(*self.as_raw(), material.raw(), transform);
    }

    fn draw_instanced(&self, material: &Material, transforms: &[Matrix]) {
        sys::draw_mesh_instanced(*self.as_raw(), material.raw(), transforms);
    }
}

impl<T: AsRaw<RawMesh>> MeshOps for T {}

impl Mesh {
    /// Registers CPU vertex data. Call [`Mesh::upload`] before drawing.
    pub fn from_data(data: MeshData) -> Result<Self> {
        Self::from_load(sys::load_mesh_data(data), "vertex data")
    }

    pub fn gen_poly(sides: i32, radius: f32) -> Result<Self> {
        Self::from_load(sys::gen_mesh_poly(sides, radius), "poly generator")
    }

    pub fn gen_plane(width: f32, length: f32, res_x: i32, res_z: i32) -> Result<Self> {
        Self::from_load(sys::gen_mesh_plane(width, length, res_x, res_z), "plane generator")
    }

    pub fn gen_cube(width: f32, height: f32, length: f32) -> Result<Self> {
        Self::from_load(sys::gen_mesh_cube(width, height, length), "cube generator")
    }

    pub fn gen_sphere(radius: f32, rings: i32, slices: i32) -> Result<Self> {
        Self::from_load(sys::gen_mesh_sphere(radius, rings, slices), "sphere generator")
    }

    pub fn gen_hemisphere(radius: f32, rings: i32, slices: i32) -> Result<Self> {
        Self::from_load(sys::gen_mesh_hemisphere(radius, rings, slices), "hemisphere generator")
    }

    pub fn gen_cylinder(radius: f32, height: f32, slices: i32) -> Result<Self> {
        Self::from_load(sys::gen_mesh_cylinder(radius, height, slices), "cylinder generator")
    }

    pub fn gen_cone(radius: f32, height: f32, slices: i32) -> Result<Self> {
        Self::from_load(sys::gen_mesh_cone(radius, height, slices), "cone generator")
    }

    /// Terrain from the brightness of `heightmap`, scaled to `size`.
    pub fn gen_heightmap(heightmap: &Image, size: Vector3) -> Result<Self> {
        Self::from_load(sys::gen_mesh_heightmap(*heightmap.raw(), size), "heightmap")
    }

    pub fn upload(&mut self, dynamic: bool) -> &mut Self {
        sys::upload_mesh(self.raw_mut(), dynamic);
        self
    }

    /// Overwrites part of vertex buffer `index`; `offset` is in bytes.
    pub fn update_buffer(&mut self, index: usize, bytes: &[u8], offset: usize) -> &mut Self {
        sys::update_mesh_buffer(*self.raw(), index, bytes, offset);
        self
    }

    pub fn gen_tangents(&mut self) -> &mut Self {
        sys::gen_mesh_tangents(self.raw_mut());
        self
    }
}
