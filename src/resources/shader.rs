//! Shader programs.

use std::path::Path;

use crate::errors::Result;
use crate::handle::{Owned, Unmanaged};
use crate::resources::texture::TextureDraw;
use crate::sys::{self, RawShader, ShaderLocationIndex, ShaderValue};

/// Program plus its location table, released together.
pub type Shader = Owned<RawShader>;

pub type ShaderUnmanaged = Unmanaged<RawShader>;

impl Shader {
    /// Loads stage files; `None` uses the default stage.
    pub fn load(vs_path: Option<&Path>, fs_path: Option<&Path>) -> Result<Self> {
        let origin = [vs_path, fs_path]
            .iter()
            .flatten()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        Self::from_load(sys::load_shader(vs_path, fs_path), origin)
    }

    pub fn load_from_memory(vs_code: Option<&str>, fs_code: Option<&str>) -> Result<Self> {
        Self::from_load(sys::load_shader_from_memory(vs_code, fs_code), "shader source")
    }

    /// The built-in program. Never released.
    #[must_use]
    pub fn default_shader() -> ShaderUnmanaged {
        Unmanaged::new(sys::get_shader_default())
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.raw().id
    }

    /// Location of a uniform, -1 when the program has none by that name.
    #[must_use]
    pub fn location(&self, name: &str) -> i32 {
        sys::get_shader_location(*self.raw(), name)
    }

    #[must_use]
    pub fn location_attrib(&self, name: &str) -> i32 {
        sys::get_shader_location_attrib(*self.raw(), name)
    }

    #[must_use]
    pub fn loc(&self, index: ShaderLocationIndex) -> i32 {
        sys::get_shader_loc(*self.raw(), index)
    }

    pub fn set_loc(&mut self, index: ShaderLocationIndex, location: i32) -> &mut Self {
        sys::set_shader_loc(*self.raw(), index, location);
        self
    }

    pub fn set_value(&mut self, location: i32, value: impl Into<ShaderValue>) -> &mut Self {
        sys::set_shader_value(*self.raw(), location, value.into());
        self
    }

    pub fn set_value_texture(&mut self, location: i32, texture: &impl TextureDraw) -> &mut Self {
        sys::set_shader_value_texture(*self.raw(), location, *texture.as_raw());
        self
    }

    #[must_use]
    pub fn value(&self, location: i32) -> Option<ShaderValue> {
        sys::get_shader_value(*self.raw(), location)
    }

    /// Draws with this program until the guard is dropped.
    #[must_use = "the mode ends when the guard is dropped"]
    pub fn begin(&self) -> ShaderMode<'_> {
        sys::begin_shader_mode(*self.raw());
        ShaderMode { _shader: self }
    }
}

/// Active shader mode. Dropping it calls `end_shader_mode`.
#[derive(Debug)]
pub struct ShaderMode<'a> {
    _shader: &'a Shader,
}

impl Drop for ShaderMode<'_> {
    fn drop(&mut self) {
        sys::end_shader_mode();
    }
}
