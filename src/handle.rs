//! Resource Ownership
//!
//! Every wrapped resource is an [`Owned<R>`] over one of the library's raw
//! handles. The owner releases the handle exactly once: on [`Owned::unload`]
//! or on drop, whichever comes first. Moving an `Owned` moves the handle;
//! [`Owned::take`] moves it out explicitly and leaves an empty owner behind.
//!
//! [`Unmanaged<R>`] is the non-owning view. It exposes the same read-only
//! surface but never releases anything, which makes it the right type for
//! pieces of a composite (a mesh inside a model, the atlas of a font) and for
//! the library's built-in objects (default font, default shader).
//!
//! Both types are `!Send` and `!Sync`: handles only mean something on the
//! thread whose library context created them.
//!
//! Only CPU-side resources can be cloned:
//!
//! ```
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::Image>();
//! copyable::<raywrap::Wave>();
//! ```
//!
//! GPU and device objects cannot:
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::Texture>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::RenderTexture>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::Shader>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::Font>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::Mesh>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::Material>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::Model>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::ModelAnimation>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::Sound>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::Music>();
//! ```
//!
//! ```compile_fail
//! fn copyable<T: Clone>() {}
//! copyable::<raywrap::AudioStream>();
//! ```
//!
//! ```compile_fail
//! fn needs_send<T: Send>(_: T) {}
//! needs_send(raywrap::Image::default());
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::errors::{RaywrapError, Result};
use crate::sys::{self, ResourceKind};

/// A raw library handle that can be released.
pub trait NativeResource: Default {
    const KIND: ResourceKind;

    /// The library's readiness predicate.
    fn is_ready(&self) -> bool;

    /// Cheap check that something is allocated at all. A handle can hold a
    /// resource without being ready (a half-built mesh, for instance).
    fn holds_resource(&self) -> bool;

    /// Calls the matching unload primitive.
    fn release(self);
}

/// Read access to the raw handle, shared by owners and views.
pub trait AsRaw<R> {
    fn as_raw(&self) -> &R;
}

/// Whether a composite releases a part it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// Released together with the composite.
    #[default]
    Owned,
    /// Someone else releases it; the composite detaches it first.
    Borrowed,
}

// ============================================================================
// Owned
// ============================================================================

/// Exclusive owner of a raw handle.
pub struct Owned<R: NativeResource> {
    raw: R,
    _not_send: PhantomData<*const ()>,
}

impl<R: NativeResource> Owned<R> {
    /// Takes ownership of a handle obtained elsewhere.
    #[must_use]
    pub fn from_raw(raw: R) -> Self {
        Self {
            raw,
            _not_send: PhantomData,
        }
    }

    /// Wraps the result of a load primitive.
    ///
    /// A handle that is not ready becomes [`RaywrapError::LoadFailed`]; if the
    /// library allocated anything for it, that is released first.
    pub fn from_load(raw: R, origin: impl Into<String>) -> Result<Self> {
        if raw.is_ready() {
            return Ok(Self::from_raw(raw));
        }
        let origin = origin.into();
        log::warn!("{} from {origin} is not ready", R::KIND);
        if raw.holds_resource() {
            raw.release();
        }
        Err(RaywrapError::load_failed(R::KIND, origin))
    }

    /// Gives up ownership without releasing. The caller now has to unload
    /// the handle.
    #[must_use = "the returned handle has to be unloaded by the caller"]
    pub fn into_raw(mut self) -> R {
        std::mem::take(&mut self.raw)
    }

    /// Moves the handle into a new owner, leaving `self` empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self::from_raw(std::mem::take(&mut self.raw))
    }

    pub fn raw(&self) -> &R {
        &self.raw
    }

    /// Mutable access for primitives that update the handle in place.
    /// Replacing the handle outright leaks the old one.
    pub fn raw_mut(&mut self) -> &mut R {
        &mut self.raw
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.raw.is_ready()
    }

    /// Releases the handle now. Calling it again, or dropping afterwards,
    /// does nothing.
    pub fn unload(&mut self) {
        if self.raw.holds_resource() {
            log::debug!("Releasing {}", R::KIND);
            std::mem::take(&mut self.raw).release();
        }
    }

    /// A non-owning view of the same handle. The view must not outlive this
    /// owner's handle.
    #[must_use]
    pub fn view(&self) -> Unmanaged<R>
    where
        R: Clone,
    {
        Unmanaged::new(self.raw.clone())
    }
}

impl<R: NativeResource> Default for Owned<R> {
    fn default() -> Self {
        Self::from_raw(R::default())
    }
}

impl<R: NativeResource> Drop for Owned<R> {
    fn drop(&mut self) {
        self.unload();
    }
}

impl<R: NativeResource> AsRaw<R> for Owned<R> {
    fn as_raw(&self) -> &R {
        &self.raw
    }
}

impl<R: NativeResource + fmt::Debug> fmt::Debug for Owned<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.raw).finish()
    }
}

// ============================================================================
// Unmanaged
// ============================================================================

/// Non-owning view of a raw handle. Never releases.
pub struct Unmanaged<R> {
    raw: R,
    _not_send: PhantomData<*const ()>,
}

impl<R> Unmanaged<R> {
    #[must_use]
    pub fn new(raw: R) -> Self {
        Self {
            raw,
            _not_send: PhantomData,
        }
    }

    pub fn raw(&self) -> &R {
        &self.raw
    }

    pub fn into_raw(self) -> R {
        self.raw
    }
}

impl<R: NativeResource> Unmanaged<R> {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.raw.is_ready()
    }
}

impl<R: Clone> Clone for Unmanaged<R> {
    fn clone(&self) -> Self {
        Self::new(self.raw.clone())
    }
}

impl<R> AsRaw<R> for Unmanaged<R> {
    fn as_raw(&self) -> &R {
        &self.raw
    }
}

impl<R: fmt::Debug> fmt::Debug for Unmanaged<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unmanaged").field(&self.raw).finish()
    }
}

// ============================================================================
// Library handles
// ============================================================================

impl NativeResource for sys::RawImage {
    const KIND: ResourceKind = ResourceKind::Image;

    fn is_ready(&self) -> bool {
        sys::is_image_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.data != 0
    }

    fn release(self) {
        sys::unload_image(self);
    }
}

impl NativeResource for sys::RawTexture {
    const KIND: ResourceKind = ResourceKind::Texture;

    fn is_ready(&self) -> bool {
        sys::is_texture_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.id != 0
    }

    fn release(self) {
        sys::unload_texture(self);
    }
}

impl NativeResource for sys::RawRenderTexture {
    const KIND: ResourceKind = ResourceKind::RenderTexture;

    fn is_ready(&self) -> bool {
        sys::is_render_texture_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.id != 0
    }

    fn release(self) {
        sys::unload_render_texture(self);
    }
}

impl NativeResource for sys::RawShader {
    const KIND: ResourceKind = ResourceKind::Shader;

    fn is_ready(&self) -> bool {
        sys::is_shader_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.id != 0
    }

    fn release(self) {
        sys::unload_shader(self);
    }
}

impl NativeResource for sys::RawMaterial {
    const KIND: ResourceKind = ResourceKind::Material;

    fn is_ready(&self) -> bool {
        sys::is_material_ready(self)
    }

    fn holds_resource(&self) -> bool {
        self.id != 0
    }

    fn release(self) {
        sys::unload_material(self);
    }
}

impl NativeResource for sys::RawMesh {
    const KIND: ResourceKind = ResourceKind::Mesh;

    fn is_ready(&self) -> bool {
        sys::is_mesh_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.data != 0 || self.vao_id != 0
    }

    fn release(self) {
        sys::unload_mesh(self);
    }
}

impl NativeResource for sys::RawModel {
    const KIND: ResourceKind = ResourceKind::Model;

    fn is_ready(&self) -> bool {
        sys::is_model_ready(self)
    }

    fn holds_resource(&self) -> bool {
        self.id != 0
    }

    fn release(self) {
        sys::unload_model(self);
    }
}

impl NativeResource for sys::RawModelAnimation {
    const KIND: ResourceKind = ResourceKind::ModelAnimation;

    fn is_ready(&self) -> bool {
        self.id != 0 && !self.frame_poses.is_empty()
    }

    fn holds_resource(&self) -> bool {
        self.id != 0
    }

    fn release(self) {
        sys::unload_model_animation(self);
    }
}

impl NativeResource for sys::RawFont {
    const KIND: ResourceKind = ResourceKind::Font;

    fn is_ready(&self) -> bool {
        sys::is_font_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.glyphs != 0 || self.texture.id != 0
    }

    fn release(self) {
        sys::unload_font(self);
    }
}

impl NativeResource for sys::RawWave {
    const KIND: ResourceKind = ResourceKind::Wave;

    fn is_ready(&self) -> bool {
        sys::is_wave_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.data != 0
    }

    fn release(self) {
        sys::unload_wave(self);
    }
}

impl NativeResource for sys::RawSound {
    const KIND: ResourceKind = ResourceKind::Sound;

    fn is_ready(&self) -> bool {
        sys::is_sound_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.stream.buffer != 0
    }

    fn release(self) {
        sys::unload_sound(self);
    }
}

impl NativeResource for sys::RawMusic {
    const KIND: ResourceKind = ResourceKind::Music;

    fn is_ready(&self) -> bool {
        sys::is_music_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.ctx_data != 0
    }

    fn release(self) {
        sys::unload_music_stream(self);
    }
}

impl NativeResource for sys::RawAudioStream {
    const KIND: ResourceKind = ResourceKind::AudioStream;

    fn is_ready(&self) -> bool {
        sys::is_audio_stream_ready(*self)
    }

    fn holds_resource(&self) -> bool {
        self.buffer != 0
    }

    fn release(self) {
        sys::unload_audio_stream(self);
    }
}
