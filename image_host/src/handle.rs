use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use std::path::Path;

use crate::error::AppError;
use crate::ffi::ImageBuffer;
use crate::plugin_loader::PluginApi;

/// Image buffer owned by the host but allocated by a plugin.
///
/// Borrowing the [`PluginApi`] ties the buffer to the loaded library; dropping
/// the handle hands the buffer back to the plugin's `free_image` exactly once.
#[derive(Debug)]
pub struct LoadedImage<'p> {
    raw: ImageBuffer,
    api: &'p PluginApi,
}

impl<'p> LoadedImage<'p> {
    /// Takes ownership of a non-null buffer returned by `api`'s `load_image`.
    pub(crate) fn new(raw: ImageBuffer, api: &'p PluginApi) -> Self {
        debug_assert!(!raw.data.is_null());
        Self { raw, api }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.raw.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.raw.height
    }

    /// Bytes per pixel.
    pub fn channels(&self) -> u32 {
        self.raw.channels
    }

    /// Pixel bytes, row-major, `width * height * channels` long.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY:
        // - `raw.data` is non-null (checked before construction).
        // - The plugin contract guarantees `raw.len` readable bytes until
        //   `free_image`, which only runs in `Drop`, after every borrow of `self` ends.
        // - `u8` alignment is 1.
        unsafe { std::slice::from_raw_parts(self.raw.data, self.raw.len) }
    }

    /// The raw struct, for passing back across the boundary without giving up ownership.
    pub(crate) fn raw(&self) -> ImageBuffer {
        self.raw
    }

    /// Copies the pixels into an owned `image` crate buffer.
    pub fn to_dynamic_image(&self) -> Result<DynamicImage, AppError> {
        let (width, height) = (self.width(), self.height());
        let data = self.as_bytes().to_vec();

        let image = match self.channels() {
            4 => RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
            3 => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
            1 => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
            other => return Err(AppError::UnsupportedChannels(other)),
        };

        image.ok_or(AppError::InvalidBuffer {
            len: self.raw.len,
            width,
            height,
            channels: self.raw.channels,
        })
    }
}

impl Drop for LoadedImage<'_> {
    fn drop(&mut self) {
        tracing::trace!(len = self.raw.len, "releasing plugin buffer");
        // SAFETY: `raw` came from `api`'s `load_image` and this is its only release.
        unsafe { self.api.release(self.raw) }
    }
}

/// Plugin metadata reported by `get_plugin_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    /// Display name.
    pub name: String,
    /// Supported extensions, lower-case, without a leading dot.
    pub extensions: Vec<String>,
}

impl PluginInfo {
    /// Parses the two NUL-terminated (or full) buffers filled by the plugin.
    pub fn parse(name: &[u8], exts: &[u8]) -> Self {
        let name = until_nul(name).trim().to_string();
        let extensions = until_nul(exts)
            .split(';')
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self { name, extensions }
    }

    /// Returns true if the extension of `path` is in the list, ignoring case.
    pub fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

fn until_nul(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
