use std::fs;
use std::path::Path;

use crate::error::PluginError;

/// Width of the placeholder image produced for a valid source.
pub const PLACEHOLDER_WIDTH: u32 = 1000;

/// Height of the placeholder image produced for a valid source.
pub const PLACEHOLDER_HEIGHT: u32 = 1000;

/// Opaque red, RGBA8.
pub const PLACEHOLDER_PIXEL: [u8; 4] = [255, 0, 0, 255];

/// Decoded pixel data owned on the plugin side.
///
/// `data.len() == width * height * channels` always holds.
#[derive(Debug)]
pub struct Pixels {
    data: Box<[u8]>,
    width: u32,
    height: u32,
    channels: u32,
}

impl Pixels {
    /// Builds a `width` x `height` image where every pixel equals `pixel`.
    ///
    /// The channel count is `pixel.len()`. The pixel data is allocated once,
    /// sized exactly to `width * height * channels`.
    pub fn solid(width: u32, height: u32, pixel: &[u8]) -> Result<Self, PluginError> {
        if pixel.is_empty() || width == 0 || height == 0 {
            return Err(PluginError::DecodeFailure);
        }

        let channels = u32::try_from(pixel.len()).map_err(|_| PluginError::CapacityExceeded)?;
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(PluginError::CapacityExceeded)?;
        count
            .checked_mul(pixel.len())
            .ok_or(PluginError::CapacityExceeded)?;

        Ok(Self {
            data: pixel.repeat(count).into_boxed_slice(),
            width,
            height,
            channels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn into_parts(self) -> (Box<[u8]>, u32, u32, u32) {
        (self.data, self.width, self.height, self.channels)
    }
}

/// Decodes the image at `path`.
///
/// Stand-in decoder: an existing regular file of exactly zero bytes yields a
/// solid red `PLACEHOLDER_WIDTH` x `PLACEHOLDER_HEIGHT` RGBA image, anything
/// else is rejected. Nothing is allocated on the rejection paths.
pub fn decode_path(path: &Path) -> Result<Pixels, PluginError> {
    let meta = fs::metadata(path).map_err(|_| PluginError::SourceNotFound)?;
    if !meta.is_file() {
        return Err(PluginError::SourceNotFound);
    }
    if meta.len() != 0 {
        return Err(PluginError::UnsupportedFormat);
    }

    Pixels::solid(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, &PLACEHOLDER_PIXEL)
}
