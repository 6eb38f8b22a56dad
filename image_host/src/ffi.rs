use std::os::raw::c_char;

/// Buffer protocol version this host speaks.
pub const ABI_VERSION: u32 = 1;

/// Pixel buffer as laid out by the plugin.
///
/// Null `data` with every other field zero is the failure sentinel.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ImageBuffer {
    /// Start of the plugin-owned pixel bytes.
    pub data: *mut u8,
    /// Byte length of `data`.
    pub len: usize,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per pixel.
    pub channels: u32,
}

impl ImageBuffer {
    /// The failure sentinel.
    pub const fn null() -> Self {
        Self {
            data: std::ptr::null_mut(),
            len: 0,
            width: 0,
            height: 0,
            channels: 0,
        }
    }

    /// Returns true if `data` is populated and `len == width * height * channels`.
    pub fn is_consistent(&self) -> bool {
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|wh| wh.checked_mul(self.channels as usize));

        !self.data.is_null() && self.len > 0 && expected == Some(self.len)
    }
}

/// `load_image`: decodes a path into a plugin-allocated buffer.
pub type LoadImageFn = unsafe extern "C" fn(*const c_char) -> ImageBuffer;

/// `free_image`: releases a buffer returned by `load_image`.
pub type FreeImageFn = unsafe extern "C" fn(ImageBuffer);

/// `save_image`: writes a borrowed buffer to a path.
pub type SaveImageFn = unsafe extern "C" fn(*const c_char, ImageBuffer) -> bool;

/// `get_plugin_info`: fills name and extension buffers of the given capacities.
pub type PluginInfoFn = unsafe extern "C" fn(*mut c_char, usize, *mut c_char, usize);

/// `plugin_abi_version`: protocol version the plugin was built for.
pub type AbiVersionFn = unsafe extern "C" fn() -> u32;
