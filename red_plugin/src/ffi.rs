use std::ffi::CStr;
use std::os::raw::c_char;
use std::path::Path;

use crate::decode::Pixels;
use crate::error::PluginError;

/// Version of the exported function set. Hosts refuse a plugin reporting another value.
pub const ABI_VERSION: u32 = 1;

/// Display name reported by `get_plugin_info`.
pub const PLUGIN_NAME: &str = "Red Image Plugin";

/// Supported extensions: lower-case, no leading dot, `;`-separated.
pub const PLUGIN_EXTENSIONS: &str = "red;test;special";

/// Pixel buffer passed across the C boundary.
///
/// A buffer returned by `load_image` is owned by the caller and must be given
/// back to `free_image` exactly once. The all-zero value with a null `data`
/// pointer is the failure sentinel.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ImageBuffer {
    pub data: *mut u8,
    pub len: usize,
    pub width: u32,
    pub height: u32,
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

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    /// `width * height * channels`, or `None` on overflow.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.channels as usize)
    }

    /// Checks the field invariant for both the sentinel and a populated buffer.
    pub fn is_consistent(&self) -> bool {
        if self.data.is_null() {
            self.len == 0 && self.width == 0 && self.height == 0 && self.channels == 0
        } else {
            self.len > 0 && self.expected_len() == Some(self.len)
        }
    }

    /// Leaks `pixels` into a raw buffer whose ownership moves to the caller.
    pub fn from_pixels(pixels: Pixels) -> Self {
        let (data, width, height, channels) = pixels.into_parts();
        let len = data.len();
        if len == 0 {
            return Self::null();
        }

        Self {
            data: Box::into_raw(data).cast::<u8>(),
            len,
            width,
            height,
            channels,
        }
    }

    /// Takes the allocation back, or `None` for the sentinel.
    ///
    /// # Safety
    /// A non-null buffer must have been produced by [`ImageBuffer::from_pixels`]
    /// with `data` and `len` untouched, and must not have been reclaimed before.
    pub unsafe fn into_boxed(self) -> Option<Box<[u8]>> {
        if self.data.is_null() {
            return None;
        }

        let slice = std::ptr::slice_from_raw_parts_mut(self.data, self.len);
        // SAFETY:
        // - `slice` is exactly the `Box<[u8]>` leaked by `from_pixels`, same pointer and length.
        // - The caller guarantees this is the only reclaim of that allocation.
        Some(unsafe { Box::from_raw(slice) })
    }

    /// Borrows the pixel bytes of a consistent buffer. The sentinel yields an
    /// empty slice without reading `data`.
    ///
    /// # Safety
    /// A non-null `data` must point to `len` readable bytes that stay valid and
    /// unmodified for the lifetime of the returned slice.
    pub unsafe fn as_bytes(&self) -> Result<&[u8], PluginError> {
        if !self.is_consistent() {
            return Err(PluginError::InvalidBuffer);
        }
        if self.data.is_null() {
            return Ok(&[]);
        }

        // SAFETY: non-null, `u8` alignment is 1, readability is the caller's contract.
        Ok(unsafe { std::slice::from_raw_parts(self.data, self.len) })
    }
}

/// Reads a NUL-terminated path.
///
/// On Unix any byte string is accepted; elsewhere the path must be UTF-8.
///
/// # Safety
/// `ptr` must be null or a valid NUL-terminated C string living for `'a`.
pub unsafe fn path_from_ptr<'a>(ptr: *const c_char) -> Option<&'a Path> {
    if ptr.is_null() {
        return None;
    }

    // SAFETY: non-null, termination and lifetime are the caller's contract.
    let c_str = unsafe { CStr::from_ptr(ptr) };
    bytes_to_path(c_str.to_bytes())
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> Option<&Path> {
    use std::os::unix::ffi::OsStrExt;

    Some(Path::new(std::ffi::OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> Option<&Path> {
    std::str::from_utf8(bytes).ok().map(Path::new)
}

/// Copies `src` into `dst`, truncating to `capacity - 1` bytes and appending a NUL.
///
/// Returns the number of string bytes copied. Writes nothing when `dst` is
/// null or `capacity` is 0, and never touches `dst[capacity..]`.
///
/// # Safety
/// `dst` must be null or valid for `capacity` bytes of writes.
pub unsafe fn copy_truncated(src: &str, dst: *mut c_char, capacity: usize) -> usize {
    if dst.is_null() || capacity == 0 {
        return 0;
    }

    let n = src.len().min(capacity - 1);
    // SAFETY: `n + 1 <= capacity` and the caller guarantees `capacity` writable bytes.
    let out = unsafe { std::slice::from_raw_parts_mut(dst.cast::<u8>(), n + 1) };
    out[..n].copy_from_slice(&src.as_bytes()[..n]);
    out[n] = 0;
    n
}
