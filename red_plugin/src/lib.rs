//! Placeholder image decoder plugin exposed over a C ABI.
//!
//! Exports `load_image`, `free_image`, `save_image`, `get_plugin_info` and
//! `plugin_abi_version`. Buffers returned by `load_image` are allocated here
//! and must come back through `free_image` exactly once.

/// Placeholder decoder.
pub mod decode;

/// Raw header-prefixed writer behind `save_image`.
pub mod encode;

/// Plugin error kinds.
pub mod error;

/// `#[repr(C)]` types and pointer helpers.
pub mod ffi;

use std::os::raw::c_char;

use crate::ffi::{ImageBuffer, PLUGIN_EXTENSIONS, PLUGIN_NAME};

#[unsafe(no_mangle)]
pub extern "C" fn load_image(path: *const c_char) -> ImageBuffer {
    // SAFETY:
    // - `path_from_ptr` handles NULL.
    // - FFI contract requires `path` to be a valid NUL-terminated C string
    //   that remains valid for the duration of this call.
    let Some(path) = (unsafe { ffi::path_from_ptr(path) }) else {
        return ImageBuffer::null();
    };

    match decode::decode_path(path) {
        Ok(pixels) => ImageBuffer::from_pixels(pixels),
        Err(_) => ImageBuffer::null(),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn free_image(img: ImageBuffer) {
    // SAFETY:
    // - FFI contract requires `img` to be the sentinel or a buffer returned by
    //   `load_image` that has not been freed yet.
    // - The reclaimed box is dropped here, releasing the allocation with the
    //   allocator that created it.
    drop(unsafe { img.into_boxed() });
}

#[unsafe(no_mangle)]
pub extern "C" fn save_image(path: *const c_char, img: ImageBuffer) -> bool {
    // SAFETY: same contract as `load_image`.
    let Some(path) = (unsafe { ffi::path_from_ptr(path) }) else {
        return false;
    };

    // SAFETY:
    // - FFI contract requires a non-null `img.data` to point to `img.len` readable bytes.
    // - The caller keeps ownership and must not free the buffer during this call.
    let data = match unsafe { img.as_bytes() } {
        Ok(data) => data,
        Err(_) => return false,
    };

    encode::write_raw(path, img.width, img.height, data).is_ok()
}

#[unsafe(no_mangle)]
pub extern "C" fn get_plugin_info(
    name: *mut c_char,
    name_max: usize,
    exts: *mut c_char,
    exts_max: usize,
) {
    // SAFETY:
    // - NULL destinations and zero capacities are skipped.
    // - FFI contract requires each destination to have at least its stated
    //   capacity of writable bytes; nothing past it is written.
    unsafe {
        ffi::copy_truncated(PLUGIN_NAME, name, name_max);
        ffi::copy_truncated(PLUGIN_EXTENSIONS, exts, exts_max);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn plugin_abi_version() -> u32 {
    ffi::ABI_VERSION
}
