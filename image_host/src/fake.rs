//! In-process plugin tables for tests: hand-written fakes plus the real
//! `red_plugin` entry points linked as an rlib.

use std::cell::Cell;
use std::os::raw::c_char;

use crate::ffi::ImageBuffer;
use crate::plugin_loader::PluginApi;

thread_local! {
    static FREES: Cell<usize> = const { Cell::new(0) };
}

/// Number of `fake_free` calls made on this thread.
pub(crate) fn frees() -> usize {
    FREES.with(Cell::get)
}

fn leak(bytes: Vec<u8>, width: u32, height: u32, channels: u32) -> ImageBuffer {
    let len = bytes.len();
    ImageBuffer {
        data: Box::into_raw(bytes.into_boxed_slice()).cast::<u8>(),
        len,
        width,
        height,
        channels,
    }
}

unsafe extern "C" fn rgba_load(_path: *const c_char) -> ImageBuffer {
    leak(vec![1, 2, 3, 4], 1, 1, 4)
}

unsafe extern "C" fn short_load(_path: *const c_char) -> ImageBuffer {
    leak(vec![1, 2, 3], 1, 1, 4)
}

unsafe extern "C" fn two_channel_load(_path: *const c_char) -> ImageBuffer {
    leak(vec![1, 2], 1, 1, 2)
}

unsafe extern "C" fn null_load(_path: *const c_char) -> ImageBuffer {
    ImageBuffer::null()
}

unsafe extern "C" fn fake_free(img: ImageBuffer) {
    FREES.with(|c| c.set(c.get() + 1));
    if !img.data.is_null() {
        let slice = std::ptr::slice_from_raw_parts_mut(img.data, img.len);
        // SAFETY: every non-null buffer here was leaked by `leak` with this length.
        drop(unsafe { Box::from_raw(slice) });
    }
}

unsafe extern "C" fn failing_save(_path: *const c_char, _img: ImageBuffer) -> bool {
    false
}

unsafe extern "C" fn fake_info(name: *mut c_char, name_max: usize, exts: *mut c_char, exts_max: usize) {
    // SAFETY: the host passes buffers of the stated capacities.
    unsafe {
        write_c_str(b"Fake\0", name, name_max);
        write_c_str(b".PNG; jpg;\0", exts, exts_max);
    }
}

unsafe fn write_c_str(src: &[u8], dst: *mut c_char, capacity: usize) {
    let n = src.len().min(capacity);
    // SAFETY: `n <= capacity`.
    unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), dst.cast::<u8>(), n) };
}

fn fake_api(load: unsafe extern "C" fn(*const c_char) -> ImageBuffer) -> PluginApi {
    // SAFETY: the fakes above honour the buffer ownership contract.
    unsafe { PluginApi::new(load, fake_free, failing_save, fake_info) }
}

pub(crate) fn rgba_api() -> PluginApi {
    fake_api(rgba_load)
}

pub(crate) fn short_api() -> PluginApi {
    fake_api(short_load)
}

pub(crate) fn two_channel_api() -> PluginApi {
    fake_api(two_channel_load)
}

pub(crate) fn null_api() -> PluginApi {
    fake_api(null_load)
}

fn to_host(img: red_plugin::ffi::ImageBuffer) -> ImageBuffer {
    ImageBuffer {
        data: img.data,
        len: img.len,
        width: img.width,
        height: img.height,
        channels: img.channels,
    }
}

fn to_plugin(img: ImageBuffer) -> red_plugin::ffi::ImageBuffer {
    red_plugin::ffi::ImageBuffer {
        data: img.data,
        len: img.len,
        width: img.width,
        height: img.height,
        channels: img.channels,
    }
}

unsafe extern "C" fn red_load(path: *const c_char) -> ImageBuffer {
    to_host(red_plugin::load_image(path))
}

unsafe extern "C" fn red_free(img: ImageBuffer) {
    red_plugin::free_image(to_plugin(img))
}

unsafe extern "C" fn red_save(path: *const c_char, img: ImageBuffer) -> bool {
    red_plugin::save_image(path, to_plugin(img))
}

unsafe extern "C" fn red_info(name: *mut c_char, name_max: usize, exts: *mut c_char, exts_max: usize) {
    red_plugin::get_plugin_info(name, name_max, exts, exts_max)
}

/// The real plugin, called directly instead of through `dlopen`.
pub(crate) fn red_plugin_api() -> PluginApi {
    // SAFETY: the wrappers only convert between two identical `#[repr(C)]` layouts.
    unsafe { PluginApi::new(red_load, red_free, red_save, red_info) }
}

#[test]
fn red_plugin_reports_host_abi_version() {
    assert_eq!(red_plugin::plugin_abi_version(), crate::ffi::ABI_VERSION);
}
