use libloading::{Library, Symbol};
use std::ffi::CString;
use std::os::raw::c_char;
use std::path::Path;

use crate::error::AppError;
use crate::ffi::{
    ABI_VERSION, AbiVersionFn, FreeImageFn, ImageBuffer, LoadImageFn, PluginInfoFn, SaveImageFn,
};
use crate::handle::{LoadedImage, PluginInfo};

/// Capacity handed to `get_plugin_info` for each output string.
pub const INFO_CAPACITY: usize = 256;

/// Platform file name of a plugin library, e.g. `libred_plugin.so`.
pub fn lib_filename(plugin_name: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{plugin_name}.dll")
    } else if cfg!(target_os = "macos") {
        format!("lib{plugin_name}.dylib")
    } else {
        format!("lib{plugin_name}.so")
    }
}

/// Function table of the image buffer protocol.
///
/// Every method is safe to call; the unsafety is concentrated in
/// [`PluginApi::new`].
#[derive(Debug)]
pub struct PluginApi {
    load_image: LoadImageFn,
    free_image: FreeImageFn,
    save_image: SaveImageFn,
    get_plugin_info: PluginInfoFn,
}

impl PluginApi {
    /// Builds a function table from raw entry points.
    ///
    /// # SAFETY
    /// The caller must ensure the functions:
    /// - have exactly the `ffi` signatures and the C ABI,
    /// - stay callable for the lifetime of the returned value,
    /// - follow the ownership contract: every non-null buffer from `load_image`
    ///   is released by the matching `free_image`, `save_image` only reads the
    ///   buffer, `get_plugin_info` writes within the given capacities.
    pub unsafe fn new(
        load_image: LoadImageFn,
        free_image: FreeImageFn,
        save_image: SaveImageFn,
        get_plugin_info: PluginInfoFn,
    ) -> Self {
        Self {
            load_image,
            free_image,
            save_image,
            get_plugin_info,
        }
    }

    /// Decodes `path` through the plugin.
    ///
    /// The returned handle releases the buffer when dropped. A buffer whose
    /// fields disagree is released before the error is returned.
    pub fn load(&self, path: &Path) -> Result<LoadedImage<'_>, AppError> {
        let c_path = c_path(path)?;

        // SAFETY:
        // - `c_path` is a valid NUL-terminated string alive for the whole call.
        // - The function matches `LoadImageFn` per the contract of `PluginApi::new`.
        let raw = unsafe { (self.load_image)(c_path.as_ptr()) };

        if raw.data.is_null() {
            tracing::debug!(path = %path.display(), "plugin returned null sentinel");
            return Err(AppError::LoadFailed(path.display().to_string()));
        }

        let image = LoadedImage::new(raw, self);
        if !raw.is_consistent() {
            return Err(AppError::InvalidBuffer {
                len: raw.len,
                width: raw.width,
                height: raw.height,
                channels: raw.channels,
            });
        }

        Ok(image)
    }

    /// Writes `image` to `path` with the plugin's encoder. Ownership stays with `image`.
    pub fn save(&self, path: &Path, image: &LoadedImage<'_>) -> Result<(), AppError> {
        let c_path = c_path(path)?;

        // SAFETY:
        // - `c_path` outlives the call.
        // - `image` keeps the buffer alive and unreleased for the duration of the call;
        //   the plugin only reads it.
        let ok = unsafe { (self.save_image)(c_path.as_ptr(), image.raw()) };

        if ok {
            Ok(())
        } else {
            Err(AppError::SaveFailed(path.display().to_string()))
        }
    }

    /// Queries the plugin's display name and extension list.
    pub fn info(&self) -> PluginInfo {
        let mut name = [0u8; INFO_CAPACITY];
        let mut exts = [0u8; INFO_CAPACITY];

        // SAFETY: both buffers have exactly `INFO_CAPACITY` writable bytes.
        unsafe {
            (self.get_plugin_info)(
                name.as_mut_ptr().cast::<c_char>(),
                name.len(),
                exts.as_mut_ptr().cast::<c_char>(),
                exts.len(),
            );
        }

        PluginInfo::parse(&name, &exts)
    }

    /// Hands a buffer back to the plugin.
    ///
    /// # SAFETY
    /// `raw` must be a non-null buffer returned by this table's `load_image`
    /// and not yet released.
    pub(crate) unsafe fn release(&self, raw: ImageBuffer) {
        // SAFETY: forwarded to the caller.
        unsafe { (self.free_image)(raw) }
    }
}

fn c_path(path: &Path) -> Result<CString, AppError> {
    let s = path
        .to_str()
        .ok_or_else(|| AppError::InvalidPath(path.display().to_string()))?;
    CString::new(s).map_err(|_| AppError::InvalidPath(path.display().to_string()))
}

/// Accepts only plugins built for this host's [`ABI_VERSION`].
pub fn check_abi(found: u32) -> Result<(), AppError> {
    if found != ABI_VERSION {
        return Err(AppError::AbiMismatch {
            found,
            expected: ABI_VERSION,
        });
    }
    Ok(())
}

/// Dynamically loaded image decoder plugin.
pub struct Plugin {
    api: PluginApi,
    _lib: Library,
}

impl Plugin {
    /// Loads a plugin dynamic library and resolves the buffer protocol symbols.
    ///
    /// # SAFETY
    /// The caller must ensure that the library at `path`:
    /// - exports `load_image`, `free_image`, `save_image`, `get_plugin_info`
    ///   and `plugin_abi_version` with the exact `ffi` signatures and ABI,
    /// - follows the buffer ownership contract described on [`PluginApi::new`].
    pub unsafe fn load(path: &Path) -> Result<Self, AppError> {
        // SAFETY: running the library initialisers is the caller's contract.
        let lib = unsafe { Library::new(path)? };

        // SAFETY:
        // - Symbol types come from the caller's contract.
        // - The function pointers copied out of the symbols stay valid while
        //   `_lib` is alive, and `api` is only reachable through `&self`.
        let api = unsafe {
            let version: Symbol<AbiVersionFn> = lib.get(b"plugin_abi_version")?;
            check_abi(version())?;

            let load: Symbol<LoadImageFn> = lib.get(b"load_image")?;
            let free: Symbol<FreeImageFn> = lib.get(b"free_image")?;
            let save: Symbol<SaveImageFn> = lib.get(b"save_image")?;
            let info: Symbol<PluginInfoFn> = lib.get(b"get_plugin_info")?;

            PluginApi::new(*load, *free, *save, *info)
        };

        tracing::debug!(plugin = %path.display(), abi_version = ABI_VERSION, "plugin symbols resolved");

        Ok(Self { api, _lib: lib })
    }

    /// Returns the protocol function table, borrowed from the loaded library.
    pub fn api(&self) -> &PluginApi {
        &self.api
    }
}
