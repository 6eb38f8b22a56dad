#![deny(missing_docs)]

//! Image loading host for C ABI decoder plugins.
//!
//! Plugins allocate pixel buffers and the host releases them through the
//! plugin's own `free_image`; [`handle::LoadedImage`] makes that release
//! automatic.

/// Configuration file and CLI merging.
pub mod config;

/// Error types used by the image host.
pub mod error;

/// `#[repr(C)]` buffer and function signatures shared with plugins.
pub mod ffi;

/// Owned handles to plugin-allocated buffers.
pub mod handle;

/// Dynamic plugin loading and FFI bindings.
pub mod plugin_loader;

#[cfg(test)]
mod fake;
