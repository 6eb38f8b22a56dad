use thiserror::Error;

/// Application-level errors produced by the image host.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input image file does not exist.
    #[error("Input file does not exist: {0}")]
    MissingInput(String),

    /// Plugin dynamic library does not exist.
    #[error("Plugin library does not exist: {0}")]
    MissingPlugin(String),

    /// A path cannot be passed as a C string (not UTF-8 or contains NUL).
    #[error("Path cannot cross the plugin boundary: {0}")]
    InvalidPath(String),

    /// I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error occurred while encoding the output image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Error occurred while loading a dynamic plugin library.
    #[error("Plugin load error: {0}")]
    Plugin(#[from] libloading::Error),

    /// Plugin was built against another version of the buffer protocol.
    #[error("Plugin ABI version mismatch (found {found}, expected {expected})")]
    AbiMismatch {
        /// Version reported by the plugin.
        found: u32,
        /// Version this host speaks.
        expected: u32,
    },

    /// Plugin returned the null sentinel for this source.
    #[error("Plugin could not load image: {0}")]
    LoadFailed(String),

    /// Plugin returned a buffer whose length does not match its dimensions.
    #[error("Plugin returned an invalid buffer: len {len} for {width}x{height}x{channels}")]
    InvalidBuffer {
        /// Byte length reported by the plugin.
        len: usize,
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
        /// Reported channel count.
        channels: u32,
    },

    /// Plugin reported failure while saving.
    #[error("Plugin could not save image: {0}")]
    SaveFailed(String),

    /// Channel count has no matching in-memory image layout.
    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(u32),

    /// Config file is not valid TOML or has unknown keys.
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
}
