use thiserror::Error;

/// Reasons a plugin operation fails.
///
/// These never cross the C boundary: `load_image` reports any of them as the
/// null sentinel and `save_image` as `false`.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The source path does not name an existing regular file.
    #[error("Source not found")]
    SourceNotFound,

    /// The source exists but is not something this decoder accepts.
    #[error("Unsupported format")]
    UnsupportedFormat,

    /// The source was accepted but pixel data could not be produced.
    #[error("Decode failure")]
    DecodeFailure,

    /// The destination could not be created or written.
    #[error("Write failure: {0}")]
    WriteFailure(#[from] std::io::Error),

    /// A size computation does not fit the target integer type.
    #[error("Capacity exceeded")]
    CapacityExceeded,

    /// The buffer handed in breaks the `len == width * height * channels` rule.
    #[error("Invalid buffer")]
    InvalidBuffer,
}
