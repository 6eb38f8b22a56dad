use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::PluginError;

/// Size of the `[width][height]` header in front of the pixel bytes.
pub const HEADER_LEN: usize = 8;

/// Writes `width` and `height` as host-endian `u32`s followed by `data`.
///
/// The output has no magic number and no channel count. If a write fails
/// midway the truncated file is left in place.
pub fn write_raw(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<(), PluginError> {
    let mut out = BufWriter::new(File::create(path)?);

    out.write_all(&width.to_ne_bytes())?;
    out.write_all(&height.to_ne_bytes())?;
    out.write_all(data)?;
    out.flush()?;

    Ok(())
}
