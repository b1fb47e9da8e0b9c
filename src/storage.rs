//! Destination storage: the existing-artifact check and atomic writes.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Smallest file size treated as a real artifact rather than an empty or
/// truncated stub.
pub const MIN_VALID_BYTES: u64 = 1000;

/// Extension every tier writes.
pub const ARTIFACT_EXTENSION: &str = "wav";

/// Whether `path` has to be (re)generated.
///
/// Returns `false` only when `path` is a regular file of at least
/// `min_valid_bytes`. Missing, empty, undersized and non-file paths all need
/// regeneration.
pub fn needs_regeneration(path: &Path, min_valid_bytes: u64) -> bool {
    match fs::metadata(path) {
        Ok(meta) => !(meta.is_file() && meta.len() >= min_valid_bytes),
        Err(_) => true,
    }
}

/// Write `bytes` to `path` in one go, creating parent directories.
///
/// The bytes land in a temporary file next to the destination which is then
/// renamed over it, so readers never observe a partially written artifact.
/// The file gets the same mode `File::create` would give it, so playback
/// running as another user can read the catalog.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(".partial-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Passed to open(2), so the process umask still applies.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
