//! Shared utilities for `tailbench`.
//!
//! Common functionality used across modules:
//! - Atomic artifact writes (temp file + rename)
//! - Glob expansion of input patterns
//! - Progress indicators (for per-file parsing)

pub mod glob;
pub mod progress;

pub use glob::{expand_pattern, has_wildcard};

use crate::error::{Result, TailbenchError};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temp path used while writing `path`: same directory, `.tmp` appended.
#[must_use]
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, std::ffi::OsStr::to_os_string);
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to `path` via a temp file in the same directory and an
/// atomic rename. Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written or renamed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if path.file_name().is_none() {
        return Err(TailbenchError::Config(format!(
            "Invalid output path: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    let temp_file = File::create(&temp_path)?;
    let mut writer = BufWriter::new(temp_file);
    writer.write_all(contents)?;
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| TailbenchError::Io(e.into_error()))?
        .sync_all()?;

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
    Ok(())
}
