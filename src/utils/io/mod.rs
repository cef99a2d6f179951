//! IO utilities for the raw and processed stores
//!
//! Store files are only ever replaced whole: content is written to a uniquely
//! named hidden file in the same directory and renamed over the target, so
//! readers see either the old artifact or the new one, and concurrent writers
//! never share a staging file.

pub mod parquet;

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{LcaError, Result};

pub use self::parquet::{read_parquet, write_parquet};

/// Create the directory holding `path` if it does not exist yet
pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Directory that receives the staging file for `path`
fn staging_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Replace the file at `path` with the output of `write`
///
/// The staging file is removed if `write` or the final rename fails.
pub fn replace_with<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut fs::File) -> Result<()>,
{
    ensure_parent_directory(path)?;
    let prefix = format!(
        ".{}.",
        path.file_name()
            .map_or_else(|| "store".into(), |n| n.to_string_lossy())
    );
    let mut staging = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".partial")
        .tempfile_in(staging_dir(path))?;

    write(staging.as_file_mut())?;
    staging
        .persist(path)
        .map_err(|e| LcaError::from(e.error))?;
    Ok(())
}

/// Replace the file at `path` with `bytes`
pub fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    replace_with(path, |file| {
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(())
    })
}
