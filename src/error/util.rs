//! Utility functions for error handling
//!
//! Helpers that attach the file path and the reason it was needed to I/O
//! failures, so a failed resolution names the store that broke.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{LcaError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.is_file() {
        return Err(LcaError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a file (needed for: {purpose})", path.display()),
        )));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "permission denied - check file permissions",
            io::ErrorKind::NotFound => "file was removed during the operation",
            _ => "failed to open file",
        };
        LcaError::Io(io::Error::new(
            e.kind(),
            format!("{}: {context} (needed for: {purpose}): {e}", path.display()),
        ))
    })
}

/// Safely read a whole file into memory with rich error information
pub fn safe_read_bytes(path: &Path, purpose: &str) -> Result<Vec<u8>> {
    let mut file = safe_open_file(path, purpose)?;
    let mut content = Vec::new();
    io::Read::read_to_end(&mut file, &mut content).map_err(|e| {
        LcaError::Io(io::Error::new(
            e.kind(),
            format!("{}: failed to read content for {purpose}: {e}", path.display()),
        ))
    })?;
    Ok(content)
}
