//! File renaming
//!
//! Renames a file within its directory, keeping or replacing its extension.
//! Failures are returned as the `io::Error` from the rename call; nothing is
//! retried.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Renames one file and tracks where it ends up
#[derive(Debug, Clone)]
pub struct Renamer {
    filename: PathBuf,
}

impl Renamer {
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    /// Current path of the file
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn into_path(self) -> PathBuf {
        self.filename
    }

    /// Computes the path the file would get, without touching the filesystem
    ///
    /// With `keep_extension` the current extension (if any) is appended to
    /// `new_name`; otherwise `new_name` is used as is, so it may carry its
    /// own extension.
    pub fn target_path(&self, new_name: &str, keep_extension: bool) -> PathBuf {
        let mut name = new_name.to_string();

        if keep_extension {
            if let Some(ext) = self.filename.extension() {
                name.push('.');
                name.push_str(&ext.to_string_lossy());
            }
        }

        match self.filename.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Renames the file, keeping it in the same directory
    ///
    /// An existing file at the target path is never replaced; that case
    /// fails with `ErrorKind::AlreadyExists`. On success the tracked path is
    /// updated and returned.
    pub fn new_name(&mut self, new_name: &str, keep_extension: bool) -> io::Result<&Path> {
        let target = self.target_path(new_name, keep_extension);

        if target != self.filename && target.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            ));
        }

        fs::rename(&self.filename, &target)?;
        debug!(from = %self.filename.display(), to = %target.display(), "Renamed file");

        self.filename = target;
        Ok(&self.filename)
    }
}

/// Sanitizes a string for use in filenames by replacing problematic characters
///
/// Replaces characters that are invalid or problematic in filenames across platforms:
/// - Path separators: / \
/// - Reserved characters: : * ? " < > |
/// - Control characters
///
/// Leading and trailing whitespace and dots are trimmed.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();

    sanitized
        .trim_matches(|c: char| c.is_whitespace() || c == '.')
        .to_string()
}
