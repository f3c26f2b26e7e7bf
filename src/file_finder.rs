//! File finder module
//!
//! Turns a user-supplied path into the list of files to process. A file is
//! returned as is; a directory is listed one level deep, or fully when
//! searching recursively.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while finding files
#[derive(Debug, Error)]
pub enum FileFinderError {
    /// Path is neither a file nor a directory
    #[error("{0} is not a valid file/directory")]
    InvalidPath(PathBuf),

    /// Failed to read directory
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed { path: PathBuf, source: io::Error },

    /// Failed to resolve a path
    #[error("Failed to resolve path {path}: {source}")]
    ResolveFailed { path: PathBuf, source: io::Error },
}

/// Finds the files below a path
#[derive(Debug, Clone)]
pub struct FileFinder {
    path: PathBuf,
    recursive: bool,
    videos_only: bool,
}

impl FileFinder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: false,
            videos_only: false,
        }
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Only return files whose content is detected as video
    pub fn videos_only(mut self, videos_only: bool) -> Self {
        self.videos_only = videos_only;
        self
    }

    /// Returns the absolute paths of all files found, sorted
    pub fn find_files(&self) -> Result<Vec<PathBuf>, FileFinderError> {
        let mut files = Vec::new();

        if self.path.is_file() {
            files.push(absolute(&self.path)?);
        } else if self.path.is_dir() {
            self.scan_directory(&self.path, &mut files)?;
        } else {
            return Err(FileFinderError::InvalidPath(self.path.clone()));
        }

        if self.videos_only {
            files.retain(|path| is_video_file(path));
        }

        files.sort();
        Ok(files)
    }

    /// Collects the files in a directory, recursing if enabled
    ///
    /// Symlinked files are included; symlinked directories are not entered.
    fn scan_directory(
        &self,
        dir_path: &Path,
        files: &mut Vec<PathBuf>,
    ) -> Result<(), FileFinderError> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        for entry in WalkDir::new(dir_path).min_depth(1).max_depth(max_depth) {
            let entry = entry.map_err(|e| FileFinderError::ReadDirectoryFailed {
                path: e.path().unwrap_or(dir_path).to_path_buf(),
                source: e.into(),
            })?;

            if entry.path().is_file() {
                files.push(absolute(entry.path())?);
            }
        }

        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, FileFinderError> {
    std::path::absolute(path).map_err(|e| FileFinderError::ResolveFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Analyzes a file to determine if it's a video file
///
/// Only reads the first 8KB of the file.
fn is_video_file(file_path: &Path) -> bool {
    const BUFFER_SIZE: usize = 8192;

    let mut file = match File::open(file_path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let bytes_read = match file.read(&mut buffer) {
        Ok(n) => n,
        Err(_) => return false,
    };
    buffer.truncate(bytes_read);

    infer::is_video(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_nonexistent_path() {
        let result = FileFinder::new("/nonexistent/path/that/does/not/exist").find_files();
        assert!(matches!(result, Err(FileFinderError::InvalidPath(_))));
    }

    #[test]
    fn test_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("show.s01e01.avi");
        touch(&file);

        let files = FileFinder::new(&file).find_files().unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_directory_non_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.avi"));
        touch(&dir.path().join("a.avi"));
        fs::create_dir(dir.path().join("season2")).unwrap();
        touch(&dir.path().join("season2").join("c.avi"));

        let files = FileFinder::new(dir.path()).find_files().unwrap();
        assert_eq!(files, vec![dir.path().join("a.avi"), dir.path().join("b.avi")]);
    }

    #[test]
    fn test_directory_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.avi"));
        fs::create_dir_all(dir.path().join("season2").join("extras")).unwrap();
        touch(&dir.path().join("season2").join("c.avi"));
        touch(&dir.path().join("season2").join("extras").join("d.avi"));

        let files = FileFinder::new(dir.path()).recursive(true).find_files().unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("a.avi"),
                dir.path().join("season2").join("c.avi"),
                dir.path().join("season2").join("extras").join("d.avi"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_entered() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("show.s01e01.avi"));
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let files = FileFinder::new(dir.path()).recursive(true).find_files().unwrap();
        assert_eq!(files, vec![dir.path().join("show.s01e01.avi")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.avi"));
        std::os::unix::fs::symlink(dir.path().join("a.avi"), dir.path().join("b.avi")).unwrap();

        let files = FileFinder::new(dir.path()).find_files().unwrap();
        assert_eq!(files, vec![dir.path().join("a.avi"), dir.path().join("b.avi")]);
    }

    #[test]
    fn test_videos_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("notes.txt"));

        // RIFF container with the AVI form type
        let mut avi = File::create(dir.path().join("episode.avi")).unwrap();
        avi.write_all(b"RIFF\x00\x00\x00\x00AVI LIST").unwrap();

        let files = FileFinder::new(dir.path()).videos_only(true).find_files().unwrap();
        assert_eq!(files, vec![dir.path().join("episode.avi")]);
    }
}
