//! tvnamer - Identify tv episode files by their filenames and rename them
//!
//! This library parses show name, season and episode numbers out of
//! arbitrarily formatted filenames using an ordered list of patterns, and
//! renders the result back into a consistent filename using configurable
//! templates.
//!
//! ```
//! use tvnamer::{Config, FileParser};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let parser = FileParser::from_config(&config);
//!
//! let episode = parser.parse(Path::new("scrubs.s01e01e02.avi")).unwrap();
//! assert_eq!(episode.render(&config.naming).unwrap(), "scrubs - [01xe01e02]");
//! ```

pub mod config;
mod episode;
mod file_finder;
pub mod format;
mod parser;
mod pattern;
mod renamer;
mod title_lookup;

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub use config::{Config, ConfigError, NamingTemplates};
pub use episode::{EpisodeInfo, EpisodeNumber};
pub use file_finder::{FileFinder, FileFinderError};
pub use format::FormatError;
pub use parser::{FileParser, ParseError};
pub use pattern::{
    DEFAULT_EPISODE_PATTERNS, EpisodePattern, EpisodeShape, PatternError, PatternSet,
};
pub use renamer::{Renamer, sanitize_filename};
pub use title_lookup::{StaticTitles, TitleLookup, TitleLookupError};

/// Progress event emitted while planning renames
///
/// These events allow library users to report progress and to see which
/// files were skipped and why.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Planning started
    Started { path: PathBuf },

    /// Files found below the path
    FilesFound { count: usize },

    /// Processing a specific file
    ProcessingFile {
        index: usize,
        total: usize,
        path: PathBuf,
    },

    /// No episode pattern matched the file
    SkippedFile { path: PathBuf, reason: String },

    /// The title lookup failed; the file is named without a title
    TitleLookupFailed { path: PathBuf, reason: String },

    /// The file already has its target name
    Unchanged { path: PathBuf },

    /// A rename was planned
    Planned {
        source: PathBuf,
        destination: PathBuf,
    },

    /// Another file already claimed the rendered name; a numeric suffix was
    /// added
    DuplicateDestination {
        path: PathBuf,
        suffix: usize,
    },

    /// Planning complete
    Complete { planned: usize, skipped: usize },
}

/// A rename that has been computed but not yet performed
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRename {
    /// The parsed episode; its `filename` is the file's current path
    pub episode: EpisodeInfo,
    /// New base name, already sanitized
    pub new_name: String,
    /// Full path the file will be renamed to
    pub destination: PathBuf,
    /// Whether the original extension is appended to `new_name`
    pub keep_extension: bool,
    /// Suffix added because an earlier file renders to the same name
    pub duplicate_suffix: Option<usize>,
}

/// A rename that failed
#[derive(Debug)]
pub struct RenameFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub error: io::Error,
}

/// Top-level error type for tvnamer operations
#[derive(Debug, Error)]
pub enum TvNamerError {
    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error while finding files
    #[error("File finder error: {0}")]
    FileFinder(#[from] FileFinderError),

    /// Error while parsing a filename
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error in a naming template
    #[error("Naming template error: {0}")]
    Format(#[from] FormatError),

    /// Error during title lookup
    #[error("Title lookup error: {0}")]
    TitleLookup(#[from] TitleLookupError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Works out the new names for the episode files below `path`
///
/// Files are found according to `config.recursive` and `config.videos_only`
/// and parsed with the configured patterns. Files that match no pattern are
/// skipped and reported through `progress_callback`; so are files that
/// already carry their target name. When `title_lookup` is given, episode
/// titles are looked up; a failed lookup is reported and the file is named
/// without a title.
///
/// When several files render to the same name, the first keeps it and the
/// others get a numeric suffix: `name (2)`, `name (3)` and so on.
///
/// # Errors
///
/// Fails when `path` cannot be listed or a naming template is invalid.
pub fn plan_renames<F>(
    path: &Path,
    config: &Config,
    title_lookup: Option<&dyn TitleLookup>,
    mut progress_callback: F,
) -> Result<Vec<PlannedRename>, TvNamerError>
where
    F: FnMut(ProgressEvent),
{
    progress_callback(ProgressEvent::Started {
        path: path.to_path_buf(),
    });

    let files = FileFinder::new(path)
        .recursive(config.recursive)
        .videos_only(config.videos_only)
        .find_files()?;

    progress_callback(ProgressEvent::FilesFound { count: files.len() });

    let parser = FileParser::from_config(config);
    let mut planned = Vec::new();
    let mut destinations = HashSet::new();
    let mut skipped = 0;

    for (index, file) in files.iter().enumerate() {
        progress_callback(ProgressEvent::ProcessingFile {
            index,
            total: files.len(),
            path: file.clone(),
        });

        let mut episode = match parser.parse(file) {
            Ok(episode) => episode,
            Err(e) => {
                skipped += 1;
                progress_callback(ProgressEvent::SkippedFile {
                    path: file.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if let Some(lookup) = title_lookup {
            if let Err(e) = episode.enrich(lookup) {
                progress_callback(ProgressEvent::TitleLookupFailed {
                    path: file.clone(),
                    reason: e.to_string(),
                });
            }
        }

        let base_name = sanitize_filename(&episode.render(&config.naming)?);
        let renamer = Renamer::new(&episode.filename);
        let mut new_name = base_name.clone();
        let mut destination = renamer.target_path(&new_name, config.keep_extension);

        if destination == episode.filename {
            destinations.insert(destination);
            progress_callback(ProgressEvent::Unchanged { path: file.clone() });
            continue;
        }

        let mut duplicate_suffix = None;
        let mut occurrence = 1;
        while destinations.contains(&destination) {
            occurrence += 1;
            new_name = format!("{base_name} ({occurrence})");
            destination = renamer.target_path(&new_name, config.keep_extension);
            duplicate_suffix = Some(occurrence);
        }
        destinations.insert(destination.clone());

        if let Some(suffix) = duplicate_suffix {
            debug!(file = %file.display(), suffix, "Duplicate destination");
            progress_callback(ProgressEvent::DuplicateDestination {
                path: file.clone(),
                suffix,
            });
        }

        progress_callback(ProgressEvent::Planned {
            source: file.clone(),
            destination: destination.clone(),
        });

        planned.push(PlannedRename {
            episode,
            new_name,
            destination,
            keep_extension: config.keep_extension,
            duplicate_suffix,
        });
    }

    progress_callback(ProgressEvent::Complete {
        planned: planned.len(),
        skipped,
    });

    Ok(planned)
}

/// Performs planned renames
///
/// Each rename is attempted once; a failure does not stop the remaining
/// renames and is returned instead. Successfully renamed episodes have their
/// `filename` updated.
pub fn execute_renames(operations: &mut [PlannedRename]) -> Vec<RenameFailure> {
    let mut failures = Vec::new();

    for op in operations.iter_mut() {
        let source = op.episode.filename.clone();

        match op.episode.rename(&op.new_name, op.keep_extension) {
            Ok(path) => {
                info!(from = %source.display(), to = %path.display(), "Renamed episode");
            }
            Err(error) => {
                debug!(file = %source.display(), %error, "Rename failed");
                failures.push(RenameFailure {
                    source,
                    destination: op.destination.clone(),
                    error,
                });
            }
        }
    }

    failures
}
