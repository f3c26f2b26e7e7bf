//! Filename parsing
//!
//! `FileParser` matches a file's base name against the pattern set, in
//! order, and turns the first match into an `EpisodeInfo`.

use regex::Captures;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::episode::{EpisodeInfo, EpisodeNumber};
use crate::pattern::{EpisodePattern, EpisodeShape, PatternSet};

/// `end - start` of an episode range must stay below this
const MAX_RANGE_LENGTH: u32 = 1000;

/// Errors that can occur while parsing a filename
#[derive(Debug, Error)]
pub enum ParseError {
    /// No episode pattern matched the filename
    #[error("Could not parse filename: {0}")]
    InvalidFilename(PathBuf),
}

/// Parses episode information out of filenames
#[derive(Debug, Clone, Default)]
pub struct FileParser {
    patterns: PatternSet,
}

impl FileParser {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    /// Creates a parser using the episode patterns from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(PatternSet::from_config(config))
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Parses a file path
    ///
    /// Only the base name is matched; the full path is kept in the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use tvnamer::{EpisodeNumber, FileParser};
    /// use std::path::Path;
    ///
    /// let parser = FileParser::default();
    /// let episode = parser.parse(Path::new("/tv/Show.Name.S01E02.Title.avi")).unwrap();
    /// assert_eq!(episode.showname, "Show.Name");
    /// assert_eq!(episode.seasonnumber, Some(1));
    /// assert_eq!(episode.episodenumber, EpisodeNumber::Single(2));
    /// ```
    pub fn parse(&self, path: &Path) -> Result<EpisodeInfo, ParseError> {
        let basename = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .ok_or_else(|| ParseError::InvalidFilename(path.to_path_buf()))?;

        for pattern in &self.patterns {
            let Some(caps) = pattern.regex().captures(&basename) else {
                continue;
            };

            match extract(pattern, &caps) {
                Some((showname, seasonnumber, episodenumber)) => {
                    debug!(
                        file = %basename,
                        pattern = pattern.source(),
                        "Matched episode pattern"
                    );
                    return Ok(EpisodeInfo::new(
                        showname,
                        seasonnumber,
                        episodenumber,
                        path,
                    ));
                }
                None => {
                    debug!(
                        file = %basename,
                        pattern = pattern.source(),
                        "Pattern matched but episode numbers were unusable"
                    );
                }
            }
        }

        Err(ParseError::InvalidFilename(path.to_path_buf()))
    }
}

/// Pulls show name, season and episode numbers out of a match
///
/// Returns `None` when an episode group did not take part in the match, a
/// number does not fit, or a range runs backwards or its end exceeds its
/// start by `MAX_RANGE_LENGTH` or more.
fn extract(
    pattern: &EpisodePattern,
    caps: &Captures<'_>,
) -> Option<(String, Option<u32>, EpisodeNumber)> {
    let number = |name: &str| -> Option<u32> { caps.name(name)?.as_str().parse().ok() };

    let episodenumber = match pattern.shape() {
        EpisodeShape::Indexed(names) => {
            let mut numbers = Vec::new();
            for name in names {
                if caps.name(name.as_str()).is_some() {
                    numbers.push(number(name.as_str())?);
                }
            }
            if numbers.is_empty() {
                return None;
            }
            numbers.sort_unstable();
            EpisodeNumber::Multiple(numbers)
        }
        EpisodeShape::Range => {
            let start = number("episodenumberstart")?;
            let end = number("episodenumberend")?;
            if end < start || end - start >= MAX_RANGE_LENGTH {
                return None;
            }
            EpisodeNumber::Multiple((start..=end).collect())
        }
        EpisodeShape::Single => EpisodeNumber::Single(number("episodenumber")?),
    };

    let seasonnumber = match caps.name("seasonnumber") {
        Some(season) => Some(season.as_str().parse().ok()?),
        None => None,
    };

    let showname = caps
        .name("showname")
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Some((showname, seasonnumber, episodenumber))
}
