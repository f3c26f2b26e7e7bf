//! Episode title lookup
//!
//! Titles come from outside the filename, usually from an episode database.
//! This module defines the trait such sources implement; no networked source
//! ships with the crate.

use std::collections::HashMap;
use thiserror::Error;

use crate::episode::EpisodeNumber;

/// Errors that can occur during title lookup
#[derive(Debug, Error)]
pub enum TitleLookupError {
    /// Request to the title source failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The requested show was not found
    #[error("Show not found: {0}")]
    ShowNotFound(String),

    /// The source returned invalid or unexpected data
    #[error("Title source returned invalid data: {0}")]
    InvalidData(String),
}

/// Trait for sources that can supply episode titles
pub trait TitleLookup {
    /// Returns the title for the given episode(s), or `None` if unknown
    ///
    /// # Arguments
    ///
    /// * `showname` - The show name as parsed from the filename
    /// * `seasonnumber` - The season, `None` for season-less numbering
    /// * `episodes` - The episode number(s)
    fn episode_title(
        &self,
        showname: &str,
        seasonnumber: Option<u32>,
        episodes: &EpisodeNumber,
    ) -> Result<Option<String>, TitleLookupError>;
}

/// In-memory title table
///
/// Keys are `(showname, season, episode)`; show names are compared
/// case-insensitively. Multiple episodes get their titles joined with `", "`,
/// and only when every episode has one.
#[derive(Debug, Clone, Default)]
pub struct StaticTitles {
    titles: HashMap<(String, Option<u32>, u32), String>,
}

impl StaticTitles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a title
    pub fn with_title(
        mut self,
        showname: &str,
        seasonnumber: Option<u32>,
        episode: u32,
        title: &str,
    ) -> Self {
        self.titles.insert(
            (showname.to_lowercase(), seasonnumber, episode),
            title.to_string(),
        );
        self
    }
}

impl TitleLookup for StaticTitles {
    fn episode_title(
        &self,
        showname: &str,
        seasonnumber: Option<u32>,
        episodes: &EpisodeNumber,
    ) -> Result<Option<String>, TitleLookupError> {
        let show = showname.to_lowercase();

        let titles: Option<Vec<&str>> = episodes
            .numbers()
            .iter()
            .map(|n| {
                self.titles
                    .get(&(show.clone(), seasonnumber, *n))
                    .map(String::as_str)
            })
            .collect();

        Ok(titles.map(|t| t.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles() -> StaticTitles {
        StaticTitles::new()
            .with_title("Scrubs", Some(1), 1, "My First Day")
            .with_title("Scrubs", Some(1), 2, "My Mentor")
    }

    #[test]
    fn test_single_title() {
        let title = titles()
            .episode_title("scrubs", Some(1), &EpisodeNumber::Single(2))
            .unwrap();
        assert_eq!(title.as_deref(), Some("My Mentor"));
    }

    #[test]
    fn test_multiple_titles() {
        let title = titles()
            .episode_title("Scrubs", Some(1), &EpisodeNumber::Multiple(vec![1, 2]))
            .unwrap();
        assert_eq!(title.as_deref(), Some("My First Day, My Mentor"));
    }

    #[test]
    fn test_unknown_episode() {
        let lookup = titles();
        assert_eq!(
            lookup
                .episode_title("Scrubs", Some(2), &EpisodeNumber::Single(1))
                .unwrap(),
            None
        );
        assert_eq!(
            lookup
                .episode_title("Scrubs", Some(1), &EpisodeNumber::Multiple(vec![2, 3]))
                .unwrap(),
            None
        );
    }
}
