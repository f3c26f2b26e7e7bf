//! Episode descriptor
//!
//! `EpisodeInfo` is the result of a successful filename parse. It carries the
//! show name, season and episode number(s), an optional episode title and the
//! path of the file it was parsed from, and knows how to render itself into a
//! new filename.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::NamingTemplates;
use crate::format::{FormatArgs, FormatError, FormatValue, printf};
use crate::renamer::Renamer;
use crate::title_lookup::{TitleLookup, TitleLookupError};

/// One episode number or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeNumber {
    Single(u32),
    Multiple(Vec<u32>),
}

impl EpisodeNumber {
    /// All episode numbers in order
    pub fn numbers(&self) -> &[u32] {
        match self {
            EpisodeNumber::Single(n) => std::slice::from_ref(n),
            EpisodeNumber::Multiple(list) => list,
        }
    }

    /// Formats the episode number(s) for use in a filename
    ///
    /// Each number is formatted with `single_format` (e.g. `e%02d`); multiple
    /// numbers are joined with `separator`.
    pub fn format(&self, single_format: &str, separator: &str) -> Result<String, FormatError> {
        let format_one =
            |n: u32| printf(single_format, &FormatArgs::Positional(vec![FormatValue::from(n)]));

        match self {
            EpisodeNumber::Single(n) => format_one(*n),
            EpisodeNumber::Multiple(list) => Ok(list
                .iter()
                .map(|n| format_one(*n))
                .collect::<Result<Vec<_>, _>>()?
                .join(separator)),
        }
    }
}

/// Information about one episode file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeInfo {
    /// Show name as captured from the filename
    pub showname: String,
    /// Season number, `None` for season-less numbering
    pub seasonnumber: Option<u32>,
    /// Episode number(s)
    pub episodenumber: EpisodeNumber,
    /// Episode title, filled in by a title lookup
    pub episodename: Option<String>,
    /// Current path of the file
    pub filename: PathBuf,
}

impl EpisodeInfo {
    pub fn new(
        showname: impl Into<String>,
        seasonnumber: Option<u32>,
        episodenumber: EpisodeNumber,
        filename: impl Into<PathBuf>,
    ) -> Self {
        Self {
            showname: showname.into(),
            seasonnumber,
            episodenumber,
            episodename: None,
            filename: filename.into(),
        }
    }

    /// Sets the episode title
    pub fn with_episode_name(mut self, episodename: impl Into<String>) -> Self {
        self.episodename = Some(episodename.into());
        self
    }

    /// Looks up the episode title and stores it if one is found
    ///
    /// Returns whether a title was found. An existing title is kept when the
    /// lookup finds nothing.
    pub fn enrich(&mut self, lookup: &dyn TitleLookup) -> Result<bool, TitleLookupError> {
        match lookup.episode_title(&self.showname, self.seasonnumber, &self.episodenumber)? {
            Some(title) => {
                self.episodename = Some(title);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Generates the new filename (without extension)
    ///
    /// Uses `with_episode_title` when the episode title is known and
    /// `without_episode_title` otherwise. Placeholders available to both
    /// templates are `showname`, `seasonno`, `episode` and `episodename`. An
    /// absent season expands to an empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// use tvnamer::{EpisodeInfo, EpisodeNumber, NamingTemplates};
    ///
    /// let episode = EpisodeInfo::new("Scrubs", Some(1), EpisodeNumber::Multiple(vec![1, 2]), "scrubs.s01e01e02.avi");
    /// assert_eq!(episode.render(&NamingTemplates::default()).unwrap(), "Scrubs - [01xe01e02]");
    /// ```
    pub fn render(&self, templates: &NamingTemplates) -> Result<String, FormatError> {
        let episode = self.episodenumber.format(
            &templates.single_episode_format,
            &templates.episode_number_separator,
        )?;

        let args = FormatArgs::named([
            ("showname", FormatValue::from(self.showname.as_str())),
            ("seasonno", FormatValue::from(self.seasonnumber)),
            ("episode", FormatValue::from(episode)),
            ("episodename", FormatValue::from(self.episodename.clone())),
        ]);

        let template = match self.episodename {
            Some(_) => &templates.with_episode_title,
            None => &templates.without_episode_title,
        };

        printf(template, &args)
    }

    /// Renames the file in place and tracks its new path
    ///
    /// See [`Renamer::new_name`] for how the extension is handled.
    pub fn rename(&mut self, new_name: &str, keep_extension: bool) -> io::Result<&Path> {
        let mut renamer = Renamer::new(&self.filename);
        renamer.new_name(new_name, keep_extension)?;
        self.filename = renamer.into_path();
        Ok(&self.filename)
    }
}

impl fmt::Display for EpisodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render(&NamingTemplates::default()) {
            Ok(name) => write!(f, "{name}"),
            Err(_) => write!(
                f,
                "{} season {:?} episode {:?}",
                self.showname,
                self.seasonnumber,
                self.episodenumber.numbers()
            ),
        }
    }
}
