//! Episode filename patterns
//!
//! A `PatternSet` is the ordered list of compiled episode patterns. Patterns
//! are regular expressions in verbose mode with named groups:
//!
//! - `showname` (optional)
//! - `seasonnumber` (optional, absent for season-less numbering)
//! - exactly one episode number shape: `episodenumber`, the
//!   `episodenumberstart`/`episodenumberend` pair, or the indexed family
//!   `episodenumber1`, `episodenumber2`, ...
//!
//! Order is priority: the parser tries patterns front to back and the first
//! match wins.

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// Built-in episode patterns, highest priority first
///
/// Verbose mode ignores whitespace everywhere, including inside character
/// classes, so literal spaces are written as `\x20`.
pub const DEFAULT_EPISODE_PATTERNS: &[&str] = &[
    // [group] Show - 01-02 [Etc]
    r"^\[.+?\]\x20?                      # group name
    (?P<showname>.*?)\x20?[-_]\x20?      # show name, padding, spaces?
    (?P<episodenumberstart>\d+)          # first episode number
    ([-_]\d+)*                           # optional repeating episodes
    [-_](?P<episodenumberend>\d+)        # last episode number
    [^/]*$",
    // [group] Show - 01 [Etc]
    r"^\[.+?\]\x20?                      # group name
    (?P<showname>.*)                     # show name
    \x20?[-_]\x20?(?P<episodenumber>\d+)
    [^/]*$",
    // foo.s01e23e24*
    r"^(?P<showname>.+?)[\x20._\-]       # show name
    [Ss](?P<seasonnumber>[0-9]+)         # s01
    [.\-\x20]?                           # separator
    [Ee](?P<episodenumberstart>[0-9]+)   # first e23
    ([.\-\x20]?[Ee][0-9]+)*              # e24e25 etc
    [.\-\x20]?[Ee](?P<episodenumberend>[0-9]+) # final episode num
    [^/]*$",
    // foo.1x09-11*
    r"^(?P<showname>.+?)[\x20._\-]       # show name and padding
    \[?                                  # [ optional
    (?P<seasonnumber>[0-9]+)             # season
    x
    (?P<episodenumberstart>[0-9]+)       # first episode
    -
    (?P<episodenumberend>[0-9]+)         # last episode
    \]?                                  # ] optional
    [^/]*$",
    // foo_[s01]_[e01]
    r"^(?P<showname>.+?)[\x20._\-]       # show name and padding
    \[[Ss](?P<seasonnumber>[0-9]+)\]     # [s01]
    _
    \[[Ee](?P<episodenumber>[0-9]+)\]?   # [e01]
    [^/]*$",
    // foo.1x09*
    r"^(?P<showname>.+?)[\x20._\-]       # show name and padding
    \[?                                  # [ optional
    (?P<seasonnumber>[0-9]+)             # season
    x
    (?P<episodenumber>[0-9]+)            # episode
    \]?                                  # ] optional
    [^/]*$",
    // foo.s01.e01, foo.s01_e01
    r"^(?P<showname>.+?)[\x20._\-]
    [Ss](?P<seasonnumber>[0-9]+)[.\-_\x20]?
    [Ee](?P<episodenumber>[0-9]+)
    [^/]*$",
    // foo.103*
    r"^(?P<showname>.+)[\x20._\-]
    (?P<seasonnumber>[0-9])
    (?P<episodenumber>[0-9]{2})
    [._\x20\-][^/]*$",
    // foo.0103*
    r"^(?P<showname>.+)[\x20._\-]
    (?P<seasonnumber>[0-9]{2})
    (?P<episodenumber>[0-9]{2,3})
    [._\x20\-][^/]*$",
];

/// Errors that can occur while compiling a single pattern
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern is not a valid regular expression
    #[error("Invalid episode pattern syntax: {0}")]
    Syntax(#[from] regex::Error),

    /// The pattern captures no episode number
    #[error("Episode pattern has no episode number group")]
    MissingEpisodeNumber,

    /// The pattern mixes several episode number shapes
    #[error("Episode pattern mixes episode number groups: {0}")]
    AmbiguousEpisodeNumber(String),

    /// Only one half of `episodenumberstart`/`episodenumberend` is present
    #[error("Episode pattern needs both episodenumberstart and episodenumberend")]
    IncompleteRange,
}

/// How a pattern captures its episode number(s)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeShape {
    /// A single `episodenumber` group
    Single,
    /// An inclusive `episodenumberstart`..=`episodenumberend` range
    Range,
    /// `episodenumberN` groups, listed by group name
    Indexed(Vec<String>),
}

/// A compiled episode pattern together with its capture shape
#[derive(Debug, Clone)]
pub struct EpisodePattern {
    source: String,
    regex: Regex,
    shape: EpisodeShape,
    has_showname: bool,
    has_season: bool,
}

impl EpisodePattern {
    /// Compiles a pattern source
    ///
    /// The expression is anchored at the start of the text being matched;
    /// whether trailing text is allowed is up to the pattern's own `$`.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        // Unbalanced groups could otherwise close the anchoring group early
        build_verbose(source)?;

        // Newline ends a trailing `#` comment before the closing group
        let regex = build_verbose(&format!("^(?:{source}\n)"))?;

        let names: Vec<&str> = regex.capture_names().flatten().collect();
        let shape = detect_shape(&names)?;

        Ok(Self {
            source: source.to_string(),
            has_showname: names.contains(&"showname"),
            has_season: names.contains(&"seasonnumber"),
            regex,
            shape,
        })
    }

    /// The source text the pattern was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn shape(&self) -> &EpisodeShape {
        &self.shape
    }

    pub fn has_showname(&self) -> bool {
        self.has_showname
    }

    pub fn has_season(&self) -> bool {
        self.has_season
    }
}

/// Returns the index if `name` is `episodenumber<digits>`
fn build_verbose(source: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source).ignore_whitespace(true).build()
}

fn indexed_group(name: &str) -> Option<u32> {
    name.strip_prefix("episodenumber")
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|rest| rest.parse().ok())
}

/// Determines the episode number shape from a pattern's group names
fn detect_shape(names: &[&str]) -> Result<EpisodeShape, PatternError> {
    let single = names.contains(&"episodenumber");
    let start = names.contains(&"episodenumberstart");
    let end = names.contains(&"episodenumberend");
    let mut indexed: Vec<(u32, String)> = names
        .iter()
        .filter_map(|name| indexed_group(name).map(|idx| (idx, name.to_string())))
        .collect();
    indexed.sort();

    let mut shapes = Vec::new();
    if single {
        shapes.push("episodenumber");
    }
    if start || end {
        shapes.push("episodenumberstart/episodenumberend");
    }
    if !indexed.is_empty() {
        shapes.push("episodenumberN");
    }

    match shapes.len() {
        0 => Err(PatternError::MissingEpisodeNumber),
        1 if start != end => Err(PatternError::IncompleteRange),
        1 if single => Ok(EpisodeShape::Single),
        1 if start => Ok(EpisodeShape::Range),
        1 => Ok(EpisodeShape::Indexed(
            indexed.into_iter().map(|(_, name)| name).collect(),
        )),
        _ => Err(PatternError::AmbiguousEpisodeNumber(shapes.join(", "))),
    }
}

/// Ordered, immutable set of compiled episode patterns
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<EpisodePattern>,
    rejected: Vec<(String, String)>,
}

impl PatternSet {
    /// Compiles the given pattern sources, preserving their order
    ///
    /// A source that fails to compile is logged as a warning and left out;
    /// the remaining patterns stay usable.
    pub fn compile<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();
        let mut rejected = Vec::new();

        for source in sources {
            let source = source.as_ref();
            match EpisodePattern::compile(source) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => {
                    warn!(pattern = source, error = %e, "Ignoring invalid episode pattern");
                    rejected.push((source.to_string(), e.to_string()));
                }
            }
        }

        debug!(
            active = patterns.len(),
            rejected = rejected.len(),
            "Compiled episode patterns"
        );

        Self { patterns, rejected }
    }

    /// Compiles the patterns listed in the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::compile(&config.episode_patterns)
    }

    /// Active patterns in priority order
    pub fn patterns(&self) -> &[EpisodePattern] {
        &self.patterns
    }

    /// Pattern sources that failed to compile, with the reason
    pub fn rejected(&self) -> &[(String, String)] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EpisodePattern> {
        self.patterns.iter()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::compile(DEFAULT_EPISODE_PATTERNS)
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a EpisodePattern;
    type IntoIter = std::slice::Iter<'a, EpisodePattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_all_compile() {
        let set = PatternSet::default();
        assert_eq!(set.len(), DEFAULT_EPISODE_PATTERNS.len());
        assert!(set.rejected().is_empty());
    }

    #[test]
    fn test_default_pattern_shapes() {
        let set = PatternSet::default();
        let shapes: Vec<&EpisodeShape> = set.iter().map(|p| p.shape()).collect();
        assert_eq!(shapes[0], &EpisodeShape::Range);
        assert_eq!(shapes[1], &EpisodeShape::Single);
        assert_eq!(shapes[2], &EpisodeShape::Range);
        assert_eq!(shapes[3], &EpisodeShape::Range);
        assert!(shapes[4..].iter().all(|s| **s == EpisodeShape::Single));
        assert!(!set.patterns()[0].has_season());
        assert!(set.patterns()[2].has_season());
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let set = PatternSet::compile([
            r"^(?P<showname>.+)\.(?P<episodenumber>\d+",
            r"^(?P<showname>.+?)\.(?P<episodenumber>\d+)",
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.rejected().len(), 1);
        assert_eq!(
            set.patterns()[0].source(),
            r"^(?P<showname>.+?)\.(?P<episodenumber>\d+)"
        );
    }

    #[test]
    fn test_shape_detection() {
        assert_eq!(detect_shape(&["showname", "episodenumber"]).unwrap(), EpisodeShape::Single);
        assert_eq!(
            detect_shape(&["episodenumberstart", "episodenumberend"]).unwrap(),
            EpisodeShape::Range
        );
        assert_eq!(
            detect_shape(&["episodenumber10", "episodenumber2", "episodenumber1"]).unwrap(),
            EpisodeShape::Indexed(vec![
                "episodenumber1".to_string(),
                "episodenumber2".to_string(),
                "episodenumber10".to_string(),
            ])
        );
        assert!(matches!(
            detect_shape(&["showname"]),
            Err(PatternError::MissingEpisodeNumber)
        ));
        assert!(matches!(
            detect_shape(&["episodenumberstart"]),
            Err(PatternError::IncompleteRange)
        ));
        assert!(matches!(
            detect_shape(&["episodenumber", "episodenumber1"]),
            Err(PatternError::AmbiguousEpisodeNumber(_))
        ));
    }

    #[test]
    fn test_pattern_without_episode_group_is_rejected() {
        let set = PatternSet::compile([r"^(?P<showname>.+)$"]);
        assert!(set.is_empty());
        assert_eq!(set.rejected()[0].0, r"^(?P<showname>.+)$");
    }

    #[test]
    fn test_unbalanced_pattern_is_rejected() {
        let source = r"zzz)|(?P<showname>x)(?P<episodenumber>\d+";
        assert!(matches!(
            EpisodePattern::compile(source),
            Err(PatternError::Syntax(_))
        ));

        let set = PatternSet::compile([source]);
        assert!(set.is_empty());
        assert_eq!(set.rejected().len(), 1);
    }

    #[test]
    fn test_comment_at_end_of_pattern() {
        let pattern =
            EpisodePattern::compile(r"^(?P<showname>\w+)\.(?P<episodenumber>\d+) # trailing")
                .unwrap();
        assert!(pattern.regex().is_match("show.12"));
        assert!(!pattern.regex().is_match("xx show.12"));
    }
}
