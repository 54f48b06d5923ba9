//! Name transformation.
//!
//! Strips literal substrings and regex matches from a name, in order, then
//! optionally removes all whitespace. Pure string functions: no I/O, no failure
//! modes once the patterns are built.
//!
//! Pattern text syntax (used by the CLI and the XML config):
//! - `re:<regex>`  -> regular expression
//! - `lit:<text>`  -> literal (escape hatch for text that starts with `re:`)
//! - anything else -> literal

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::errors::SmartRenameError;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// A single thing to remove from a name.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Remove every occurrence of this exact text.
    Literal(String),
    /// Remove every match of this expression.
    Regex(Regex),
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Compile a regular expression pattern.
    pub fn regex(expr: &str) -> Result<Self, SmartRenameError> {
        Regex::new(expr)
            .map(Pattern::Regex)
            .map_err(|e| SmartRenameError::InvalidPattern {
                pattern: expr.to_string(),
                reason: e.to_string(),
            })
    }

    /// Parse the `re:` / `lit:` text syntax.
    pub fn parse(s: &str) -> Result<Self, SmartRenameError> {
        if let Some(expr) = s.strip_prefix("re:") {
            Self::regex(expr)
        } else if let Some(text) = s.strip_prefix("lit:") {
            Ok(Self::literal(text))
        } else {
            Ok(Self::literal(s))
        }
    }

    fn remove_from(&self, input: &str) -> String {
        match self {
            // An empty literal would match between every char; treat it as a no-op.
            Pattern::Literal(text) if text.is_empty() => input.to_string(),
            Pattern::Literal(text) => input.replace(text.as_str(), ""),
            Pattern::Regex(re) => re.replace_all(input, "").into_owned(),
        }
    }
}

impl FromStr for Pattern {
    type Err = SmartRenameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => write!(f, "{text}"),
            Pattern::Regex(re) => write!(f, "re:{}", re.as_str()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::literal(s)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Regex(re)
    }
}

/// What to strip from each name.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Applied in order; every occurrence of each is removed.
    pub patterns_to_remove: Vec<Pattern>,
    /// Remove all whitespace (not collapse to one space) and trim.
    pub remove_spaces: bool,
}

impl TransformOptions {
    pub fn new(patterns_to_remove: Vec<Pattern>) -> Self {
        Self {
            patterns_to_remove,
            remove_spaces: false,
        }
    }

    pub fn with_remove_spaces(mut self, remove_spaces: bool) -> Self {
        self.remove_spaces = remove_spaces;
        self
    }
}

/// Same knobs as [`TransformOptions`], named after the blacklist it holds.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub blacklist: Vec<Pattern>,
    pub remove_spaces: bool,
}

impl From<CleanOptions> for TransformOptions {
    fn from(opts: CleanOptions) -> Self {
        Self {
            patterns_to_remove: opts.blacklist,
            remove_spaces: opts.remove_spaces,
        }
    }
}

/// Remove every pattern from `input`, then strip whitespace if requested.
pub fn transform(input: &str, options: &TransformOptions) -> String {
    strip(input, &options.patterns_to_remove, options.remove_spaces)
}

/// Blacklist-flavoured alias of [`transform`].
pub fn clean(input: &str, options: &CleanOptions) -> String {
    strip(input, &options.blacklist, options.remove_spaces)
}

fn strip(input: &str, patterns: &[Pattern], remove_spaces: bool) -> String {
    let mut result = input.to_string();
    for pattern in patterns {
        result = pattern.remove_from(&result);
    }
    if remove_spaces {
        result = WHITESPACE_RUN.replace_all(&result, "").trim().to_string();
    }
    result
}
