//! Unique-name resolution utilities.
//!
//! Policy:
//! - A name not yet reserved is returned unchanged.
//! - Otherwise `format_counter(name, n)` is tried for n = 2, 3, ... until a free
//!   name is found. The formatter always receives the original name, so suffixes
//!   never compound ("a (2) (3)" cannot happen).
//!
//! Notes:
//! - Decisions depend only on set membership, never on insertion order.
//! - Termination relies on the formatter producing distinct names for distinct
//!   counters. The default formatter and [`CounterTemplate`] guarantee it; a custom
//!   closure must too, otherwise resolution can loop forever.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::trace;

use crate::errors::SmartRenameError;

/// Maps (base name, counter >= 2) to a disambiguated name. Owned formatters are
/// `'static`; functions that only borrow one accept any lifetime.
pub type FormatCounterFn = dyn Fn(&str, u64) -> String + Send + Sync;

/// Shared, cloneable counter formatter.
pub type CounterFormatter = Arc<FormatCounterFn>;

/// `"<name> (<counter>)"`.
pub fn default_format_counter(name: &str, counter: u64) -> String {
    format!("{name} ({counter})")
}

/// Names already committed within one target directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedNameSet {
    names: HashSet<String>,
}

impl ReservedNameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns true if the name was not reserved before.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ReservedNameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for ReservedNameSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

/// Return `name` if free, else the first free `format_counter(name, n)` for n >= 2.
pub fn generate_unique_name(
    name: &str,
    reserved: &ReservedNameSet,
    format_counter: &(dyn Fn(&str, u64) -> String + Send + Sync + '_),
) -> String {
    let mut unique = name.to_string();
    let mut counter: u64 = 2;
    while reserved.contains(&unique) {
        trace!(taken = %unique, counter, "name already taken; trying next counter");
        unique = format_counter(name, counter);
        counter += 1;
    }
    if unique != name {
        trace!(name, unique = %unique, "resolved unique name");
    }
    unique
}

/// Split a file name into (base, extension) where the extension keeps its dot.
///
/// Examples:
/// - "photo.png"      -> ("photo", ".png")
/// - "archive.tar.gz" -> ("archive.tar", ".gz")
/// - ".env"           -> (".env", "")
/// - "README"         -> ("README", "")
/// - "trailing."      -> ("trailing", ".")
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if file_name[..idx].chars().any(|c| c != '.') => {
            file_name.split_at(idx)
        }
        _ => (file_name, ""),
    }
}

/// A user-supplied counter format such as `"{name}_{n}"`.
///
/// `{name}` expands to the base name and `{n}` to the counter. The template must
/// contain `{n}`, which makes every counter produce a distinct name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterTemplate {
    template: String,
}

impl CounterTemplate {
    pub const DEFAULT: &'static str = "{name} ({n})";

    pub fn parse(template: &str) -> Result<Self, SmartRenameError> {
        if !template.contains("{n}") {
            return Err(SmartRenameError::InvalidCounterFormat(template.to_string()));
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    pub fn format(&self, name: &str, counter: u64) -> String {
        self.template
            .replace("{n}", &counter.to_string())
            .replace("{name}", name)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Wrap into a formatter usable by the resolver and reconciler.
    pub fn into_formatter(self) -> CounterFormatter {
        Arc::new(move |name: &str, counter: u64| self.format(name, counter))
    }
}

impl Default for CounterTemplate {
    fn default() -> Self {
        Self {
            template: Self::DEFAULT.to_string(),
        }
    }
}

impl FromStr for CounterTemplate {
    type Err = SmartRenameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CounterTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
