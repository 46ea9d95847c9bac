//! Annotation codec.
//!
//! A field annotation is a comma-separated list of directives. Each
//! directive is either `key:value` (split on the first colon) or a bare
//! `key`, which maps to an empty value. There is no escaping: a comma always
//! separates directives and only the first colon in a directive is
//! significant, so `default:http://localhost` keeps its URL intact.
//!
//! ```rust
//! use structconf::tag;
//!
//! assert_eq!(tag::lookup("env:PORT,required", "env"), Some("PORT"));
//! assert_eq!(tag::lookup("env:PORT,required", "required"), Some(""));
//! assert_eq!(tag::lookup("env:PORT,required", "flag"), None);
//! ```

/// A parsed annotation.
///
/// Entries are kept in declaration order. When a key appears more than once
/// the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag<'a> {
    entries: Vec<(&'a str, &'a str)>,
}

impl<'a> Tag<'a> {
    /// Returns the value for `key`, if the directive is present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Returns `true` if the directive is present, with or without a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over the directives in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of directives, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the annotation holds no directives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses an annotation into its directives.
///
/// Empty segments (for example a trailing comma) are ignored.
#[must_use]
pub fn parse(annotation: &str) -> Tag<'_> {
    let entries = annotation
        .split(',')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once(':').unwrap_or((segment, "")))
        .collect();

    Tag { entries }
}

/// Looks up `key` in a raw annotation.
///
/// An empty `key` returns the raw annotation unmodified.
#[must_use]
pub fn lookup<'a>(annotation: &'a str, key: &str) -> Option<&'a str> {
    if key.is_empty() {
        return Some(annotation);
    }

    parse(annotation).get(key)
}
