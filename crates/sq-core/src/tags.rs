//! Capability tags passed to a run.
//!
//! Tags are recorded against the script migrations that received them, so a
//! later run with fewer tags can be refused before it touches the database.

use crate::error::{SqergeError, SqergeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Separator used when a tag set travels as a single string.
pub(crate) const TAG_DELIMITER: char = ',';

/// An ordered set of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeSet<String>);

impl Tags {
    /// Empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tag set, rejecting tags that cannot be stored.
    pub fn try_from_iter<I, S>(tags: I) -> SqergeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for tag in tags {
            let tag = tag.into();
            validate_tag(&tag)?;
            set.insert(tag);
        }
        Ok(Self(set))
    }

    /// Parse a comma separated list, ignoring blank entries.
    pub fn parse_list(list: &str) -> SqergeResult<Self> {
        Self::try_from_iter(
            list.split(TAG_DELIMITER)
                .map(str::trim)
                .filter(|t| !t.is_empty()),
        )
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Union of both sets.
    pub fn merged(&self, other: &Tags) -> Tags {
        Tags(self.0.union(&other.0).cloned().collect())
    }

    /// Tags in `self` that `available` does not have, in order.
    pub fn missing_from(&self, available: &Tags) -> Vec<String> {
        self.0.difference(&available.0).cloned().collect()
    }

    /// Delimited form for storage; `None` for an empty set.
    pub(crate) fn to_delimited(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(
                self.0
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(&TAG_DELIMITER.to_string()),
            )
        }
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(", "))
    }
}

fn validate_tag(tag: &str) -> SqergeResult<()> {
    let valid = !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(SqergeError::ConfigInvalid {
            message: format!(
                "invalid tag '{tag}': tags may only contain letters, digits, '_', '-', '.' and ':'"
            ),
        })
    }
}

#[cfg(test)]
#[path = "tags_test.rs"]
mod tests;
