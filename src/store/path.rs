use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::store::StoreError;

/// A `/`-separated location in the replicated document tree.
///
/// The empty path addresses the root of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let mut segments = Vec::new();
        for segment in raw.split('/') {
            if segment.is_empty() {
                continue;
            }
            if segment == "." || segment == ".." {
                return Err(StoreError::InvalidPath(raw.to_string()));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Whether `segment` can be passed to [`StorePath::child`] as one segment.
    pub fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('/')
    }

    /// Returns a new path with `segment` appended.
    ///
    /// Segments may not contain `/`; callers pass ids and fixed names only.
    pub fn child(&self, segment: impl fmt::Display) -> Self {
        let segment = segment.to_string();
        debug_assert!(!segment.contains('/'), "path segment contains '/': {segment}");
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// True when `self` equals `other` or is one of its ancestors.
    pub fn contains(&self, other: &StorePath) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// True when a change at one of the paths is visible from the other.
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.contains(other) || other.contains(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for StorePath {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for StorePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_redundant_separators() {
        let path = StorePath::parse("/current-match//events/").unwrap();
        assert_eq!(path.segments(), &["current-match", "events"]);
        assert_eq!(path.to_string(), "current-match/events");
    }

    #[test]
    fn parse_rejects_relative_segments() {
        assert!(StorePath::parse("users/../credentials").is_err());
    }

    #[test]
    fn overlap_is_ancestor_or_descendant() {
        let users = StorePath::parse("users").unwrap();
        let one_user = users.child("abc");
        let history = StorePath::parse("history").unwrap();

        assert!(users.overlaps(&one_user));
        assert!(one_user.overlaps(&users));
        assert!(!users.overlaps(&history));
        assert!(StorePath::root().overlaps(&history));
    }

    #[test]
    fn single_segments_are_validated() {
        assert!(StorePath::is_valid_segment("3f2a"));
        assert!(!StorePath::is_valid_segment(""));
        assert!(!StorePath::is_valid_segment("a/b"));
        assert!(!StorePath::is_valid_segment(".."));
    }

    #[test]
    fn parent_of_root_is_none() {
        assert!(StorePath::root().parent().is_none());
        let path = StorePath::parse("a/b").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "a");
    }
}
