use crate::backup::result_error::result::Result;

use derive_more::{Display, From};
use getset::Getters;
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize};

use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::result;

/// A single shell-style ignore pattern such as `*.tmp` or `.git`.
///
/// Built with literal separator mode, so a pattern never matches across a
/// `/` and only ever applies to one entry name.
#[derive(Clone, Debug, From, Display, Serialize, PartialEq, Eq, Getters)]
#[serde(transparent)]
#[getset(get = "pub")]
pub struct IgnorePattern {
    glob: Glob,
}

impl IgnorePattern {
    pub fn new<S: AsRef<str>>(pattern: S) -> Result<Self> {
        Ok(GlobBuilder::new(pattern.as_ref())
            .literal_separator(true)
            .build()?
            .into())
    }
}

struct IgnorePatternVisitor;

impl Visitor<'_> for IgnorePatternVisitor {
    type Value = IgnorePattern;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a glob pattern")
    }

    fn visit_str<E>(self, v: &str) -> result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        GlobBuilder::new(v)
            .literal_separator(true)
            .build()
            .map(IgnorePattern::from)
            .map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for IgnorePattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        deserializer.deserialize_str(IgnorePatternVisitor)
    }
}

/// Compiled set of ignore patterns, shared by every directive of a run.
#[derive(Clone, Debug, Getters)]
pub struct IgnoreSet {
    #[getset(get = "pub")]
    patterns: Vec<IgnorePattern>,
    set: GlobSet,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

impl IgnoreSet {
    pub fn new<I: IntoIterator<Item = IgnorePattern>>(patterns: I) -> Result<Self> {
        let patterns: Vec<_> = patterns.into_iter().collect();
        let mut builder = GlobSetBuilder::new();
        patterns.iter().for_each(|p| {
            builder.add(p.glob.clone());
        });

        Ok(Self {
            set: builder.build()?,
            patterns,
        })
    }

    /// Matches a single entry name, never a full path.
    pub fn is_match<P: AsRef<Path>>(&self, name: P) -> bool {
        let name = name.as_ref();
        let matched = self.set.is_match(name);
        if matched {
            tracing::trace!("{:?} matches an ignore pattern", name);
        }
        matched
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> IgnoreSet {
        IgnoreSet::new(patterns.iter().map(|p| IgnorePattern::new(p).unwrap())).unwrap()
    }

    #[test]
    fn test_ignore_pattern_deserialization() {
        let pattern: IgnorePattern = serde_json::from_str("\"*.tmp\"").unwrap();
        assert_eq!(pattern.to_string(), "*.tmp");
    }

    #[test]
    fn test_ignore_pattern_invalid() {
        assert!(serde_json::from_str::<IgnorePattern>("\"[invalid\"").is_err());
        assert!(IgnorePattern::new("[invalid").is_err());
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let ignore = IgnoreSet::default();
        assert!(ignore.is_empty());
        assert!(!ignore.is_match("anything"));
    }

    #[test]
    fn test_star_question_and_class() {
        let ignore = set(&["*.tmp", "cache?", "[ab].log", ".git"]);
        assert!(ignore.is_match("b.tmp"));
        assert!(ignore.is_match(".tmp"));
        assert!(ignore.is_match("cache1"));
        assert!(!ignore.is_match("cache12"));
        assert!(ignore.is_match("a.log"));
        assert!(!ignore.is_match("c.log"));
        assert!(ignore.is_match(".git"));
        assert!(!ignore.is_match(".github"));
        assert!(!ignore.is_match("c.txt"));
    }

    #[test]
    fn test_negated_class() {
        let ignore = set(&["[!a]*"]);
        assert!(ignore.is_match("b"));
        assert!(!ignore.is_match("abc"));
    }

    #[test]
    fn test_pattern_does_not_cross_separator() {
        let ignore = set(&["*.tmp"]);
        assert!(!ignore.is_match("a/b.tmp"));
    }
}
