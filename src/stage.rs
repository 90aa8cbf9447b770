//! Stage and version identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// One ordered step of the image build, identified by its index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stage(usize);

impl Stage {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }

    /// Stage this one builds on top of, if any
    pub fn previous(&self) -> Option<Stage> {
        self.0.checked_sub(1).map(Stage)
    }

    /// Directory name used in source, work and cache trees (`stage<N>`)
    pub fn dir_name(&self) -> String {
        format!("stage{}", self.0)
    }

    /// All stages of a pipeline in build order
    pub fn all(count: usize) -> impl Iterator<Item = Stage> {
        (0..count).map(Stage)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage{}", self.0)
    }
}

/// Identifier of the source change that produced a stage's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the cache holds for a stage
///
/// Anything other than `Present` is an invalid cache entry and never
/// matches a current version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "version", rename_all = "lowercase")]
pub enum CachedVersion {
    /// Stage cache directory absent or empty
    Missing,
    /// More than one entry; there is no way to tell which one is current
    Ambiguous(usize),
    /// Exactly one retained version
    Present(Version),
}

impl CachedVersion {
    pub fn version(&self) -> Option<&Version> {
        match self {
            Self::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Whether this cache entry was built from `current`
    pub fn matches(&self, current: &Version) -> bool {
        self.version() == Some(current)
    }
}

impl fmt::Display for CachedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "<cache invalid: empty>"),
            Self::Ambiguous(n) => write!(f, "<cache invalid: {} entries>", n),
            Self::Present(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_dir_name() {
        assert_eq!(Stage::new(0).dir_name(), "stage0");
        assert_eq!(Stage::new(3).to_string(), "stage3");
    }

    #[test]
    fn stage_previous() {
        assert_eq!(Stage::new(0).previous(), None);
        assert_eq!(Stage::new(2).previous(), Some(Stage::new(1)));
    }

    #[test]
    fn stage_all_in_order() {
        let stages: Vec<usize> = Stage::all(4).map(|s| s.index()).collect();
        assert_eq!(stages, vec![0, 1, 2, 3]);
    }

    #[test]
    fn version_short() {
        let v = Version::new("0123456789abcdef0123");
        assert_eq!(v.short(), "0123456789ab");
        assert_eq!(Version::new("abc").short(), "abc");
    }

    #[test]
    fn invalid_cache_never_matches() {
        let v = Version::new("abc");
        assert!(!CachedVersion::Missing.matches(&v));
        assert!(!CachedVersion::Ambiguous(2).matches(&v));
        assert!(CachedVersion::Present(v.clone()).matches(&v));
        assert!(!CachedVersion::Present(Version::new("def")).matches(&v));
    }

    #[test]
    fn cached_version_serializes_tagged() {
        let json = serde_json::to_value(CachedVersion::Present(Version::new("abc"))).unwrap();
        assert_eq!(json["state"], "present");
        assert_eq!(json["version"], "abc");
    }
}
