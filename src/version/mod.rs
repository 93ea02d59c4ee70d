//! Version parsing and comparison.
//!
//! Versions are dot-separated lists of numeric and tag segments
//! (`1.2.3`, `2.a`, `1.0.0.rc1`). Any tag segment marks the version as a
//! prerelease. A `-` is read as `.pre.`, so `1.0-beta` is a prerelease too.

mod requirement;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

pub use requirement::{Op, Requirement};

/// Errors produced while parsing versions and requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Malformed version number string {0:?}")]
    InvalidVersion(String),
    #[error("Illformed requirement {0:?}")]
    InvalidRequirement(String),
}

/// A single comparable piece of a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Number(u64),
    Tag(String),
}

impl Segment {
    fn is_zero(&self) -> bool {
        matches!(self, Segment::Number(0))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
            (Segment::Tag(a), Segment::Tag(b)) => a.cmp(b),
            // Release segments always sort above prerelease tags
            (Segment::Number(_), Segment::Tag(_)) => Ordering::Greater,
            (Segment::Tag(_), Segment::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A parsed package version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    raw: String,
    segments: Vec<Segment>,
}

impl Version {
    /// The lowest possible version, `0`.
    pub fn zero() -> Self {
        Self {
            raw: "0".to_string(),
            segments: vec![Segment::Number(0)],
        }
    }

    /// Parse a version string.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let trimmed = s.trim();
        let valid = trimmed.starts_with(|c: char| c.is_ascii_digit())
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
            && !trimmed.contains("..")
            && !trimmed.ends_with('.');
        if !valid {
            return Err(VersionError::InvalidVersion(s.to_string()));
        }

        let normalized = trimmed.replace('-', ".pre.");
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut in_digits = true;

        let mut flush = |current: &mut String, digits: bool| -> Result<(), VersionError> {
            if current.is_empty() {
                return Ok(());
            }
            let segment = if digits {
                let n = current
                    .parse::<u64>()
                    .map_err(|_| VersionError::InvalidVersion(s.to_string()))?;
                Segment::Number(n)
            } else {
                Segment::Tag(std::mem::take(current))
            };
            current.clear();
            segments.push(segment);
            Ok(())
        };

        for c in normalized.chars() {
            if c == '.' {
                flush(&mut current, in_digits)?;
                continue;
            }
            let digit = c.is_ascii_digit();
            if !current.is_empty() && digit != in_digits {
                flush(&mut current, in_digits)?;
            }
            in_digits = digit;
            current.push(c);
        }
        flush(&mut current, in_digits)?;

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// The version string as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A version is a prerelease when any of its segments is a tag.
    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Tag(_)))
    }

    /// The release this version belongs to: everything before the first tag.
    ///
    /// `1.2.a.3` releases as `1.2`.
    pub fn release(&self) -> Version {
        let segments: Vec<Segment> = self
            .segments
            .iter()
            .take_while(|s| matches!(s, Segment::Number(_)))
            .cloned()
            .collect();
        Self::from_segments(segments)
    }

    /// The upper bound used by the pessimistic operator.
    ///
    /// Drops tags and the last numeric segment, then increments what is left:
    /// `1.2.3` bumps to `1.3`, `1.2` bumps to `2`, `5` bumps to `6`.
    pub fn bump(&self) -> Version {
        let mut numbers: Vec<u64> = self
            .segments
            .iter()
            .map_while(|s| match s {
                Segment::Number(n) => Some(*n),
                Segment::Tag(_) => None,
            })
            .collect();
        if numbers.len() > 1 {
            numbers.pop();
        }
        match numbers.last_mut() {
            Some(last) => *last += 1,
            None => numbers.push(1),
        }
        Self::from_segments(numbers.into_iter().map(Segment::Number).collect())
    }

    fn from_segments(segments: Vec<Segment>) -> Self {
        let segments = if segments.is_empty() {
            vec![Segment::Number(0)]
        } else {
            segments
        };
        let raw = segments
            .iter()
            .map(|s| match s {
                Segment::Number(n) => n.to_string(),
                Segment::Tag(t) => t.clone(),
            })
            .collect::<Vec<_>>()
            .join(".");
        Self { raw, segments }
    }

    /// Segments with trailing zeros removed, used for equality and hashing
    /// so that `1.0` and `1` are the same version.
    fn canonical(&self) -> &[Segment] {
        let end = self
            .segments
            .iter()
            .rposition(|s| !s.is_zero())
            .map_or(0, |i| i + 1);
        &self.segments[..end]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        let zero = Segment::Number(0);
        for i in 0..len {
            let lhs = self.segments.get(i).unwrap_or(&zero);
            let rhs = other.segments.get(i).unwrap_or(&zero);
            match lhs.cmp(rhs) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_segments() {
        assert_eq!(
            v("1.2.3").segments(),
            &[Segment::Number(1), Segment::Number(2), Segment::Number(3)]
        );
        assert_eq!(
            v("2.a").segments(),
            &[Segment::Number(2), Segment::Tag("a".into())]
        );
        assert_eq!(
            v("1.0rc1").segments(),
            &[
                Segment::Number(1),
                Segment::Number(0),
                Segment::Tag("rc".into()),
                Segment::Number(1)
            ]
        );
    }

    #[test]
    fn test_parse_dash_is_prerelease() {
        let version = v("1.0-beta");
        assert!(version.is_prerelease());
        assert_eq!(version.to_string(), "1.0-beta");
        assert!(version < v("1.0"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("   ").is_err());
        assert!(Version::parse("a.1").is_err());
        assert!(Version::parse("1..2").is_err());
        assert!(Version::parse("1.2.").is_err());
        assert!(Version::parse("1.2 3").is_err());
        assert!(Version::parse("junk!").is_err());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(v(" 1.2 ").as_str(), "1.2");
    }

    #[test]
    fn test_prerelease_flag() {
        assert!(!v("2").is_prerelease());
        assert!(v("2.a").is_prerelease());
        assert!(v("1.0.0.rc1").is_prerelease());
    }

    #[test]
    fn test_ordering() {
        assert!(v("2") > v("1.9.9"));
        assert!(v("1.10") > v("1.9"));
        assert!(v("2") > v("2.a"));
        assert!(v("2.b") > v("2.a"));
        assert!(v("2.a") > v("1.9"));
        assert!(v("1.0.rc1") < v("1.0"));
        assert!(v("1.0.rc1") > v("0.9"));
    }

    #[test]
    fn test_trailing_zero_equality() {
        assert_eq!(v("1.0"), v("1"));
        assert_eq!(v("1.0.0"), v("1"));
        assert_ne!(v("1.0.1"), v("1"));

        use std::collections::HashSet;
        let set: HashSet<Version> = [v("1"), v("1.0"), v("1.0.0")].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_release() {
        assert_eq!(v("1.2.a.3").release().as_str(), "1.2");
        assert_eq!(v("1.2.3").release().as_str(), "1.2.3");
    }

    #[test]
    fn test_bump() {
        assert_eq!(v("1.2.3").bump().as_str(), "1.3");
        assert_eq!(v("1.2").bump().as_str(), "2");
        assert_eq!(v("5").bump().as_str(), "6");
        assert_eq!(v("1.2.b").bump().as_str(), "2");
    }

    #[test]
    fn test_serde_round_trip_as_string() {
        let json = serde_json::to_string(&v("2.a")).unwrap();
        assert_eq!(json, "\"2.a\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("2.a"));
        assert!(serde_json::from_str::<Version>("\"not a version\"").is_err());
    }
}
