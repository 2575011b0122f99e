//! Dotted keypaths
//!
//! A [`Keypath`] locates a value inside an object graph, starting from the
//! object a pass was invoked on: `author.articles.0.title`. Keypaths are the
//! keys of validation error maps.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Location of a value relative to a root object
///
/// # Examples
/// - `["counts", "0"]` → `counts.0`
/// - `["profile", "user", "name"]` → `profile.user.name`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Keypath(Vec<String>);

impl Keypath {
    /// Empty keypath, the root object itself
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Keypath with a single key
    #[inline]
    #[must_use]
    pub fn single(key: impl Into<String>) -> Self {
        Self(vec![key.into()])
    }

    /// Keys from root to leaf
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check for the root keypath
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keypath with the last key dropped (root stays root)
    #[inline]
    #[must_use]
    pub fn drop_last(&self) -> Self {
        let mut segments = self.0.clone();
        segments.pop();
        Self(segments)
    }

    /// Last key
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a key, returning a new keypath
    #[inline]
    #[must_use]
    pub fn child(&self, key: impl Display) -> Self {
        let mut new = self.clone();
        new.0.push(key.to_string());
        new
    }

    /// Check if this keypath is a prefix of another
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
    }
}

impl Display for Keypath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for Keypath {
    type Err = KeypathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(KeypathError::EmptySegment(s.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self(segments))
    }
}

impl From<Vec<String>> for Keypath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// Errors parsing keypaths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeypathError {
    /// `a..b` or a leading/trailing dot
    #[error("keypath '{0}' contains an empty segment")]
    EmptySegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_displays_empty() {
        assert_eq!(Keypath::root().to_string(), "");
        assert!(Keypath::root().is_empty());
    }

    #[test]
    fn child_does_not_touch_parent() {
        let parent = Keypath::single("counts");
        let child = parent.child(0);
        assert_eq!(parent.to_string(), "counts");
        assert_eq!(child.to_string(), "counts.0");
        assert_eq!(child.last(), Some("0"));
        assert_eq!(child.len(), 2);
    }

    #[test]
    fn drop_last_on_root_is_root() {
        assert_eq!(Keypath::root().drop_last(), Keypath::root());
        let path: Keypath = "a.b.c".parse().unwrap();
        assert_eq!(path.drop_last().to_string(), "a.b");
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!("a..b".parse::<Keypath>().is_err());
        assert!(".a".parse::<Keypath>().is_err());
        assert_eq!("".parse::<Keypath>().unwrap(), Keypath::root());
    }

    #[test]
    fn prefix_check() {
        let a: Keypath = "user.posts".parse().unwrap();
        let b: Keypath = "user.posts.1.title".parse().unwrap();
        assert!(a.is_prefix_of(&b));
        assert!(!b.is_prefix_of(&a));
        assert!(Keypath::root().is_prefix_of(&a));
    }

    proptest! {
        #[test]
        fn display_parses_back(segments in prop::collection::vec("[a-z0-9_]{1,8}", 0..6)) {
            let path = Keypath::from(segments.clone());
            let parsed: Keypath = path.to_string().parse().unwrap();
            prop_assert_eq!(parsed.segments(), segments.as_slice());
        }

        #[test]
        fn child_then_drop_last_is_identity(
            segments in prop::collection::vec("[a-z]{1,5}", 0..5),
            key in "[a-z0-9]{1,5}",
        ) {
            let path = Keypath::from(segments);
            let child = path.child(&key);
            prop_assert_eq!(child.last(), Some(key.as_str()));
            prop_assert!(path.is_prefix_of(&child));
            prop_assert_eq!(child.drop_last(), path);
        }
    }
}
