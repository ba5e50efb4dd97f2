//! Path expressions addressing subtrees of a document.
//!
//! A path is written as `/`-delimited segments: `/array/0/key`. Empty
//! segments are ignored, so `""`, `"/"` and `"//"` all denote the root and
//! `"a/b/"` equals `"/a/b"`.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// One step of a [`Path`].
///
/// Segments are always text. Whether a segment is used as a map key or a
/// list index depends on the node it is applied to; [`as_index`] gives the
/// list interpretation.
///
/// [`as_index`]: PathSegment::as_index
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment(String);

impl PathSegment {
    pub fn new(segment: impl Into<String>) -> Self {
        Self(segment.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The segment as a list index, if it reads as a non-negative decimal.
    ///
    /// An optional leading `+` and leading zeros are accepted (`"+1"` and
    /// `"01"` are both index 1); `"-1"` and values past `usize` are not.
    pub fn as_index(&self) -> Option<usize> {
        self.0.parse().ok()
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

/// An ordered sequence of segments. The empty path denotes the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited path expression.
    pub fn parse(s: &str) -> Self {
        s.split('/')
            .filter(|seg| !seg.is_empty())
            .map(PathSegment::from)
            .collect()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.segments.push(segment.into());
    }

    /// A new path with one more segment.
    pub fn join(&self, segment: impl Into<PathSegment>) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
