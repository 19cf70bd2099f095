//! Key path segments.
//!
//! A submission key such as `owners.#1.name` is split on `.` and every
//! segment is tagged explicitly: `#<digits>` is a list index, anything else
//! is a property name. Structure is never inferred from the values.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static INDEX_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(\d+)$").expect("index segment regex is valid"));

/// One segment of a submission key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// `#<n>`: position inside a list.
    Index(usize),
    /// Named property inside an object.
    Property(String),
}

impl PathSegment {
    /// Tag a single raw segment.
    ///
    /// Returns `Err(digits)` when the segment is an index marker whose number
    /// does not fit in `usize`; the caller reports that as an out-of-range
    /// index rather than silently treating it as a property.
    pub fn parse(segment: &str) -> Result<Self, String> {
        match INDEX_SEGMENT.captures(segment) {
            Some(caps) => {
                let digits = &caps[1];
                digits
                    .parse::<usize>()
                    .map(Self::Index)
                    .map_err(|_| digits.to_string())
            }
            None => Ok(Self::Property(segment.to_string())),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Self::Index(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{}", i),
            Self::Property(name) => f.write_str(name),
        }
    }
}

/// Split a key into tagged segments.
///
/// Index markers too large for `usize` come back as `Err` carrying the
/// offending digits.
pub fn parse_key(key: &str) -> Result<Vec<PathSegment>, String> {
    key.split('.').map(PathSegment::parse).collect()
}

/// Render segments back into key syntax (`owners.#1.name`).
pub fn format_path(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
