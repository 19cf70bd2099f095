//! Flat submission → nested `RawNode`.
//!
//! Each key is split into tagged segments and walked from the root object.
//! Missing intermediate containers are created from the *next* segment: an
//! index marker makes a list, anything else an object. The final segment
//! receives the leaf, replacing whatever was there before (last write wins).
//!
//! Descending through a node of the wrong kind is a structural fault:
//! an index segment under an object or leaf, or a property segment under a
//! list or leaf. The whole decode aborts with a `DecodeError`.

use crate::error::DecodeError;
use crate::path::{PathSegment, format_path, parse_key};
use crate::value::{FormValue, RawNode, Submission};

/// Bounds applied to untrusted submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum number of segments in one key.
    pub max_depth: usize,
    /// Largest accepted `#<n>` index.
    pub max_index: usize,
    /// Maximum number of `(key, value)` pairs.
    pub max_entries: usize,
    /// Total list slots the whole submission may allocate. Lists are dense,
    /// so holes below a high index count too.
    pub max_slots: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_index: 1000,
            max_entries: 1000,
            max_slots: 10_000,
        }
    }
}

/// Decode with `DecodeLimits::default()`.
pub fn decode(submission: &Submission) -> Result<RawNode, DecodeError> {
    decode_with_limits(submission, DecodeLimits::default())
}

pub fn decode_with_limits(
    submission: &Submission,
    limits: DecodeLimits,
) -> Result<RawNode, DecodeError> {
    if submission.len() > limits.max_entries {
        return Err(DecodeError::TooManyEntries {
            count: submission.len(),
            max: limits.max_entries,
        });
    }

    let mut root = RawNode::empty_object();
    let mut slots = 0;
    for (key, value) in submission.entries() {
        let segments = parse_key(key).map_err(|digits| DecodeError::IndexOutOfRange {
            key: key.clone(),
            index: digits,
            max: limits.max_index,
        })?;
        check_limits(key, &segments, &limits)?;
        let mut cursor = Cursor {
            segments: &segments,
            key,
            slots: &mut slots,
            max_slots: limits.max_slots,
        };
        set_nested(&mut root, &mut cursor, 0, value.clone())?;
    }

    tracing::trace!(entries = submission.len(), slots, "decoded form submission");
    Ok(root)
}

fn check_limits(key: &str, segments: &[PathSegment], limits: &DecodeLimits) -> Result<(), DecodeError> {
    if segments.len() > limits.max_depth {
        return Err(DecodeError::PathTooDeep {
            key: key.to_string(),
            depth: segments.len(),
            max: limits.max_depth,
        });
    }
    for segment in segments {
        if let PathSegment::Index(i) = segment {
            if *i > limits.max_index {
                return Err(DecodeError::IndexOutOfRange {
                    key: key.to_string(),
                    index: i.to_string(),
                    max: limits.max_index,
                });
            }
        }
    }
    Ok(())
}

fn container_for(next: &PathSegment) -> RawNode {
    match next {
        PathSegment::Index(_) => RawNode::Array(Vec::new()),
        PathSegment::Property(_) => RawNode::empty_object(),
    }
}

fn position(segments: &[PathSegment], pos: usize) -> String {
    if pos == 0 {
        "(root)".to_string()
    } else {
        format_path(&segments[..pos])
    }
}

/// One key's walk, plus the slot budget shared by the whole submission.
struct Cursor<'a> {
    segments: &'a [PathSegment],
    key: &'a str,
    slots: &'a mut usize,
    max_slots: usize,
}

impl Cursor<'_> {
    /// Reserve `n` more list slots, failing before anything is allocated.
    fn reserve(&mut self, n: usize) -> Result<(), DecodeError> {
        match self.slots.checked_add(n) {
            Some(total) if total <= self.max_slots => {
                *self.slots = total;
                Ok(())
            }
            _ => Err(DecodeError::TooLarge {
                key: self.key.to_string(),
                max: self.max_slots,
            }),
        }
    }
}

fn set_nested(
    container: &mut RawNode,
    cursor: &mut Cursor<'_>,
    pos: usize,
    value: FormValue,
) -> Result<(), DecodeError> {
    let segments = cursor.segments;
    let Some(segment) = segments.get(pos) else {
        return Ok(());
    };
    let is_last = pos + 1 == segments.len();

    let child = match (segment, container) {
        (PathSegment::Index(i), RawNode::Array(items)) => {
            if *i >= items.len() {
                cursor.reserve(i + 1 - items.len())?;
                items.resize_with(i + 1, || None);
            }
            let slot = &mut items[*i];
            if is_last {
                *slot = Some(RawNode::Leaf(value));
                return Ok(());
            }
            slot.get_or_insert_with(|| container_for(&segments[pos + 1]))
        }
        (PathSegment::Property(name), RawNode::Object(map)) => {
            if is_last {
                map.insert(name.clone(), RawNode::Leaf(value));
                return Ok(());
            }
            map.entry(name.clone())
                .or_insert_with(|| container_for(&segments[pos + 1]))
        }
        (PathSegment::Index(_), other) => {
            return Err(DecodeError::ExpectedArray {
                key: cursor.key.to_string(),
                at: position(segments, pos),
                found: other.kind(),
            });
        }
        (PathSegment::Property(_), other) => {
            return Err(DecodeError::ExpectedObject {
                key: cursor.key.to_string(),
                at: position(segments, pos),
                found: other.kind(),
            });
        }
    };

    set_nested(child, cursor, pos + 1, value)
}
