//! Echo builder: shaped input plus validation errors, ready for redisplay.
//!
//! `merge` walks a `Shaped` tree and an `ErrorTree` in lockstep. Wherever
//! the error tree has nothing for a path, the node gets an empty error list.
//! It never fails.

use indexmap::IndexMap;
use serde::Serialize;

use crate::errors::ErrorTree;
use crate::path::{PathSegment, parse_key};
use crate::shape::Shaped;
use crate::value::FormValue;

/// Submitted values, in the schema's shape, with their errors.
///
/// Values here are exactly what the user typed. They are for rendering the
/// form again and must not be used as validated data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EchoNode {
    Field {
        errors: Vec<String>,
        value: Option<FormValue>,
    },
    Object {
        errors: Vec<String>,
        properties: IndexMap<String, EchoNode>,
    },
    List {
        errors: Vec<String>,
        items: Vec<EchoNode>,
    },
}

pub fn merge(shaped: Shaped, errors: Option<&ErrorTree>) -> EchoNode {
    let own = errors.map(|e| e.errors.clone()).unwrap_or_default();
    match shaped {
        Shaped::Value(value) => EchoNode::Field { errors: own, value },
        Shaped::Object(map) => EchoNode::Object {
            errors: own,
            properties: map
                .into_iter()
                .map(|(name, child)| {
                    let child_errors = errors.and_then(|e| e.property(&name));
                    let node = merge(child, child_errors);
                    (name, node)
                })
                .collect(),
        },
        Shaped::List(items) => EchoNode::List {
            errors: own,
            items: items
                .into_iter()
                .enumerate()
                .map(|(i, child)| merge(child, errors.and_then(|e| e.item(i))))
                .collect(),
        },
    }
}

impl EchoNode {
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Field { errors, .. } | Self::Object { errors, .. } | Self::List { errors, .. } => {
                errors
            }
        }
    }

    /// Attach a message to this node, e.g. a form-level failure reported
    /// after validation succeeded.
    pub fn push_error(&mut self, message: impl Into<String>) {
        match self {
            Self::Field { errors, .. } | Self::Object { errors, .. } | Self::List { errors, .. } => {
                errors.push(message.into())
            }
        }
    }

    /// The submitted (unvalidated) value of a field node.
    pub fn value(&self) -> Option<&FormValue> {
        match self {
            Self::Field { value, .. } => value.as_ref(),
            _ => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&EchoNode> {
        match self {
            Self::Object { properties, .. } => properties.get(name),
            _ => None,
        }
    }

    pub fn item(&self, index: usize) -> Option<&EchoNode> {
        match self {
            Self::List { items, .. } => items.get(index),
            _ => None,
        }
    }

    /// Look up a node by key syntax (`links.#0.url`).
    pub fn at(&self, path: &str) -> Option<&EchoNode> {
        let segments = parse_key(path).ok()?;
        segments.iter().try_fold(self, |node, segment| match segment {
            PathSegment::Index(i) => node.item(*i),
            PathSegment::Property(name) => node.property(name),
        })
    }

    /// True when any node in the subtree carries an error.
    pub fn has_errors(&self) -> bool {
        if !self.errors().is_empty() {
            return true;
        }
        match self {
            Self::Field { .. } => false,
            Self::Object { properties, .. } => properties.values().any(EchoNode::has_errors),
            Self::List { items, .. } => items.iter().any(EchoNode::has_errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn leaf(v: &str) -> Shaped {
        Shaped::Value(Some(v.into()))
    }

    #[test]
    fn test_merge_without_errors_gives_empty_lists() {
        let shaped = Shaped::Object(IndexMap::from([
            ("name".to_string(), leaf("Alice")),
            ("tags".to_string(), Shaped::List(vec![leaf("a")])),
        ]));
        let echo = merge(shaped, None);
        assert!(!echo.has_errors());
        assert_eq!(
            serde_json::to_value(&echo).unwrap(),
            json!({
                "errors": [],
                "properties": {
                    "name": {"errors": [], "value": "Alice"},
                    "tags": {"errors": [], "items": [{"errors": [], "value": "a"}]}
                }
            })
        );
    }

    #[test]
    fn test_merge_attaches_errors_by_path() {
        let shaped = Shaped::Object(IndexMap::from([
            ("name".to_string(), leaf("Bob")),
            ("age".to_string(), leaf("not-a-number")),
            ("tags".to_string(), Shaped::List(vec![leaf(""), leaf("b")])),
        ]));
        let mut errors = ErrorTree::new();
        errors.set_property("age", ErrorTree::message("Age must be a number"));
        let mut tags = ErrorTree::message("Too few tags");
        tags.set_item(0, ErrorTree::message("Empty tag"));
        errors.set_property("tags", tags);

        let echo = merge(shaped, Some(&errors));
        assert!(echo.has_errors());
        assert!(echo.errors().is_empty());
        assert!(echo.at("name").unwrap().errors().is_empty());
        let age = echo.at("age").unwrap();
        assert_eq!(age.errors(), ["Age must be a number"]);
        assert_eq!(age.value(), Some(&FormValue::from("not-a-number")));
        assert_eq!(echo.at("tags").unwrap().errors(), ["Too few tags"]);
        assert_eq!(echo.at("tags.#0").unwrap().errors(), ["Empty tag"]);
        assert!(echo.at("tags.#1").unwrap().errors().is_empty());
    }

    #[test]
    fn test_errors_for_missing_paths_are_ignored() {
        let shaped = Shaped::Object(IndexMap::from([("name".to_string(), leaf("x"))]));
        let mut errors = ErrorTree::new();
        errors.set_property("dropped", ErrorTree::message("never shown"));
        let echo = merge(shaped, Some(&errors));
        assert!(echo.property("dropped").is_none());
        assert!(!echo.has_errors());
    }

    #[test]
    fn test_unset_value_serializes_as_null() {
        let echo = merge(Shaped::Value(None), Some(&ErrorTree::message("Required")));
        assert_eq!(
            serde_json::to_value(&echo).unwrap(),
            json!({"errors": ["Required"], "value": null})
        );
    }

    #[test]
    fn test_push_error_on_root() {
        let mut echo = merge(Shaped::Object(IndexMap::new()), None);
        echo.push_error("Bookmark already exists");
        assert_eq!(echo.errors(), ["Bookmark already exists"]);
    }
}
