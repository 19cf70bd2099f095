use indexmap::IndexMap;
use serde::Serialize;

use crate::path::{PathSegment, parse_key};

/// Validation errors laid out along the schema.
///
/// `errors` holds messages for exactly this level; nested properties and
/// list items carry their own subtrees. Levels without problems are left
/// out, so absence means "no errors", never "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorTree {
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, ErrorTree>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Option<ErrorTree>>,
}

impl ErrorTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn set_property(&mut self, name: impl Into<String>, tree: ErrorTree) {
        self.properties.insert(name.into(), tree);
    }

    pub fn set_item(&mut self, index: usize, tree: ErrorTree) {
        if index >= self.items.len() {
            self.items.resize_with(index + 1, || None);
        }
        self.items[index] = Some(tree);
    }

    /// True when no level of the tree carries a message.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
            && self.properties.values().all(ErrorTree::is_empty)
            && self.items.iter().flatten().all(ErrorTree::is_empty)
    }

    pub fn property(&self, name: &str) -> Option<&ErrorTree> {
        self.properties.get(name)
    }

    pub fn item(&self, index: usize) -> Option<&ErrorTree> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// Look up a subtree by key syntax (`links.#0.url`).
    pub fn at(&self, path: &str) -> Option<&ErrorTree> {
        let segments = parse_key(path).ok()?;
        segments.iter().try_fold(self, |node, segment| match segment {
            PathSegment::Index(i) => node.item(*i),
            PathSegment::Property(name) => node.property(name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree_is_empty() {
        assert!(ErrorTree::new().is_empty());
    }

    #[test]
    fn test_nested_error_makes_tree_non_empty() {
        let mut root = ErrorTree::new();
        let mut links = ErrorTree::new();
        links.set_item(1, ErrorTree::message("Invalid URL"));
        root.set_property("links", links);
        assert!(!root.is_empty());
        assert_eq!(
            root.at("links.#1").map(|t| t.errors.clone()),
            Some(vec!["Invalid URL".to_string()])
        );
        assert!(root.at("links.#0").is_none());
    }

    #[test]
    fn test_serializes_like_a_tree() {
        let mut root = ErrorTree::new();
        root.set_property("age", ErrorTree::message("Age must be a number"));
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "errors": [],
                "properties": {"age": {"errors": ["Age must be a number"]}}
            })
        );
    }
}
