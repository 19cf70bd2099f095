//! Structural projection of a decoded tree onto a schema.
//!
//! Nothing here validates. Values are copied as typed so they can be shown
//! again; only the *shape* is forced to match the schema:
//!
//! - object schema: one entry per schema field, in schema order. Input keys
//!   the schema does not know are dropped; fields the input lacks are
//!   projected from nothing (unset leaves, objects of unset fields, empty
//!   lists).
//! - list schema: list input is projected item by item, anything else
//!   becomes an empty list.
//! - leaf schema: the submitted value passes through untouched. A container
//!   in leaf position cannot be shown as a single value and is left unset.

use indexmap::IndexMap;

use crate::schema::Schema;
use crate::value::{FormValue, RawNode};

/// Input reshaped to a schema, values still unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped {
    Value(Option<FormValue>),
    Object(IndexMap<String, Shaped>),
    List(Vec<Shaped>),
}

pub fn shape(schema: &Schema, input: Option<&RawNode>) -> Shaped {
    match schema {
        Schema::Object(object) => {
            let fields = match input {
                Some(RawNode::Object(map)) => Some(map),
                _ => None,
            };
            Shaped::Object(
                object
                    .fields()
                    .iter()
                    .map(|(name, field)| {
                        let child = fields.and_then(|m| m.get(name));
                        (name.clone(), shape(field, child))
                    })
                    .collect(),
            )
        }
        Schema::Array(array) => match input {
            Some(RawNode::Array(items)) => Shaped::List(
                items
                    .iter()
                    .map(|item| shape(array.element(), item.as_ref()))
                    .collect(),
            ),
            _ => Shaped::List(Vec::new()),
        },
        Schema::Leaf(_) => Shaped::Value(input.and_then(RawNode::as_leaf).cloned()),
    }
}

impl Shaped {
    /// Every leaf path in key syntax, depth first.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_paths(self, String::new(), &mut out);
        out
    }
}

fn collect_paths(node: &Shaped, prefix: String, out: &mut Vec<String>) {
    let join = |segment: String| {
        if prefix.is_empty() {
            segment
        } else {
            format!("{}.{}", prefix, segment)
        }
    };
    match node {
        Shaped::Value(_) => out.push(prefix.clone()),
        Shaped::Object(map) => {
            for (name, child) in map {
                collect_paths(child, join(name.clone()), out);
            }
        }
        Shaped::List(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_paths(child, join(format!("#{}", i)), out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::schema::{ArraySchema, LeafSchema, ObjectSchema};
    use crate::value::Submission;

    fn decoded(pairs: &[(&str, &str)]) -> RawNode {
        let sub: Submission = pairs.iter().map(|(k, v)| (*k, *v)).collect();
        decode(&sub).unwrap()
    }

    fn profile() -> Schema {
        ObjectSchema::new()
            .field("name", LeafSchema::text())
            .field(
                "address",
                ObjectSchema::new()
                    .field("city", LeafSchema::text())
                    .field("zip", LeafSchema::text()),
            )
            .field("tags", ArraySchema::of(LeafSchema::text()))
            .into()
    }

    #[test]
    fn test_paths_match_schema_exactly() {
        let root = decoded(&[
            ("name", "Ann"),
            ("address.city", "Oslo"),
            ("address.zip", "0150"),
            ("tags.#0", "a"),
        ]);
        let shaped = shape(&profile(), Some(&root));
        assert_eq!(
            shaped.leaf_paths(),
            vec!["name", "address.city", "address.zip", "tags.#0"]
        );
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let root = decoded(&[("name", "Ann"), ("role", "admin"), ("address.country", "NO")]);
        let shaped = shape(&profile(), Some(&root));
        let paths = shaped.leaf_paths();
        assert!(!paths.iter().any(|p| p == "role" || p == "address.country"));
    }

    #[test]
    fn test_missing_fields_are_unset() {
        let shaped = shape(&profile(), Some(&decoded(&[("tags", "oops")])));
        match shaped {
            Shaped::Object(map) => {
                assert_eq!(map["name"], Shaped::Value(None));
                assert_eq!(
                    map["address"],
                    Shaped::Object(IndexMap::from([
                        ("city".to_string(), Shaped::Value(None)),
                        ("zip".to_string(), Shaped::Value(None)),
                    ]))
                );
                assert_eq!(map["tags"], Shaped::List(Vec::new()));
            }
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_leaf_values_pass_through_unvalidated() {
        let schema: Schema = ObjectSchema::new()
            .field("age", LeafSchema::text().to_number("Age must be a number"))
            .into();
        let shaped = shape(&schema, Some(&decoded(&[("age", "not-a-number")])));
        assert_eq!(
            shaped,
            Shaped::Object(IndexMap::from([(
                "age".to_string(),
                Shaped::Value(Some("not-a-number".into()))
            )]))
        );
    }

    #[test]
    fn test_holes_become_unset_items() {
        let schema: Schema = ObjectSchema::new()
            .field("tags", ArraySchema::of(LeafSchema::text()))
            .into();
        let shaped = shape(&schema, Some(&decoded(&[("tags.#1", "b")])));
        assert_eq!(shaped.leaf_paths(), vec!["tags.#0", "tags.#1"]);
    }

    #[test]
    fn test_container_in_leaf_position_is_unset() {
        let schema: Schema = ObjectSchema::new().field("name", LeafSchema::text()).into();
        let shaped = shape(&schema, Some(&decoded(&[("name.first", "A")])));
        assert_eq!(
            shaped,
            Shaped::Object(IndexMap::from([("name".to_string(), Shaped::Value(None))]))
        );
    }
}
