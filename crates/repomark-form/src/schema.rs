//! Declarative form schemas.
//!
//! A schema is a closed set of node kinds: objects with named fields, lists
//! with one element schema, and leaves. Leaves carry a small pipeline of
//! checks and transforms applied to the submitted value.
//!
//! Validation walks the decoded tree and returns either the transformed
//! `serde_json::Value` or an `ErrorTree` keyed by the same paths.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::errors::ErrorTree;
use crate::value::{FormValue, RawNode};

pub const MSG_REQUIRED: &str = "Required";
pub const MSG_EXPECTED_OBJECT: &str = "Expected an object";
pub const MSG_EXPECTED_LIST: &str = "Expected a list";
pub const MSG_EXPECTED_VALUE: &str = "Expected a single value";
pub const MSG_EXPECTED_TEXT: &str = "Expected text";
pub const MSG_EXPECTED_FILE: &str = "Expected a file";
pub const MSG_INVALID_URL: &str = "Invalid URL";

pub type CheckFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
pub type TransformFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Object,
    Array,
    Leaf,
}

#[derive(Debug, Clone)]
pub enum Schema {
    Object(ObjectSchema),
    Array(ArraySchema),
    Leaf(LeafSchema),
}

impl Schema {
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Object(_) => SchemaKind::Object,
            Self::Array(_) => SchemaKind::Array,
            Self::Leaf(_) => SchemaKind::Leaf,
        }
    }

    /// Field schemas of an object node.
    pub fn fields(&self) -> Option<&IndexMap<String, Schema>> {
        match self {
            Self::Object(o) => Some(&o.fields),
            _ => None,
        }
    }

    /// Element schema of a list node.
    pub fn element(&self) -> Option<&Schema> {
        match self {
            Self::Array(a) => Some(&a.element),
            _ => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            Self::Object(o) => o.optional,
            Self::Array(a) => a.optional,
            Self::Leaf(l) => l.optional,
        }
    }

    /// Validate a decoded (sub)tree. Absent optional input validates to `null`.
    pub fn validate(&self, input: Option<&RawNode>) -> Result<Value, ErrorTree> {
        self.validate_node(input).map(|v| v.unwrap_or(Value::Null))
    }

    /// `Ok(None)` means "absent and allowed to be".
    fn validate_node(&self, input: Option<&RawNode>) -> Result<Option<Value>, ErrorTree> {
        let Some(node) = input else {
            return if self.is_optional() {
                Ok(None)
            } else {
                Err(ErrorTree::message(MSG_REQUIRED))
            };
        };
        match self {
            Self::Object(o) => o.validate(node).map(Some),
            Self::Array(a) => a.validate(node).map(Some),
            Self::Leaf(l) => match node {
                RawNode::Leaf(value) => l
                    .validate_value(value)
                    .map(Some)
                    .map_err(|errors| ErrorTree {
                        errors,
                        ..ErrorTree::default()
                    }),
                _ => Err(ErrorTree::message(MSG_EXPECTED_VALUE)),
            },
        }
    }
}

impl From<ObjectSchema> for Schema {
    fn from(o: ObjectSchema) -> Self {
        Self::Object(o)
    }
}

impl From<ArraySchema> for Schema {
    fn from(a: ArraySchema) -> Self {
        Self::Array(a)
    }
}

impl From<LeafSchema> for Schema {
    fn from(l: LeafSchema) -> Self {
        Self::Leaf(l)
    }
}

// ── Object ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: IndexMap<String, Schema>,
    optional: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.fields.insert(name.into(), schema.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn fields(&self) -> &IndexMap<String, Schema> {
        &self.fields
    }

    /// Unknown input keys never reach the output.
    fn validate(&self, node: &RawNode) -> Result<Value, ErrorTree> {
        let RawNode::Object(input) = node else {
            return Err(ErrorTree::message(MSG_EXPECTED_OBJECT));
        };
        let mut out = Map::new();
        let mut tree = ErrorTree::new();
        for (name, schema) in &self.fields {
            match schema.validate_node(input.get(name)) {
                Ok(Some(value)) => {
                    out.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(errors) => tree.set_property(name.clone(), errors),
            }
        }
        if tree.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(tree)
        }
    }
}

// ── Array ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ArraySchema {
    element: Box<Schema>,
    min_items: Option<(usize, String)>,
    max_items: Option<(usize, String)>,
    optional: bool,
}

impl ArraySchema {
    pub fn of(element: impl Into<Schema>) -> Self {
        Self {
            element: Box::new(element.into()),
            min_items: None,
            max_items: None,
            optional: false,
        }
    }

    pub fn min_items(mut self, n: usize, message: impl Into<String>) -> Self {
        self.min_items = Some((n, message.into()));
        self
    }

    pub fn max_items(mut self, n: usize, message: impl Into<String>) -> Self {
        self.max_items = Some((n, message.into()));
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn element(&self) -> &Schema {
        &self.element
    }

    fn validate(&self, node: &RawNode) -> Result<Value, ErrorTree> {
        let RawNode::Array(items) = node else {
            return Err(ErrorTree::message(MSG_EXPECTED_LIST));
        };
        let mut out = Vec::with_capacity(items.len());
        let mut tree = ErrorTree::new();
        for (i, item) in items.iter().enumerate() {
            match self.element.validate_node(item.as_ref()) {
                Ok(value) => out.push(value.unwrap_or(Value::Null)),
                Err(errors) => tree.set_item(i, errors),
            }
        }
        if let Some((min, message)) = &self.min_items {
            if items.len() < *min {
                tree.push(message.clone());
            }
        }
        if let Some((max, message)) = &self.max_items {
            if items.len() > *max {
                tree.push(message.clone());
            }
        }
        if tree.is_empty() {
            Ok(Value::Array(out))
        } else {
            Err(tree)
        }
    }
}

// ── Leaf ──────────────────────────────────────────────────────────────

#[derive(Clone)]
enum LeafBase {
    Text,
    File,
    /// First branch that accepts the value wins.
    AnyOf {
        branches: Vec<LeafSchema>,
        message: String,
    },
}

#[derive(Clone)]
enum Step {
    Check { test: CheckFn, message: String },
    Transform(TransformFn),
}

/// A single submitted value plus its check/transform pipeline.
///
/// Checks record their message and let later checks run, so one field can
/// report several problems at once. A transform only runs on a value that
/// passed everything before it; a failing transform ends the pipeline.
#[derive(Clone)]
pub struct LeafSchema {
    base: LeafBase,
    steps: Vec<Step>,
    optional: bool,
}

impl fmt::Debug for LeafSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match &self.base {
            LeafBase::Text => "text".to_string(),
            LeafBase::File => "file".to_string(),
            LeafBase::AnyOf { branches, .. } => format!("any_of({})", branches.len()),
        };
        let steps: Vec<String> = self
            .steps
            .iter()
            .map(|s| match s {
                Step::Check { message, .. } => format!("check({:?})", message),
                Step::Transform(_) => "transform".to_string(),
            })
            .collect();
        f.debug_struct("LeafSchema")
            .field("base", &base)
            .field("steps", &steps)
            .field("optional", &self.optional)
            .finish()
    }
}

impl LeafSchema {
    fn with_base(base: LeafBase) -> Self {
        Self {
            base,
            steps: Vec::new(),
            optional: false,
        }
    }

    /// A text input. Validates to a JSON string.
    pub fn text() -> Self {
        Self::with_base(LeafBase::Text)
    }

    /// A file input. Validates to a serialized `Blob`.
    pub fn file() -> Self {
        Self::with_base(LeafBase::File)
    }

    /// Accept the value if any branch accepts it; otherwise report `message`.
    pub fn any_of(branches: Vec<LeafSchema>, message: impl Into<String>) -> Self {
        Self::with_base(LeafBase::AnyOf {
            branches,
            message: message.into(),
        })
    }

    /// Shorthand for a two-branch `any_of`.
    pub fn or(self, other: LeafSchema, message: impl Into<String>) -> Self {
        Self::any_of(vec![self, other], message)
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn refine<F>(mut self, test: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.steps.push(Step::Check {
            test: Arc::new(test),
            message: message.into(),
        });
        self
    }

    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.steps.push(Step::Transform(Arc::new(f)));
        self
    }

    pub fn non_empty(self, message: impl Into<String>) -> Self {
        self.refine(|v| v.as_str().is_some_and(|s| !s.is_empty()), message)
    }

    pub fn min_len(self, n: usize, message: impl Into<String>) -> Self {
        self.refine(move |v| v.as_str().is_some_and(|s| s.chars().count() >= n), message)
    }

    pub fn max_len(self, n: usize, message: impl Into<String>) -> Self {
        self.refine(move |v| v.as_str().is_some_and(|s| s.chars().count() <= n), message)
    }

    pub fn matches(self, pattern: Regex, message: impl Into<String>) -> Self {
        self.refine(
            move |v| v.as_str().is_some_and(|s| pattern.is_match(s)),
            message,
        )
    }

    /// Absolute URL with a scheme, as accepted by the `url` crate.
    pub fn url(self) -> Self {
        self.refine(
            |v| v.as_str().is_some_and(|s| url::Url::parse(s).is_ok()),
            MSG_INVALID_URL,
        )
    }

    pub fn trim(self) -> Self {
        self.transform(|v| match v {
            Value::String(s) => Ok(Value::String(s.trim().to_string())),
            other => Ok(other),
        })
    }

    /// Parse text into a JSON number. Integral input stays an integer so
    /// it deserializes into integer fields.
    pub fn to_number(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.transform(move |v| {
            let s = v.as_str().ok_or_else(|| message.clone())?.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Value::Number(i.into()));
            }
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| message.clone())
        })
    }

    pub fn to_integer(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.transform(move |v| {
            v.as_str()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .map(|i| Value::Number(i.into()))
                .ok_or_else(|| message.clone())
        })
    }

    /// `"true"` becomes `true`; anything else becomes `false`.
    pub fn to_boolean(self) -> Self {
        self.transform(|v| Ok(Value::Bool(v.as_str() == Some("true"))))
    }

    fn validate_value(&self, value: &FormValue) -> Result<Value, Vec<String>> {
        let mut current = match &self.base {
            LeafBase::Text => match value {
                FormValue::Text(s) => Value::String(s.clone()),
                FormValue::Blob(_) => return Err(vec![MSG_EXPECTED_TEXT.to_string()]),
            },
            LeafBase::File => match value {
                FormValue::Blob(b) => {
                    serde_json::to_value(b).map_err(|e| vec![e.to_string()])?
                }
                FormValue::Text(_) => return Err(vec![MSG_EXPECTED_FILE.to_string()]),
            },
            LeafBase::AnyOf { branches, message } => branches
                .iter()
                .find_map(|b| b.validate_value(value).ok())
                .ok_or_else(|| vec![message.clone()])?,
        };

        let mut errors = Vec::new();
        for step in &self.steps {
            match step {
                Step::Check { test, message } => {
                    if !test(&current) {
                        errors.push(message.clone());
                    }
                }
                Step::Transform(f) => {
                    if !errors.is_empty() {
                        break;
                    }
                    match f(current) {
                        Ok(next) => current = next,
                        Err(message) => return Err(vec![message]),
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(current)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decode::decode;
    use crate::value::{Blob, Submission};

    fn decoded(pairs: &[(&str, &str)]) -> RawNode {
        let sub: Submission = pairs.iter().map(|(k, v)| (*k, *v)).collect();
        decode(&sub).unwrap()
    }

    fn person() -> Schema {
        ObjectSchema::new()
            .field("name", LeafSchema::text())
            .field("age", LeafSchema::text().to_number("Age must be a number"))
            .field("active", LeafSchema::text().to_boolean())
            .into()
    }

    #[test]
    fn test_valid_object_is_transformed() {
        let root = decoded(&[("name", "Alice"), ("age", "30"), ("active", "true")]);
        let value = person().validate(Some(&root)).unwrap();
        assert_eq!(value, json!({"name": "Alice", "age": 30, "active": true}));
    }

    #[test]
    fn test_failing_transform_reports_at_field() {
        let root = decoded(&[("name", "Bob"), ("age", "not-a-number"), ("active", "no")]);
        let tree = person().validate(Some(&root)).unwrap_err();
        assert!(tree.errors.is_empty());
        assert_eq!(tree.at("age").unwrap().errors, vec!["Age must be a number"]);
        assert!(tree.property("name").is_none());
    }

    #[test]
    fn test_missing_required_field() {
        let root = decoded(&[("name", "Bob"), ("active", "true")]);
        let tree = person().validate(Some(&root)).unwrap_err();
        assert_eq!(tree.at("age").unwrap().errors, vec![MSG_REQUIRED]);
    }

    #[test]
    fn test_optional_field_is_omitted() {
        let schema: Schema = ObjectSchema::new()
            .field("name", LeafSchema::text())
            .field("nickname", LeafSchema::text().optional())
            .into();
        let value = schema.validate(Some(&decoded(&[("name", "Ann")]))).unwrap();
        assert_eq!(value, json!({"name": "Ann"}));
    }

    #[test]
    fn test_unknown_keys_are_stripped() {
        let schema: Schema = ObjectSchema::new().field("name", LeafSchema::text()).into();
        let value = schema
            .validate(Some(&decoded(&[("name", "Ann"), ("admin", "true")])))
            .unwrap();
        assert_eq!(value, json!({"name": "Ann"}));
    }

    #[test]
    fn test_checks_accumulate_before_transform() {
        let schema: Schema = ObjectSchema::new()
            .field(
                "code",
                LeafSchema::text()
                    .min_len(3, "Too short")
                    .matches(Regex::new(r"^\d+$").unwrap(), "Digits only")
                    .to_integer("Not an integer"),
            )
            .into();
        let tree = schema.validate(Some(&decoded(&[("code", "a")]))).unwrap_err();
        assert_eq!(tree.at("code").unwrap().errors, vec!["Too short", "Digits only"]);

        let value = schema.validate(Some(&decoded(&[("code", "0042")]))).unwrap();
        assert_eq!(value, json!({"code": 42}));
    }

    #[test]
    fn test_refine_runs_after_transform() {
        let schema: Schema = ObjectSchema::new()
            .field(
                "stars",
                LeafSchema::text()
                    .to_number("Must be a number")
                    .refine(|v| v.as_f64().is_some_and(|n| n >= 0.0), "Must not be negative"),
            )
            .into();
        let tree = schema.validate(Some(&decoded(&[("stars", "-1")]))).unwrap_err();
        assert_eq!(tree.at("stars").unwrap().errors, vec!["Must not be negative"]);
    }

    #[test]
    fn test_to_number_keeps_fractions() {
        let schema: Schema = LeafSchema::text().to_number("NaN").into();
        let value = schema.validate(Some(&RawNode::Leaf("2.5".into()))).unwrap();
        assert_eq!(value, json!(2.5));
        let tree = schema.validate(Some(&RawNode::Leaf("NaN".into()))).unwrap_err();
        assert_eq!(tree.errors, vec!["NaN"]);
    }

    #[test]
    fn test_any_of_accepts_either_branch() {
        let schema: Schema = LeafSchema::text()
            .url()
            .or(
                LeafSchema::text().matches(Regex::new(r"^[\w\-.]+/[\w\-.]+$").unwrap(), "bad"),
                "Invalid repository",
            )
            .into();
        assert!(schema
            .validate(Some(&RawNode::Leaf("https://github.com/a/b".into())))
            .is_ok());
        assert!(schema.validate(Some(&RawNode::Leaf("a/b".into()))).is_ok());
        let tree = schema
            .validate(Some(&RawNode::Leaf("not a repo".into())))
            .unwrap_err();
        assert_eq!(tree.errors, vec!["Invalid repository"]);
    }

    #[test]
    fn test_wrong_container_kinds() {
        let schema: Schema = ObjectSchema::new()
            .field("name", LeafSchema::text())
            .field("tags", ArraySchema::of(LeafSchema::text()))
            .into();
        let root = decoded(&[("name.first", "A"), ("tags", "x")]);
        let tree = schema.validate(Some(&root)).unwrap_err();
        assert_eq!(tree.at("name").unwrap().errors, vec![MSG_EXPECTED_VALUE]);
        assert_eq!(tree.at("tags").unwrap().errors, vec![MSG_EXPECTED_LIST]);

        let tree = schema.validate(Some(&RawNode::Leaf("x".into()))).unwrap_err();
        assert_eq!(tree.errors, vec![MSG_EXPECTED_OBJECT]);
    }

    #[test]
    fn test_list_items_and_holes() {
        let schema: Schema = ObjectSchema::new()
            .field(
                "topics",
                ArraySchema::of(LeafSchema::text().non_empty("Empty topic"))
                    .max_items(2, "Too many topics"),
            )
            .into();
        let value = schema
            .validate(Some(&decoded(&[("topics.#0", "rust"), ("topics.#1", "cli")])))
            .unwrap();
        assert_eq!(value, json!({"topics": ["rust", "cli"]}));

        let tree = schema
            .validate(Some(&decoded(&[
                ("topics.#0", ""),
                ("topics.#3", "x"),
            ])))
            .unwrap_err();
        let topics = tree.at("topics").unwrap();
        assert_eq!(topics.errors, vec!["Too many topics"]);
        assert_eq!(topics.item(0).unwrap().errors, vec!["Empty topic"]);
        assert_eq!(topics.item(1).unwrap().errors, vec![MSG_REQUIRED]);
        assert_eq!(topics.item(2).unwrap().errors, vec![MSG_REQUIRED]);
        assert!(topics.item(3).is_none());
    }

    #[test]
    fn test_file_leaf() {
        let schema: Schema = ObjectSchema::new()
            .field(
                "avatar",
                LeafSchema::file().refine(
                    |v| v["content_type"].as_str().is_some_and(|t| t.starts_with("image/")),
                    "Must be an image",
                ),
            )
            .into();
        let mut sub = Submission::new();
        sub.append_blob("avatar", Blob::new("a.png", "image/png", vec![7]));
        let value = schema.validate(Some(&decode(&sub).unwrap())).unwrap();
        assert_eq!(value["avatar"]["filename"], json!("a.png"));
        assert_eq!(value["avatar"]["data"], json!([7]));

        let tree = schema
            .validate(Some(&decoded(&[("avatar", "a.png")])))
            .unwrap_err();
        assert_eq!(tree.at("avatar").unwrap().errors, vec![MSG_EXPECTED_FILE]);
    }

    #[test]
    fn test_introspection() {
        let schema = person();
        assert_eq!(schema.kind(), SchemaKind::Object);
        let fields: Vec<&String> = schema.fields().unwrap().keys().collect();
        assert_eq!(fields, vec!["name", "age", "active"]);
        let list: Schema = ArraySchema::of(LeafSchema::text()).into();
        assert_eq!(list.element().map(Schema::kind), Some(SchemaKind::Leaf));
    }
}
