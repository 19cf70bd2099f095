use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// An uploaded file as it arrives in a multipart submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A leaf value exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Blob(Blob),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Blob(_) => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Self::Text(_) => None,
            Self::Blob(b) => Some(b),
        }
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Blob> for FormValue {
    fn from(b: Blob) -> Self {
        Self::Blob(b)
    }
}

/// Text echoes as a plain string. Blobs echo as their metadata only; file
/// contents are never sent back to the submitter.
impl Serialize for FormValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Blob(b) => {
                let mut st = serializer.serialize_struct("Blob", 3)?;
                st.serialize_field("filename", &b.filename)?;
                st.serialize_field("content_type", &b.content_type)?;
                st.serialize_field("size", &b.size())?;
                st.end()
            }
        }
    }
}

/// Raw form submission: ordered `(key, value)` pairs.
///
/// Duplicate keys are kept in order; the decoder applies them in sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    entries: Vec<(String, FormValue)>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries
            .push((key.into(), FormValue::Text(value.into())));
        self
    }

    pub fn append_blob(&mut self, key: impl Into<String>, blob: Blob) -> &mut Self {
        self.entries.push((key.into(), FormValue::Blob(blob)));
        self
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(body: &str) -> Self {
        url::form_urlencoded::parse(body.as_bytes())
            .map(|(k, v)| (k.into_owned(), FormValue::Text(v.into_owned())))
            .collect()
    }

    pub fn entries(&self) -> &[(String, FormValue)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Submission
where
    K: Into<String>,
    V: Into<FormValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Nested tree built from a submission's key paths.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    Leaf(FormValue),
    Object(IndexMap<String, RawNode>),
    /// Indices that were never assigned stay `None`.
    Array(Vec<Option<RawNode>>),
}

impl RawNode {
    pub fn empty_object() -> Self {
        Self::Object(IndexMap::new())
    }

    /// Short name used in structural error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "value",
            Self::Object(_) => "object",
            Self::Array(_) => "list",
        }
    }

    pub fn as_leaf(&self) -> Option<&FormValue> {
        match self {
            Self::Leaf(v) => Some(v),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawNode> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn index(&self, i: usize) -> Option<&RawNode> {
        match self {
            Self::Array(items) => items.get(i).and_then(Option::as_ref),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_urlencoded_decodes_pairs_in_order() {
        let sub = Submission::from_urlencoded("repository=facebook%2Freact&note=hello+world&note=again");
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.entries()[0].0, "repository");
        assert_eq!(sub.entries()[0].1, FormValue::from("facebook/react"));
        assert_eq!(sub.entries()[1].1, FormValue::from("hello world"));
        assert_eq!(sub.entries()[2].1, FormValue::from("again"));
    }

    #[test]
    fn test_blob_echoes_metadata_only() {
        let value = FormValue::Blob(Blob::new("a.txt", "text/plain", b"secret".to_vec()));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"filename": "a.txt", "content_type": "text/plain", "size": 6})
        );
    }

    #[test]
    fn test_text_echoes_as_string() {
        let json = serde_json::to_value(FormValue::from("x")).unwrap();
        assert_eq!(json, serde_json::json!("x"));
    }

    #[test]
    fn test_raw_node_accessors() {
        let mut map = IndexMap::new();
        map.insert(
            "tags".to_string(),
            RawNode::Array(vec![None, Some(RawNode::Leaf("b".into()))]),
        );
        let node = RawNode::Object(map);
        let tags = node.get("tags").unwrap();
        assert_eq!(tags.kind(), "list");
        assert!(tags.index(0).is_none());
        assert_eq!(tags.index(1).and_then(RawNode::as_leaf), Some(&FormValue::from("b")));
    }
}
