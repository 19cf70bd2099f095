//! Structural faults of the form bridge.
//!
//! These are distinct from validation failures: a `DecodeError` means the
//! submission's keys cannot be laid out as a tree at all (or exceed the
//! configured limits), and aborts the whole parse. Validation failures are
//! never errors here; they live in `ErrorTree` and the echo.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Key '{key}': expected list at '{at}' but found {found}")]
    ExpectedArray {
        key: String,
        at: String,
        found: &'static str,
    },

    #[error("Key '{key}': expected object at '{at}' but found {found}")]
    ExpectedObject {
        key: String,
        at: String,
        found: &'static str,
    },

    #[error("Key '{key}' has {depth} segments, limit is {max}")]
    PathTooDeep { key: String, depth: usize, max: usize },

    #[error("Key '{key}' addresses index {index}, limit is {max}")]
    IndexOutOfRange {
        key: String,
        index: String,
        max: usize,
    },

    #[error("Submission has {count} entries, limit is {max}")]
    TooManyEntries { count: usize, max: usize },

    #[error("Key '{key}' would grow lists past {max} slots in total")]
    TooLarge { key: String, max: usize },
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Malformed form submission: {0}")]
    Decode(#[from] DecodeError),

    /// Validated data did not fit the requested output type. This is a
    /// mismatch between the schema and the Rust type, never a user error.
    #[error("Validated form data does not match the output type: {0}")]
    Output(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_array_message_names_key_and_position() {
        let err = DecodeError::ExpectedArray {
            key: "tags.#0".into(),
            at: "tags".into(),
            found: "object",
        };
        let msg = err.to_string();
        assert!(msg.contains("tags.#0"));
        assert!(msg.contains("found object"));
    }

    #[test]
    fn test_form_error_converts_from_decode_error() {
        let inner = DecodeError::TooManyEntries { count: 5, max: 1 };
        let err: FormError = inner.clone().into();
        match err {
            FormError::Decode(e) => assert_eq!(e, inner),
            _ => panic!("Expected FormError::Decode"),
        }
    }
}
