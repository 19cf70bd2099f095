use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::decode::{DecodeLimits, decode_with_limits};
use crate::echo::{EchoNode, merge};
use crate::error::FormError;
use crate::schema::Schema;
use crate::shape::shape;
use crate::value::Submission;

/// Outcome of parsing one submission.
///
/// `data` is present exactly when validation succeeded and always comes from
/// the validated, transformed value, never from the echo.
#[derive(Debug, Clone)]
#[must_use]
pub struct ParsedForm<T> {
    data: Option<T>,
    echo: EchoNode,
}

impl<T> ParsedForm<T> {
    pub fn success(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn echo(&self) -> &EchoNode {
        &self.echo
    }

    pub fn into_echo(self) -> EchoNode {
        self.echo
    }

    pub fn into_parts(self) -> (Option<T>, EchoNode) {
        (self.data, self.echo)
    }
}

/// Serializes as `{ success, echo }`. Validated data stays server-side.
impl<T> Serialize for ParsedForm<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("ParsedForm", 2)?;
        st.serialize_field("success", &self.success())?;
        st.serialize_field("echo", &self.echo)?;
        st.end()
    }
}

/// Decode, validate and echo a submission with default limits.
pub fn parse_form<T: DeserializeOwned>(
    submission: &Submission,
    schema: &Schema,
) -> Result<ParsedForm<T>, FormError> {
    parse_form_with_limits(submission, schema, DecodeLimits::default())
}

/// Decode → shape → validate the *decoded* tree → merge errors → deserialize.
///
/// Structural problems with the keys abort with `FormError::Decode`.
/// Validation failures never abort: they come back as `success() == false`
/// with the messages attached to the echo.
pub fn parse_form_with_limits<T: DeserializeOwned>(
    submission: &Submission,
    schema: &Schema,
    limits: DecodeLimits,
) -> Result<ParsedForm<T>, FormError> {
    let decoded = decode_with_limits(submission, limits)?;
    let shaped = shape(schema, Some(&decoded));

    let (data, errors) = match schema.validate(Some(&decoded)) {
        Ok(value) => {
            let data = serde_json::from_value::<T>(value).map_err(FormError::Output)?;
            (Some(data), None)
        }
        Err(tree) => {
            tracing::debug!(errors = ?tree, "form submission failed validation");
            (None, Some(tree))
        }
    };

    let echo = merge(shaped, errors.as_ref());
    Ok(ParsedForm { data, echo })
}
