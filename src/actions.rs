//! Form ports: the single place where untrusted submissions enter the domain.
//!
//! Each action parses a `Submission` against its schema, sanitizes what it
//! keeps, calls the domain operation and returns a state the adapter can
//! redisplay. Internal failures are logged and replaced by a generic message.

use std::sync::Arc;

use anyhow::Context;
use repomark_form::{
    DecodeLimits, EchoNode, FormError, LeafSchema, ObjectSchema, ParsedForm, Schema, Submission,
    parse_form_with_limits,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DbHandle;
use crate::html::escape_html;
use crate::metadata::MetadataSource;
use crate::operations::{self, AddBookmark};
use crate::repository::{REPOSITORY_ID_REGEX, RepositoryId};

pub const MSG_BOOKMARK_ADDED: &str = "Bookmark added";
pub const MSG_ADD_FAILED: &str = "An error occurred while adding new bookmark.";
pub const MSG_INVALID_REPOSITORY: &str = "Enter a repository URL or owner/name";

/// Everything an action needs from the running application.
#[derive(Clone)]
pub struct AppContext {
    pub db: DbHandle,
    pub metadata: Arc<dyn MetadataSource>,
    pub user_id: Uuid,
    pub form_limits: DecodeLimits,
}

/// What the adapter renders after an action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionState {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub input: EchoNode,
}

impl ActionState {
    fn failed(input: EchoNode) -> Self {
        Self {
            success: false,
            message: None,
            input,
        }
    }
}

/// `repository` is a URL or `owner/name`; `note` is free text.
pub fn add_bookmark_schema() -> Schema {
    let repository = LeafSchema::text().url().or(
        LeafSchema::text().matches(REPOSITORY_ID_REGEX.clone(), MSG_INVALID_REPOSITORY),
        MSG_INVALID_REPOSITORY,
    );
    ObjectSchema::new()
        .field("repository", repository)
        .field("note", LeafSchema::text())
        .into()
}

/// Parse only, without touching the store. Backs `repomark check`.
pub fn check_add_bookmark(
    submission: &Submission,
    limits: DecodeLimits,
) -> Result<ParsedForm<AddBookmark>, FormError> {
    parse_form_with_limits(submission, &add_bookmark_schema(), limits)
}

/// Structural key faults abort with `FormError`; everything else comes back
/// as an `ActionState`.
pub async fn add_bookmark_action(
    ctx: &AppContext,
    submission: &Submission,
) -> Result<ActionState, FormError> {
    let parsed = check_add_bookmark(submission, ctx.form_limits)?;
    let (data, mut input) = parsed.into_parts();
    let Some(data) = data else {
        tracing::debug!("Add bookmark form rejected");
        return Ok(ActionState::failed(input));
    };

    // Stored notes are escaped regardless of how they are displayed later.
    let data = AddBookmark {
        note: escape_html(&data.note),
        ..data
    };

    match operations::add_bookmark(&ctx.db, ctx.metadata.as_ref(), ctx.user_id, data).await {
        Ok(_) => Ok(ActionState {
            success: true,
            message: Some(MSG_BOOKMARK_ADDED.to_string()),
            input,
        }),
        Err(e) => {
            let message = match e.user_message() {
                Some(message) => message,
                None => {
                    tracing::error!(error = ?e, "Failed to add bookmark");
                    MSG_ADD_FAILED.to_string()
                }
            };
            input.push_error(message);
            Ok(ActionState::failed(input))
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteBookmarkParams {
    owner: String,
    name: String,
}

fn delete_bookmark_schema() -> Schema {
    ObjectSchema::new()
        .field("owner", LeafSchema::text())
        .field("name", LeafSchema::text())
        .into()
}

/// Strict: any invalid input is an error, not a redisplayable state.
pub async fn delete_bookmark_action(
    ctx: &AppContext,
    submission: &Submission,
) -> anyhow::Result<bool> {
    let parsed: ParsedForm<DeleteBookmarkParams> =
        parse_form_with_limits(submission, &delete_bookmark_schema(), ctx.form_limits)
            .context("Malformed delete bookmark submission")?;
    let params = match parsed.into_parts() {
        (Some(params), _) => params,
        (None, echo) => anyhow::bail!(
            "Invalid delete bookmark submission: {}",
            serde_json::to_string(&echo).unwrap_or_default()
        ),
    };
    let id = RepositoryId::new(params.owner, params.name);
    Ok(operations::delete_bookmark(&ctx.db, ctx.user_id, &id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::tests::{FakeSource, setup};
    use serde_json::json;

    fn context() -> AppContext {
        let (db, user_id) = setup().unwrap();
        AppContext {
            db,
            metadata: Arc::new(FakeSource::default()),
            user_id,
            form_limits: DecodeLimits::default(),
        }
    }

    fn submission(pairs: &[(&str, &str)]) -> Submission {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_schema_accepts_url_or_identifier() {
        for repository in ["https://github.com/acme/widget", "acme/widget"] {
            let sub = submission(&[("repository", repository), ("note", "")]);
            let parsed = check_add_bookmark(&sub, DecodeLimits::default()).unwrap();
            assert!(parsed.success(), "{} should be accepted", repository);
        }
    }

    #[test]
    fn test_schema_rejects_other_text() {
        let sub = submission(&[("repository", "just some words"), ("note", "x")]);
        let parsed = check_add_bookmark(&sub, DecodeLimits::default()).unwrap();
        assert!(!parsed.success());
        assert_eq!(
            parsed.echo().at("repository").unwrap().errors(),
            [MSG_INVALID_REPOSITORY]
        );
        assert!(parsed.echo().at("note").unwrap().errors().is_empty());
    }

    #[tokio::test]
    async fn test_add_action_success_escapes_note() {
        let ctx = context();
        let sub = submission(&[("repository", "acme/widget"), ("note", "<b>neat</b>")]);
        let state = add_bookmark_action(&ctx, &sub).await.unwrap();
        assert!(state.success);
        assert_eq!(state.message.as_deref(), Some(MSG_BOOKMARK_ADDED));

        let user_id = ctx.user_id;
        let list = ctx.db.call(move |db| db.list_bookmarks(user_id)).await.unwrap();
        assert_eq!(list[0].note.as_deref(), Some("&lt;b&gt;neat&lt;/b&gt;"));
        // The echo keeps what the user typed.
        assert_eq!(
            state.input.at("note").unwrap().value().and_then(|v| v.as_text()),
            Some("<b>neat</b>")
        );
    }

    #[tokio::test]
    async fn test_add_action_duplicate_lands_on_form_errors() {
        let ctx = context();
        let sub = submission(&[("repository", "acme/widget"), ("note", "")]);
        add_bookmark_action(&ctx, &sub).await.unwrap();
        let state = add_bookmark_action(&ctx, &sub).await.unwrap();
        assert!(!state.success);
        assert_eq!(state.input.errors(), ["Bookmark already exists"]);
    }

    #[tokio::test]
    async fn test_add_action_hides_internal_errors() {
        let ctx = context();
        let sub = submission(&[("repository", "broken/widget"), ("note", "")]);
        let state = add_bookmark_action(&ctx, &sub).await.unwrap();
        assert!(!state.success);
        assert_eq!(state.input.errors(), [MSG_ADD_FAILED]);
    }

    #[tokio::test]
    async fn test_add_action_validation_failure_serializes() {
        let ctx = context();
        let sub = submission(&[("repository", "nope"), ("note", "hi")]);
        let state = add_bookmark_action(&ctx, &sub).await.unwrap();
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "success": false,
                "input": {
                    "errors": [],
                    "properties": {
                        "repository": {"errors": [MSG_INVALID_REPOSITORY], "value": "nope"},
                        "note": {"errors": [], "value": "hi"}
                    }
                }
            })
        );
    }

    #[tokio::test]
    async fn test_add_action_structural_fault_is_an_error() {
        let ctx = context();
        let sub = submission(&[("repository", "acme/widget"), ("repository.#0", "x")]);
        assert!(matches!(
            add_bookmark_action(&ctx, &sub).await,
            Err(FormError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_action() {
        let ctx = context();
        let add = submission(&[("repository", "acme/widget"), ("note", "")]);
        add_bookmark_action(&ctx, &add).await.unwrap();

        let del = submission(&[("owner", "acme"), ("name", "widget")]);
        assert!(delete_bookmark_action(&ctx, &del).await.unwrap());
        assert!(!delete_bookmark_action(&ctx, &del).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_action_is_strict() {
        let ctx = context();
        let del = submission(&[("owner", "acme")]);
        let err = delete_bookmark_action(&ctx, &del).await.unwrap_err();
        assert!(err.to_string().contains("Invalid delete bookmark submission"));
    }
}
