//! Bookmark commands: `repomark list`, `add`, `remove`, `check`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use repomark::actions::{AppContext, add_bookmark_action, check_add_bookmark, delete_bookmark_action};
use repomark::config::AppConfig;
use repomark::db::DbHandle;
use repomark::health::classify;
use repomark::metadata::{FileMetadataSource, MetadataSource};
use repomark::repository::RepositoryId;
use repomark_form::Submission;

use super::{open_db, submission_from_args};

fn context(config: &AppConfig, metadata: Arc<dyn MetadataSource>) -> Result<AppContext> {
    Ok(AppContext {
        db: DbHandle::new(open_db(config)?),
        metadata,
        user_id: config.user_id,
        form_limits: config.form_limits,
    })
}

pub async fn cmd_list(config: &AppConfig, json: bool) -> Result<()> {
    let db = DbHandle::new(open_db(config)?);
    let user_id = config.user_id;
    let bookmarks = db.call(move |db| db.list_bookmarks(user_id)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bookmarks)?);
        return Ok(());
    }
    if bookmarks.is_empty() {
        println!("No bookmarks yet.");
        return Ok(());
    }

    let now = Utc::now();
    for b in &bookmarks {
        println!(
            "{:<32} {:>8}★  {:<12} {:<8} {}",
            b.id(),
            b.stars_count,
            b.language.as_deref().unwrap_or("-"),
            classify(b.last_commit_at, now),
            b.note.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub async fn cmd_add(config: &AppConfig, metadata: &Path, fields: &[String]) -> Result<()> {
    let submission = submission_from_args(fields)?;
    let source = FileMetadataSource::load(metadata)?;
    let ctx = context(config, Arc::new(source))?;

    let state = add_bookmark_action(&ctx, &submission)
        .await
        .context("Malformed form submission")?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    if !state.success {
        anyhow::bail!("Bookmark was not added");
    }
    Ok(())
}

pub async fn cmd_remove(config: &AppConfig, repository: &str) -> Result<()> {
    let id = RepositoryId::parse(repository)
        .with_context(|| format!("Invalid repository identifier: {}", repository))?;
    let mut submission = Submission::new();
    submission.append("owner", id.owner.as_str()).append("name", id.name.as_str());

    // Removal never needs fresh metadata.
    let ctx = context(config, Arc::new(FileMetadataSource::default()))?;
    if delete_bookmark_action(&ctx, &submission).await? {
        println!("Removed {}", id);
    } else {
        println!("No bookmark for {}", id);
    }
    Ok(())
}

/// Prints the parse result as `{ success, echo }`. Validation failures are
/// not an error exit; malformed keys are.
pub fn cmd_check(config: &AppConfig, fields: &[String]) -> Result<()> {
    let submission = submission_from_args(fields)?;
    let parsed = check_add_bookmark(&submission, config.form_limits)
        .context("Malformed form submission")?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
