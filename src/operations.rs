//! Domain operations over the store and a metadata source.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::DbHandle;
use crate::errors::BookmarkError;
use crate::metadata::MetadataSource;
use crate::models::{NewBookmark, Repository};
use crate::repository::RepositoryId;

/// Validated input for adding a bookmark.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddBookmark {
    /// `owner/name` or a repository URL.
    pub repository: String,
    pub note: String,
}

/// Fetch fresh metadata and store it.
pub async fn update_repository_information(
    db: &DbHandle,
    source: &dyn MetadataSource,
    id: &RepositoryId,
) -> Result<Repository, BookmarkError> {
    let payload = source.fetch(id).await.map_err(BookmarkError::Metadata)?;
    let repository = payload.into_repository(id, Utc::now());

    let row = repository.clone();
    db.call(move |db| db.upsert_repository(&row))
        .await
        .map_err(BookmarkError::Database)?;

    tracing::info!(repository = %id, stars = repository.stars_count, "Repository information updated");
    Ok(repository)
}

pub async fn add_bookmark(
    db: &DbHandle,
    source: &dyn MetadataSource,
    user_id: Uuid,
    input: AddBookmark,
) -> Result<RepositoryId, BookmarkError> {
    let id = RepositoryId::parse(&input.repository)
        .ok_or_else(|| BookmarkError::InvalidRepository(input.repository.clone()))?;

    update_repository_information(db, source, &id).await?;

    let bookmark = NewBookmark {
        user_id,
        owner: id.owner.clone(),
        name: id.name.clone(),
        note: Some(input.note),
    };
    let created = db
        .call(move |db| db.create_bookmark(&bookmark))
        .await
        .map_err(BookmarkError::Database)?;
    if !created {
        tracing::debug!(repository = %id, %user_id, "Bookmark already exists");
        return Err(BookmarkError::AlreadyExists);
    }

    tracing::info!(repository = %id, %user_id, "Bookmark added");
    Ok(id)
}

/// Remove the user's bookmark, then the repository once nobody bookmarks it.
///
/// Returns whether a bookmark was removed.
pub async fn delete_bookmark(
    db: &DbHandle,
    user_id: Uuid,
    id: &RepositoryId,
) -> Result<bool, BookmarkError> {
    let target = id.clone();
    let (deleted, repository_removed) = db
        .call(move |db| {
            let deleted = db.delete_bookmark(user_id, &target)?;
            let repository_removed =
                !db.repository_in_use(&target)? && db.delete_repository(&target)?;
            Ok((deleted, repository_removed))
        })
        .await
        .map_err(BookmarkError::Database)?;

    tracing::info!(repository = %id, %user_id, deleted, repository_removed, "Bookmark deleted");
    Ok(deleted)
}
