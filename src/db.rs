use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::models::*;
use crate::repository::RepositoryId;

/// Async-safe handle to the bookmark database.
///
/// Wraps `BookmarkDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, so synchronous SQLite I/O never
/// ties up async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<BookmarkDb>>,
}

impl DbHandle {
    pub fn new(db: BookmarkDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&BookmarkDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }
}

pub struct BookmarkDb {
    conn: Connection,
}

impl BookmarkDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        // Topics and health flags are JSON arrays; timestamps are RFC 3339.
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS \"user\" (
                    id TEXT PRIMARY KEY NOT NULL,
                    github_token TEXT
                );

                CREATE TABLE IF NOT EXISTS repository (
                    owner TEXT NOT NULL,
                    name TEXT NOT NULL,
                    full_name TEXT NOT NULL,
                    html_url TEXT NOT NULL,
                    homepage_url TEXT,
                    description TEXT,
                    language TEXT,
                    stars_count INTEGER NOT NULL,
                    open_issues_count INTEGER NOT NULL,
                    archived INTEGER NOT NULL,
                    topics TEXT NOT NULL DEFAULT '[]',
                    latest_release TEXT,
                    last_commit_at TEXT,
                    health_flags TEXT NOT NULL DEFAULT '[]',
                    github_created_at TEXT NOT NULL,
                    github_updated_at TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (owner, name)
                );

                CREATE TABLE IF NOT EXISTS bookmark (
                    user_id TEXT NOT NULL REFERENCES \"user\"(id) ON DELETE CASCADE,
                    owner TEXT NOT NULL,
                    name TEXT NOT NULL,
                    note TEXT,
                    PRIMARY KEY (user_id, owner, name),
                    FOREIGN KEY (owner, name) REFERENCES repository(owner, name)
                );

                CREATE INDEX IF NOT EXISTS idx_bookmark_user ON bookmark(user_id);
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────────────

    /// Insert the user if missing. An existing token is only replaced by a
    /// new non-null one.
    pub fn ensure_user(&self, user: &User) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO \"user\" (id, github_token) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET
                    github_token = COALESCE(excluded.github_token, github_token)",
                params![user.id.to_string(), user.github_token],
            )
            .context("Failed to upsert user")?;
        Ok(())
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, github_token FROM \"user\" WHERE id = ?1",
                params![id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()
            .context("Failed to query user")?;
        match row {
            Some((id, github_token)) => Ok(Some(User {
                id: Uuid::parse_str(&id).context("Failed to parse user id")?,
                github_token,
            })),
            None => Ok(None),
        }
    }

    // ── Repositories ──────────────────────────────────────────────────

    /// Insert or refresh a repository. On conflict every column except
    /// `created_at` is overwritten.
    pub fn upsert_repository(&self, repo: &Repository) -> Result<()> {
        let topics = serde_json::to_string(&repo.topics).context("Failed to encode topics")?;
        let flags =
            serde_json::to_string(&repo.health_flags).context("Failed to encode health flags")?;
        self.conn
            .execute(
                "INSERT INTO repository (
                    owner, name, full_name, html_url, homepage_url, description, language,
                    stars_count, open_issues_count, archived, topics, latest_release,
                    last_commit_at, health_flags, github_created_at, github_updated_at,
                    created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
                 ON CONFLICT(owner, name) DO UPDATE SET
                    full_name = excluded.full_name,
                    html_url = excluded.html_url,
                    homepage_url = excluded.homepage_url,
                    description = excluded.description,
                    language = excluded.language,
                    stars_count = excluded.stars_count,
                    open_issues_count = excluded.open_issues_count,
                    archived = excluded.archived,
                    topics = excluded.topics,
                    latest_release = excluded.latest_release,
                    last_commit_at = excluded.last_commit_at,
                    health_flags = excluded.health_flags,
                    github_created_at = excluded.github_created_at,
                    github_updated_at = excluded.github_updated_at,
                    updated_at = excluded.updated_at",
                params![
                    repo.owner,
                    repo.name,
                    repo.full_name,
                    repo.html_url,
                    repo.homepage_url,
                    repo.description,
                    repo.language,
                    repo.stars_count,
                    repo.open_issues_count,
                    repo.archived,
                    topics,
                    repo.latest_release,
                    repo.last_commit_at.map(|t| t.to_rfc3339()),
                    flags,
                    repo.github_created_at.to_rfc3339(),
                    repo.github_updated_at.to_rfc3339(),
                    repo.created_at.to_rfc3339(),
                    repo.updated_at.to_rfc3339(),
                ],
            )
            .context("Failed to upsert repository")?;
        Ok(())
    }

    pub fn get_repository(&self, id: &RepositoryId) -> Result<Option<Repository>> {
        let row = self
            .conn
            .query_row(
                "SELECT owner, name, full_name, html_url, homepage_url, description, language,
                        stars_count, open_issues_count, archived, topics, latest_release,
                        last_commit_at, health_flags, github_created_at, github_updated_at,
                        created_at, updated_at
                 FROM repository WHERE owner = ?1 AND name = ?2",
                params![id.owner, id.name],
                |row| {
                    Ok(RepositoryRow {
                        owner: row.get(0)?,
                        name: row.get(1)?,
                        full_name: row.get(2)?,
                        html_url: row.get(3)?,
                        homepage_url: row.get(4)?,
                        description: row.get(5)?,
                        language: row.get(6)?,
                        stars_count: row.get(7)?,
                        open_issues_count: row.get(8)?,
                        archived: row.get(9)?,
                        topics: row.get(10)?,
                        latest_release: row.get(11)?,
                        last_commit_at: row.get(12)?,
                        health_flags: row.get(13)?,
                        github_created_at: row.get(14)?,
                        github_updated_at: row.get(15)?,
                        created_at: row.get(16)?,
                        updated_at: row.get(17)?,
                    })
                },
            )
            .optional()
            .context("Failed to query repository")?;
        row.map(RepositoryRow::into_repository).transpose()
    }

    pub fn delete_repository(&self, id: &RepositoryId) -> Result<bool> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM repository WHERE owner = ?1 AND name = ?2",
                params![id.owner, id.name],
            )
            .context("Failed to delete repository")?;
        Ok(affected > 0)
    }

    /// True while any user still bookmarks the repository.
    pub fn repository_in_use(&self, id: &RepositoryId) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM bookmark WHERE owner = ?1 AND name = ?2)",
                params![id.owner, id.name],
                |row| row.get(0),
            )
            .context("Failed to check repository usage")
    }

    // ── Bookmarks ─────────────────────────────────────────────────────

    /// Returns `false` when the user already bookmarked this repository.
    pub fn create_bookmark(&self, bookmark: &NewBookmark) -> Result<bool> {
        let inserted = self
            .conn
            .execute(
                "INSERT INTO bookmark (user_id, owner, name, note) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, owner, name) DO NOTHING",
                params![
                    bookmark.user_id.to_string(),
                    bookmark.owner,
                    bookmark.name,
                    bookmark.note
                ],
            )
            .context("Failed to insert bookmark")?;
        Ok(inserted > 0)
    }

    pub fn delete_bookmark(&self, user_id: Uuid, id: &RepositoryId) -> Result<bool> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM bookmark WHERE user_id = ?1 AND owner = ?2 AND name = ?3",
                params![user_id.to_string(), id.owner, id.name],
            )
            .context("Failed to delete bookmark")?;
        Ok(affected > 0)
    }

    pub fn list_bookmarks(&self, user_id: Uuid) -> Result<Vec<BookmarkView>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT r.owner, r.name, b.note, r.full_name, r.html_url, r.homepage_url,
                        r.description, r.language, r.stars_count, r.open_issues_count,
                        r.archived, r.topics, r.last_commit_at, r.health_flags,
                        r.created_at, r.github_updated_at
                 FROM bookmark b
                 INNER JOIN repository r ON r.owner = b.owner AND r.name = b.name
                 WHERE b.user_id = ?1
                 ORDER BY r.owner, r.name",
            )
            .context("Failed to prepare list_bookmarks")?;
        let rows = stmt
            .query_map(params![user_id.to_string()], |row| {
                Ok(BookmarkRow {
                    owner: row.get(0)?,
                    name: row.get(1)?,
                    note: row.get(2)?,
                    full_name: row.get(3)?,
                    html_url: row.get(4)?,
                    homepage_url: row.get(5)?,
                    description: row.get(6)?,
                    language: row.get(7)?,
                    stars_count: row.get(8)?,
                    open_issues_count: row.get(9)?,
                    archived: row.get(10)?,
                    topics: row.get(11)?,
                    last_commit_at: row.get(12)?,
                    health_flags: row.get(13)?,
                    created_at: row.get(14)?,
                    github_updated_at: row.get(15)?,
                })
            })
            .context("Failed to query bookmarks")?;
        let mut bookmarks = Vec::new();
        for row in rows {
            let r = row.context("Failed to read bookmark row")?;
            bookmarks.push(r.into_view()?);
        }
        Ok(bookmarks)
    }
}

// ── Row helpers ───────────────────────────────────────────────────────

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("Failed to parse {} timestamp {:?}", column, raw))
}

fn parse_optional_timestamp(raw: Option<String>, column: &str) -> Result<Option<DateTime<Utc>>> {
    raw.map(|r| parse_timestamp(&r, column)).transpose()
}

fn parse_topics(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).context("Failed to parse topics JSON")
}

fn parse_health_flags(raw: &str) -> Result<Vec<HealthFlag>> {
    let names: Vec<String> =
        serde_json::from_str(raw).context("Failed to parse health flags JSON")?;
    names
        .iter()
        .map(|n| HealthFlag::from_str(n).map_err(|e| anyhow::anyhow!(e)))
        .collect::<Result<_>>()
        .context("Failed to parse health flag")
}

/// Intermediate row struct for repository.
struct RepositoryRow {
    owner: String,
    name: String,
    full_name: String,
    html_url: String,
    homepage_url: Option<String>,
    description: Option<String>,
    language: Option<String>,
    stars_count: i64,
    open_issues_count: i64,
    archived: bool,
    topics: String,
    latest_release: Option<String>,
    last_commit_at: Option<String>,
    health_flags: String,
    github_created_at: String,
    github_updated_at: String,
    created_at: String,
    updated_at: String,
}

impl RepositoryRow {
    fn into_repository(self) -> Result<Repository> {
        Ok(Repository {
            topics: parse_topics(&self.topics)?,
            health_flags: parse_health_flags(&self.health_flags)?,
            last_commit_at: parse_optional_timestamp(self.last_commit_at, "last_commit_at")?,
            github_created_at: parse_timestamp(&self.github_created_at, "github_created_at")?,
            github_updated_at: parse_timestamp(&self.github_updated_at, "github_updated_at")?,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
            owner: self.owner,
            name: self.name,
            full_name: self.full_name,
            html_url: self.html_url,
            homepage_url: self.homepage_url,
            description: self.description,
            language: self.language,
            stars_count: self.stars_count,
            open_issues_count: self.open_issues_count,
            archived: self.archived,
            latest_release: self.latest_release,
        })
    }
}

/// Intermediate row struct for the bookmark/repository join.
struct BookmarkRow {
    owner: String,
    name: String,
    note: Option<String>,
    full_name: String,
    html_url: String,
    homepage_url: Option<String>,
    description: Option<String>,
    language: Option<String>,
    stars_count: i64,
    open_issues_count: i64,
    archived: bool,
    topics: String,
    last_commit_at: Option<String>,
    health_flags: String,
    created_at: String,
    github_updated_at: String,
}

impl BookmarkRow {
    fn into_view(self) -> Result<BookmarkView> {
        Ok(BookmarkView {
            topics: parse_topics(&self.topics)?,
            health_flags: parse_health_flags(&self.health_flags)?,
            last_commit_at: parse_optional_timestamp(self.last_commit_at, "last_commit_at")?,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            github_updated_at: parse_timestamp(&self.github_updated_at, "github_updated_at")?,
            owner: self.owner,
            name: self.name,
            note: self.note,
            full_name: self.full_name,
            html_url: self.html_url,
            homepage_url: self.homepage_url,
            description: self.description,
            language: self.language,
            stars_count: self.stars_count,
            open_issues_count: self.open_issues_count,
            archived: self.archived,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
