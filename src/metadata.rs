//! Repository metadata sources.
//!
//! The domain only needs "give me the provider's view of `owner/name`". The
//! payload mirrors the subset of GitHub's `GET /repos/{owner}/{repo}`
//! response that we store.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::Repository;
use crate::repository::RepositoryId;

/// A GitHub repository (subset of fields we care about).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubRepoPayload {
    pub full_name: String,
    pub html_url: String,
    pub homepage: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: i64,
    pub open_issues_count: i64,
    #[serde(default)]
    pub archived: bool,
    pub pushed_at: Option<DateTime<Utc>>,
    /// Absent on some API versions.
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GitHubRepoPayload {
    /// Map the payload onto our row. Health flags start empty and both local
    /// timestamps are `now`; the store keeps the original `created_at` on
    /// conflict.
    pub fn into_repository(self, id: &RepositoryId, now: DateTime<Utc>) -> Repository {
        Repository {
            owner: id.owner.clone(),
            name: id.name.clone(),
            full_name: self.full_name,
            html_url: self.html_url,
            homepage_url: self.homepage,
            description: self.description,
            language: self.language,
            stars_count: self.stargazers_count,
            open_issues_count: self.open_issues_count,
            archived: self.archived,
            topics: self.topics.unwrap_or_default(),
            latest_release: None,
            last_commit_at: self.pushed_at,
            health_flags: Vec::new(),
            github_created_at: self.created_at,
            github_updated_at: self.updated_at,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, id: &RepositoryId) -> Result<GitHubRepoPayload>;
}

/// Offline source backed by a JSON file.
///
/// The file holds either a single payload or an object of payloads keyed by
/// `owner/name`. Lookups are exact first, then case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct FileMetadataSource {
    payloads: IndexMap<String, GitHubRepoPayload>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PayloadFile {
    Single(Box<GitHubRepoPayload>),
    Keyed(IndexMap<String, GitHubRepoPayload>),
}

impl FileMetadataSource {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read metadata file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse metadata file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let payloads = match serde_json::from_str::<PayloadFile>(content)? {
            PayloadFile::Single(payload) => {
                let mut map = IndexMap::new();
                map.insert(payload.full_name.clone(), *payload);
                map
            }
            PayloadFile::Keyed(map) => map,
        };
        Ok(Self { payloads })
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    fn lookup(&self, key: &str) -> Option<&GitHubRepoPayload> {
        self.payloads.get(key).or_else(|| {
            self.payloads
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }
}

#[async_trait]
impl MetadataSource for FileMetadataSource {
    async fn fetch(&self, id: &RepositoryId) -> Result<GitHubRepoPayload> {
        let key = id.to_string();
        tracing::debug!(repository = %key, "Reading repository metadata from file");
        self.lookup(&key)
            .cloned()
            .with_context(|| format!("No metadata available for {}", key))
    }
}
