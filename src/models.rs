use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::RepositoryId;

/// Flags reserved for background health analysis. Stored, not yet computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthFlag {
    Active,
    Inactive,
    Archived,
    Drowning,
}

impl HealthFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Archived => "archived",
            Self::Drowning => "drowning",
        }
    }
}

impl std::fmt::Display for HealthFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "archived" => Ok(Self::Archived),
            "drowning" => Ok(Self::Drowning),
            _ => Err(format!("Invalid health flag: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub github_token: Option<String>,
}

/// Repository metadata as cached from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub homepage_url: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars_count: i64,
    pub open_issues_count: i64,
    pub archived: bool,
    pub topics: Vec<String>,
    pub latest_release: Option<String>,
    pub last_commit_at: Option<DateTime<Utc>>,
    pub health_flags: Vec<HealthFlag>,
    pub github_created_at: DateTime<Utc>,
    pub github_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Repository {
    pub fn id(&self) -> RepositoryId {
        RepositoryId::new(&self.owner, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub user_id: Uuid,
    pub owner: String,
    pub name: String,
    pub note: Option<String>,
}

/// A bookmark joined with its repository, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkView {
    pub owner: String,
    pub name: String,
    pub note: Option<String>,
    pub full_name: String,
    pub html_url: String,
    pub homepage_url: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars_count: i64,
    pub open_issues_count: i64,
    pub archived: bool,
    pub topics: Vec<String>,
    pub last_commit_at: Option<DateTime<Utc>>,
    pub health_flags: Vec<HealthFlag>,
    pub created_at: DateTime<Utc>,
    pub github_updated_at: DateTime<Utc>,
}

impl BookmarkView {
    /// `owner/name`, unique per user.
    pub fn id(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_flag_round_trips_through_str() {
        for flag in [
            HealthFlag::Active,
            HealthFlag::Inactive,
            HealthFlag::Archived,
            HealthFlag::Drowning,
        ] {
            assert_eq!(HealthFlag::from_str(flag.as_str()), Ok(flag));
        }
        assert!(HealthFlag::from_str("sleepy").is_err());
    }

    #[test]
    fn test_health_flag_serde_is_snake_case() {
        let json = serde_json::to_string(&vec![HealthFlag::Drowning]).unwrap();
        assert_eq!(json, r#"["drowning"]"#);
    }
}
