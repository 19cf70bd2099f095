//! Repository identifiers as users type them.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `owner/name`, letters, digits, `_`, `-` and `.` only.
pub const REPOSITORY_ID_PATTERN: &str = r"^[\w\-.]+/[\w\-.]+$";

pub static REPOSITORY_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REPOSITORY_ID_PATTERN).unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name` or a repository URL.
    ///
    /// For URLs only the path is used, so `https://github.com/owner/name`,
    /// `https://github.com/owner/name/tree/main` and
    /// `https://github.com/owner/name.git` all resolve. Empty segments are
    /// skipped; a trailing `.git` is dropped.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let path = match url::Url::parse(input) {
            Ok(url) => url.path().to_string(),
            Err(_) => input.to_string(),
        };

        let mut parts = path.split('/').filter(|s| !s.is_empty());
        let owner = parts.next()?;
        let name = parts.next()?;
        let name = name.strip_suffix(".git").unwrap_or(name);
        if name.is_empty() {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
