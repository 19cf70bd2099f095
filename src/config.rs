use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use repomark_form::DecodeLimits;

use crate::seed::DEMO_USER_ID;

pub const DEFAULT_DB_PATH: &str = ".private/repomark.db";

/// Runtime configuration for repomark.
///
/// Values come from the process environment after `.env` has been loaded.
/// CLI flags are applied on top by the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub github_token: Option<String>,
    pub user_id: Uuid,
    pub form_limits: DecodeLimits,
}

impl AppConfig {
    /// Load `.env` (if present) and read the environment.
    pub fn from_env() -> Result<Self> {
        // A missing .env is normal; a malformed one is worth a warning.
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Failed to load .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = get("REPOMARK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let github_token = get("GITHUB_TOKEN").or_else(|| get("GITHUB_PAT"));

        let user_id = match get("REPOMARK_USER_ID") {
            Some(raw) => Uuid::parse_str(raw.trim())
                .with_context(|| format!("REPOMARK_USER_ID is not a UUID: {}", raw))?,
            None => DEMO_USER_ID,
        };

        let defaults = DecodeLimits::default();
        let form_limits = DecodeLimits {
            max_depth: parse_limit(get("REPOMARK_FORM_MAX_DEPTH"), "REPOMARK_FORM_MAX_DEPTH")?
                .unwrap_or(defaults.max_depth),
            max_index: parse_limit(get("REPOMARK_FORM_MAX_INDEX"), "REPOMARK_FORM_MAX_INDEX")?
                .unwrap_or(defaults.max_index),
            max_entries: parse_limit(
                get("REPOMARK_FORM_MAX_ENTRIES"),
                "REPOMARK_FORM_MAX_ENTRIES",
            )?
            .unwrap_or(defaults.max_entries),
            max_slots: parse_limit(get("REPOMARK_FORM_MAX_SLOTS"), "REPOMARK_FORM_MAX_SLOTS")?
                .unwrap_or(defaults.max_slots),
        };

        Ok(Self {
            db_path,
            github_token,
            user_id,
            form_limits,
        })
    }

    pub fn with_db_path(mut self, db_path: Option<PathBuf>) -> Self {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        self
    }

    /// Create the database's parent directory if it has one.
    pub fn ensure_directories(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent().filter(|p| p != &Path::new("")) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
        Ok(())
    }
}

fn parse_limit(raw: Option<String>, key: &str) -> Result<Option<usize>> {
    raw.map(|v| {
        v.trim()
            .parse::<usize>()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, v))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.github_token, None);
        assert_eq!(config.user_id, DEMO_USER_ID);
        assert_eq!(config.form_limits, DecodeLimits::default());
    }

    #[test]
    fn test_github_token_falls_back_to_pat() {
        let config = config_from(&[("GITHUB_PAT", "ghp_pat")]).unwrap();
        assert_eq!(config.github_token.as_deref(), Some("ghp_pat"));

        let config = config_from(&[("GITHUB_TOKEN", "ghp_tok"), ("GITHUB_PAT", "ghp_pat")]).unwrap();
        assert_eq!(config.github_token.as_deref(), Some("ghp_tok"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config_from(&[("GITHUB_TOKEN", ""), ("REPOMARK_DB_PATH", "  ")]).unwrap();
        assert_eq!(config.github_token, None);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn test_form_limits_override() {
        let config = config_from(&[
            ("REPOMARK_FORM_MAX_DEPTH", "4"),
            ("REPOMARK_FORM_MAX_ENTRIES", "10"),
            ("REPOMARK_FORM_MAX_SLOTS", "50"),
        ])
        .unwrap();
        assert_eq!(config.form_limits.max_depth, 4);
        assert_eq!(config.form_limits.max_entries, 10);
        assert_eq!(config.form_limits.max_slots, 50);
        assert_eq!(
            config.form_limits.max_index,
            DecodeLimits::default().max_index
        );
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = config_from(&[("REPOMARK_FORM_MAX_INDEX", "lots")]).unwrap_err();
        assert!(err.to_string().contains("REPOMARK_FORM_MAX_INDEX"));

        let err = config_from(&[("REPOMARK_USER_ID", "demo")]).unwrap_err();
        assert!(err.to_string().contains("REPOMARK_USER_ID"));
    }

    #[test]
    fn test_cli_db_path_overrides() {
        let config = config_from(&[("REPOMARK_DB_PATH", "a.db")])
            .unwrap()
            .with_db_path(Some(PathBuf::from("b.db")));
        assert_eq!(config.db_path, PathBuf::from("b.db"));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/dir/repomark.db");
        let config = config_from(&[]).unwrap().with_db_path(Some(db_path.clone()));
        config.ensure_directories().unwrap();
        assert!(db_path.parent().unwrap().exists());
    }
}
