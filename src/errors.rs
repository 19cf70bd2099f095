//! Typed errors for bookmark operations.
//!
//! `BookmarkError` separates failures a user can act on (duplicate bookmark,
//! unreadable repository identifier) from infrastructure faults. Actions show
//! `user_message()` for the former and a generic message for the rest.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("Bookmark already exists")]
    AlreadyExists,

    #[error("Invalid repository identifier: {0}")]
    InvalidRepository(String),

    #[error("Failed to fetch repository metadata: {0}")]
    Metadata(#[source] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),
}

impl BookmarkError {
    /// Message safe to show next to the form, if this error is user-facing.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::AlreadyExists | Self::InvalidRepository(_) => Some(self.to_string()),
            Self::Metadata(_) | Self::Database(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_exists_is_user_facing() {
        let err = BookmarkError::AlreadyExists;
        assert_eq!(err.user_message().as_deref(), Some("Bookmark already exists"));
    }

    #[test]
    fn invalid_repository_carries_input() {
        let err = BookmarkError::InvalidRepository("react".to_string());
        assert_eq!(
            err.user_message().as_deref(),
            Some("Invalid repository identifier: react")
        );
    }

    #[test]
    fn infrastructure_errors_are_not_user_facing() {
        let err = BookmarkError::Database(anyhow::anyhow!("disk full"));
        assert!(err.user_message().is_none());
        assert!(err.to_string().contains("disk full"));

        let err = BookmarkError::Metadata(anyhow::anyhow!("rate limited"));
        assert!(err.user_message().is_none());
        match &err {
            BookmarkError::Metadata(e) => assert_eq!(e.to_string(), "rate limited"),
            _ => panic!("Expected Metadata"),
        }
    }
}
