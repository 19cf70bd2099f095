//! CLI command implementations.
//!
//! | Module      | Commands handled                  |
//! |-------------|-----------------------------------|
//! | `store`     | `Migrate`, `Seed`                 |
//! | `bookmarks` | `List`, `Add`, `Remove`, `Check`  |
//! | `stats`     | `Stats`                           |

pub mod bookmarks;
pub mod stats;
pub mod store;

pub use bookmarks::{cmd_add, cmd_check, cmd_list, cmd_remove};
pub use stats::cmd_stats;
pub use store::{cmd_migrate, cmd_seed};

use anyhow::{Context, Result};
use repomark::config::AppConfig;
use repomark::db::BookmarkDb;
use repomark::models::User;
use repomark_form::Submission;

/// Open the configured database and make sure the configured user exists.
pub fn open_db(config: &AppConfig) -> Result<BookmarkDb> {
    config.ensure_directories()?;
    let db = BookmarkDb::new(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;
    db.ensure_user(&User {
        id: config.user_id,
        github_token: config.github_token.clone(),
    })?;
    Ok(db)
}

/// `key=value` arguments, in order, as a form submission.
pub fn submission_from_args(fields: &[String]) -> Result<Submission> {
    let mut submission = Submission::new();
    for field in fields {
        let (key, value) = field
            .split_once('=')
            .with_context(|| format!("Expected key=value, got {:?}", field))?;
        submission.append(key, value);
    }
    Ok(submission)
}
