//! Database lifecycle commands: `repomark migrate` and `repomark seed`.

use anyhow::Result;
use repomark::config::AppConfig;
use repomark::models::User;
use repomark::seed::seed;

use super::open_db;

pub fn cmd_migrate(config: &AppConfig) -> Result<()> {
    open_db(config)?;
    println!("Database ready at {}", config.db_path.display());
    Ok(())
}

pub fn cmd_seed(config: &AppConfig) -> Result<()> {
    let db = open_db(config)?;
    let user = User {
        id: config.user_id,
        github_token: config.github_token.clone(),
    };
    let created = seed(&db, &user)?;
    println!("Seeded {} new bookmarks", created);
    Ok(())
}
