//! `repomark stats`: dashboard aggregates.

use anyhow::Result;
use chrono::Utc;
use repomark::analytics::{
    MetricsOverview, TOP_LANGUAGES, health_distribution, language_distribution,
};
use repomark::config::AppConfig;
use repomark::db::DbHandle;
use serde_json::json;

use super::open_db;

pub async fn cmd_stats(config: &AppConfig, json: bool) -> Result<()> {
    let db = DbHandle::new(open_db(config)?);
    let user_id = config.user_id;
    let bookmarks = db.call(move |db| db.list_bookmarks(user_id)).await?;

    let now = Utc::now();
    let overview = MetricsOverview::from_bookmarks(&bookmarks, now);
    let health = health_distribution(&bookmarks, now);
    let languages = language_distribution(&bookmarks, TOP_LANGUAGES);

    if json {
        let out = json!({
            "overview": overview,
            "health": health,
            "languages": languages,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Total bookmarks: {}", overview.total);
    for metric in &overview.statuses {
        println!(
            "  {:<8} {:>3}%  ({} of {})",
            metric.status.label(),
            metric.percent,
            metric.count,
            overview.total
        );
    }
    if overview.total == 0 {
        println!("No data yet");
        return Ok(());
    }
    println!("Languages:");
    for slice in &languages {
        println!("  {:<16} {}", slice.name, slice.value);
    }
    Ok(())
}
