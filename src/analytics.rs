//! Dashboard aggregates over a user's bookmarks.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::health::{HealthAggregations, HealthStatus};
use crate::models::BookmarkView;

pub const TOP_LANGUAGES: usize = 6;
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: usize,
}

/// Count bookmarks per language, most common first.
///
/// Ties keep the order in which languages were first seen. Missing or empty
/// languages are counted as `Unknown`.
pub fn language_distribution(bookmarks: &[BookmarkView], limit: usize) -> Vec<Slice> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for bookmark in bookmarks {
        let language = bookmark
            .language
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(UNKNOWN_LANGUAGE);
        *counts.entry(language).or_insert(0) += 1;
    }

    let mut slices: Vec<Slice> = counts
        .into_iter()
        .map(|(name, value)| Slice {
            name: name.to_string(),
            value,
        })
        .collect();
    // sort_by is stable, which is what keeps first-seen order for ties
    slices.sort_by(|a, b| b.value.cmp(&a.value));
    slices.truncate(limit);
    slices
}

pub fn health_aggregations(bookmarks: &[BookmarkView], now: DateTime<Utc>) -> HealthAggregations {
    HealthAggregations::from_commits(bookmarks.iter().map(|b| b.last_commit_at), now)
}

/// Active, Slowing, Stale, in that order, zeros included.
pub fn health_distribution(bookmarks: &[BookmarkView], now: DateTime<Utc>) -> Vec<Slice> {
    let agg = health_aggregations(bookmarks, now);
    HealthStatus::ALL
        .iter()
        .map(|status| Slice {
            name: status.label().to_string(),
            value: agg.count(*status),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMetric {
    pub status: HealthStatus,
    pub count: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsOverview {
    pub total: usize,
    pub statuses: Vec<StatusMetric>,
}

impl MetricsOverview {
    pub fn from_bookmarks(bookmarks: &[BookmarkView], now: DateTime<Utc>) -> Self {
        let agg = health_aggregations(bookmarks, now);
        let statuses = HealthStatus::ALL
            .iter()
            .map(|status| {
                let count = agg.count(*status);
                StatusMetric {
                    status: *status,
                    count,
                    percent: agg.percent(count),
                }
            })
            .collect();
        Self {
            total: agg.total,
            statuses,
        }
    }

    pub fn get(&self, status: HealthStatus) -> Option<&StatusMetric> {
        self.statuses.iter().find(|m| m.status == status)
    }
}
