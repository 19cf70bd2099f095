//! Naive repository health from the age of the last commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_MONTH: f64 = 60.0 * 60.0 * 24.0 * 30.0;
const ACTIVE_MONTHS: f64 = 2.0;
const SLOWING_MONTHS: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Active,
    Slowing,
    Stale,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 3] = [Self::Active, Self::Slowing, Self::Stale];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Slowing => "slowing",
            Self::Stale => "stale",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Slowing => "Slowing",
            Self::Stale => "Stale",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Months are 30-day blocks. No commit at all counts as stale.
pub fn classify(last_commit_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> HealthStatus {
    let Some(last_commit_at) = last_commit_at else {
        return HealthStatus::Stale;
    };
    let months_ago = (now - last_commit_at).num_seconds() as f64 / SECONDS_PER_MONTH;
    if months_ago <= ACTIVE_MONTHS {
        HealthStatus::Active
    } else if months_ago <= SLOWING_MONTHS {
        HealthStatus::Slowing
    } else {
        HealthStatus::Stale
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthAggregations {
    pub total: usize,
    pub active: usize,
    pub slowing: usize,
    pub stale: usize,
}

impl HealthAggregations {
    pub fn from_commits<I>(last_commits: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = Option<DateTime<Utc>>>,
    {
        let mut agg = Self::default();
        for last_commit_at in last_commits {
            agg.total += 1;
            match classify(last_commit_at, now) {
                HealthStatus::Active => agg.active += 1,
                HealthStatus::Slowing => agg.slowing += 1,
                HealthStatus::Stale => agg.stale += 1,
            }
        }
        agg
    }

    pub fn count(&self, status: HealthStatus) -> usize {
        match status {
            HealthStatus::Active => self.active,
            HealthStatus::Slowing => self.slowing,
            HealthStatus::Stale => self.stale,
        }
    }

    /// Rounded share of `count` in the total, 0 for an empty set.
    pub fn percent(&self, count: usize) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (count as f64 / self.total as f64 * 100.0).round() as u32
    }
}
