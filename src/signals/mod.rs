//! External signal sources for the crawler
//!
//! Each fetcher wraps one HTTP API and normalizes its response into the
//! registry's metric types. Scoring is kept separate and pure so the crawler
//! can compute bounded deltas from the normalized shapes alone.

use chrono::{DateTime, Utc};
use eyre::Result;

pub mod github;
pub mod market;

use crate::registry::{MarketMetrics, SourceControlMetrics};

pub const MAX_REPO_SCORE: i32 = 8;
pub const MAX_MARKET_SCORE: i32 = 2;
pub const MIN_MARKET_SCORE: i32 = -2;

/// Source-control statistics for a repository
pub trait SourceControlFetcher: Send + Sync {
    /// `repo` is a repository URL or `owner/name` shorthand
    fn fetch(&self, repo: &str) -> Result<SourceControlMetrics>;
}

/// Market data for an agent's token
pub trait MarketDataFetcher: Send + Sync {
    /// `Ok(None)` means there is nothing to look up for this agent
    fn fetch(&self, agent_name: &str) -> Result<Option<MarketMetrics>>;
}

/// Repository score in 0..=8: stars tier (0-3) + commit tier (0-3) + push recency (0-2)
pub fn score_repo(stats: &SourceControlMetrics, now: DateTime<Utc>) -> i32 {
    let stars = match stats.stars {
        s if s >= 10_000 => 3,
        s if s >= 1_000 => 2,
        s if s >= 100 => 1,
        _ => 0,
    };

    let commits = match stats.commits_30d {
        c if c >= 100 => 3,
        c if c >= 30 => 2,
        c if c >= 5 => 1,
        _ => 0,
    };

    let days_since_push = (now - stats.last_push).num_days();
    let recency = match days_since_push {
        d if d <= 7 => 2,
        d if d <= 30 => 1,
        _ => 0,
    };

    (stars + commits + recency).min(MAX_REPO_SCORE)
}

/// Market score in -2..=2.
///
/// A 24h drop of 20% or more is an immediate -2. Otherwise heavy volume adds
/// one, a strong gain adds one and a moderate drop takes one away.
pub fn score_market(stats: &MarketMetrics) -> i32 {
    if stats.change_24h <= -20.0 {
        return MIN_MARKET_SCORE;
    }

    let mut score = 0;
    if stats.volume_24h >= 1_000_000.0 {
        score += 1;
    }
    if stats.change_24h >= 10.0 {
        score += 1;
    } else if stats.change_24h <= -5.0 {
        score -= 1;
    }

    score.clamp(MIN_MARKET_SCORE, MAX_MARKET_SCORE)
}
