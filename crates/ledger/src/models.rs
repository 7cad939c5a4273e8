//! The persisted state document and its records.
//!
//! The document mirrors the JSON file one-to-one. Every field is optional on
//! read so that older or hand-edited files load with zero values filled in.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Platform user identifier, stored as the decimal snowflake string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric snowflake, if the id is one.
    pub fn snowflake(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A time-limited premium grant. A user may hold several at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub user_id: UserId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    /// Per-grant cooldown in seconds.
    #[serde(default)]
    pub cooldown: u64,
}

impl Subscription {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// One successful dispense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLogEntry {
    pub user_id: UserId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Lifetime dispense totals, in first-dispense order.
    #[serde(default)]
    pub user_counts: IndexMap<UserId, u64>,
    #[serde(default)]
    pub logs: Vec<UsageLogEntry>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    /// Log entries folded away by retention, per user.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub compacted_counts: IndexMap<UserId, u64>,
}

/// The whole persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub stock: VecDeque<String>,
    #[serde(default)]
    pub used: Vec<String>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl Document {
    /// Fresh document stamped with its creation time.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            stats: Stats {
                start_time: Some(now),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn is_entitled(&self, user_id: &UserId, now: DateTime<Utc>) -> bool {
        self.subscriptions
            .iter()
            .any(|sub| &sub.user_id == user_id && sub.is_active(now))
    }

    /// Moves the oldest stock item to `used` and records the usage.
    /// Returns `None` when there is no stock.
    pub(crate) fn take_next(&mut self, user_id: &UserId, now: DateTime<Utc>) -> Option<String> {
        let item = self.stock.pop_front()?;
        self.used.push(item.clone());
        self.stats.logs.push(UsageLogEntry {
            user_id: user_id.clone(),
            time: now,
        });
        *self.stats.user_counts.entry(user_id.clone()).or_insert(0) += 1;
        Some(item)
    }

    /// Checks that every lifetime count matches the log plus compacted entries.
    pub fn counts_consistent(&self) -> bool {
        let mut expected: IndexMap<&UserId, u64> = IndexMap::new();
        for entry in &self.stats.logs {
            *expected.entry(&entry.user_id).or_insert(0) += 1;
        }
        for (user, count) in &self.stats.compacted_counts {
            *expected.entry(user).or_insert(0) += count;
        }

        let nonzero = self.stats.user_counts.values().filter(|c| **c > 0).count();
        nonzero == expected.len()
            && expected
                .iter()
                .all(|(user, count)| self.stats.user_counts.get(*user) == Some(count))
    }
}
