//! Per-user dispense cooldowns, held in memory only.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::models::{Document, UserId};
use crate::subscriptions::saturating_seconds;

/// Fixed window used when nothing else is configured.
pub const DEFAULT_COOLDOWN: Duration = Duration::seconds(60);

/// Where the cooldown window for a dispense comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownSource {
    /// Same window for everyone; subscription cooldowns are ignored.
    Fixed(Duration),
    /// Largest `cooldown` among the user's active subscriptions, or
    /// `fallback` when none of them sets one.
    Subscription { fallback: Duration },
}

impl Default for CooldownSource {
    fn default() -> Self {
        Self::Fixed(DEFAULT_COOLDOWN)
    }
}

impl CooldownSource {
    pub fn window_for(
        &self,
        document: &Document,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Duration {
        match *self {
            Self::Fixed(window) => window,
            Self::Subscription { fallback } => document
                .subscriptions
                .iter()
                .filter(|sub| &sub.user_id == user_id && sub.is_active(now))
                .map(|sub| sub.cooldown)
                .max()
                .filter(|secs| *secs > 0)
                .map(saturating_seconds)
                .unwrap_or(fallback),
        }
    }
}

/// Last dispense time per user. Reset on restart.
#[derive(Debug, Default)]
pub struct CooldownTable {
    last: HashMap<UserId, DateTime<Utc>>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left before `user_id` may dispense again, if any.
    pub fn remaining(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Option<Duration> {
        let last = self.last.get(user_id)?;
        let elapsed = now - *last;

        if elapsed < window {
            Some(window.checked_sub(&elapsed).unwrap_or(Duration::MAX))
        } else {
            None
        }
    }

    pub fn record(&mut self, user_id: &UserId, now: DateTime<Utc>) {
        self.last.insert(user_id.clone(), now);
    }

    /// Drop entries whose window has passed. Returns how many were dropped.
    pub fn prune(&mut self, now: DateTime<Utc>, window_for: impl Fn(&UserId) -> Duration) -> usize {
        let before = self.last.len();
        self.last
            .retain(|user_id, last| now - *last < window_for(user_id));
        before - self.last.len()
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

/// Whole seconds left, rounded up.
pub fn ceil_secs(remaining: Duration) -> i64 {
    let whole = remaining.num_seconds();
    if remaining > Duration::seconds(whole) {
        whole + 1
    } else {
        whole
    }
}
