//! Read-only aggregates over the usage log and counters.
//!
//! Everything here is a pure function of a document snapshot. Ties always
//! resolve to insertion order: `user_counts` is ordered by first dispense and
//! window counts by first appearance in the log.

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;

use crate::ledger::Ledger;
use crate::models::{Document, Subscription, UsageLogEntry, UserId};

/// Rolling window for "recent" figures.
pub const WINDOW: Duration = Duration::hours(24);

/// Length of each leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

/// Highest counts first; equal counts keep their map order.
pub fn top_n(counts: &IndexMap<UserId, u64>, n: usize) -> Vec<(UserId, u64)> {
    let mut ranked: Vec<(UserId, u64)> = counts
        .iter()
        .map(|(user, count)| (user.clone(), *count))
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

pub fn lifetime_counts(document: &Document) -> &IndexMap<UserId, u64> {
    &document.stats.user_counts
}

/// Dispenses per user at or after `window_start`.
pub fn window_counts(
    logs: &[UsageLogEntry],
    window_start: DateTime<Utc>,
) -> IndexMap<UserId, u64> {
    let mut counts = IndexMap::new();
    for entry in logs.iter().filter(|entry| entry.time >= window_start) {
        *counts.entry(entry.user_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// `total` per hour over at least one hour, rounded to two decimals.
pub fn rate(total: u64, hours: f64) -> f64 {
    let per_hour = total as f64 / hours.max(1.0);
    (per_hour * 100.0).round() / 100.0
}

/// The subscriber with the most lifetime dispenses, if any has one.
pub fn most_active_premium(
    subscriptions: &[Subscription],
    counts: &IndexMap<UserId, u64>,
) -> Option<(UserId, u64)> {
    let mut best: Option<(&UserId, u64)> = None;

    for sub in subscriptions {
        let count = counts.get(&sub.user_id).copied().unwrap_or(0);
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((&sub.user_id, count));
        }
    }

    best.filter(|(_, count)| *count > 0)
        .map(|(user, count)| (user.clone(), count))
}

fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}

/// Everything shown by the stats command.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub lifetime_total: u64,
    pub lifetime_unique: usize,
    pub lifetime_rate: f64,
    pub window_total: u64,
    pub window_unique: usize,
    pub window_rate: f64,
    pub stock_remaining: usize,
    pub lifetime_top: Vec<(UserId, u64)>,
    pub window_top: Vec<(UserId, u64)>,
    pub most_active_premium: Option<(UserId, u64)>,
}

impl Report {
    pub fn build(document: &Document, now: DateTime<Utc>) -> Self {
        let lifetime = lifetime_counts(document);
        let recent = window_counts(&document.stats.logs, now - WINDOW);

        let lifetime_total = lifetime.values().sum();
        let window_total = recent.values().sum();
        let started = document.stats.start_time.unwrap_or(now);

        Self {
            lifetime_total,
            lifetime_unique: lifetime.len(),
            lifetime_rate: rate(lifetime_total, hours_between(started, now)),
            window_total,
            window_unique: recent.len(),
            window_rate: rate(window_total, WINDOW.num_hours() as f64),
            stock_remaining: document.stock.len(),
            lifetime_top: top_n(lifetime, LEADERBOARD_SIZE),
            window_top: top_n(&recent, LEADERBOARD_SIZE),
            most_active_premium: most_active_premium(&document.subscriptions, lifetime),
        }
    }
}

/// The live leaderboard pinned in the generation channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    pub lifetime_top: Vec<(UserId, u64)>,
    pub window_top: Vec<(UserId, u64)>,
}

impl Leaderboard {
    pub fn build(document: &Document, now: DateTime<Utc>) -> Self {
        let recent = window_counts(&document.stats.logs, now - WINDOW);

        Self {
            lifetime_top: top_n(lifetime_counts(document), LEADERBOARD_SIZE),
            window_top: top_n(&recent, LEADERBOARD_SIZE),
        }
    }
}

impl Ledger {
    pub async fn report(&self, now: DateTime<Utc>) -> Report {
        Report::build(&self.state.lock().await.document, now)
    }

    pub async fn leaderboard(&self, now: DateTime<Utc>) -> Leaderboard {
        Leaderboard::build(&self.state.lock().await.document, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, subscription};

    fn counts(pairs: &[(u64, u64)]) -> IndexMap<UserId, u64> {
        pairs
            .iter()
            .map(|(user, count)| (UserId::from(*user), *count))
            .collect()
    }

    fn log(user: u64, secs: i64) -> UsageLogEntry {
        UsageLogEntry {
            user_id: UserId::from(user),
            time: at(secs),
        }
    }

    mod top_n {
        use super::*;

        #[test]
        fn ties_keep_insertion_order() {
            let ranked = top_n(&counts(&[(1, 5), (2, 5), (3, 1)]), 2);

            assert_eq!(ranked, vec![(UserId::from(1), 5), (UserId::from(2), 5)]);
        }

        #[test]
        fn sorts_descending() {
            let ranked = top_n(&counts(&[(1, 1), (2, 7), (3, 3)]), 5);

            let order: Vec<u64> = ranked.iter().map(|(_, c)| *c).collect();
            assert_eq!(order, vec![7, 3, 1]);
        }

        #[test]
        fn empty_counts_give_empty_board() {
            assert!(top_n(&IndexMap::new(), 5).is_empty());
        }
    }

    #[test]
    fn window_counts_include_boundary_and_keep_first_seen_order() {
        let logs = vec![log(2, 50), log(1, 100), log(2, 150), log(3, 99)];

        let recent = window_counts(&logs, at(100));

        assert_eq!(recent, counts(&[(1, 1), (2, 1)]));
    }

    #[test]
    fn rate_rounds_and_floors_hours_at_one() {
        assert_eq!(rate(10, 0.25), 10.0);
        assert_eq!(rate(10, 3.0), 3.33);
        assert_eq!(rate(2, 3.0), 0.67);
        assert_eq!(rate(0, 24.0), 0.0);
    }

    mod most_active_premium {
        use super::*;

        #[test]
        fn picks_highest_count_among_subscribers() {
            let subs = vec![subscription(1, at(0)), subscription(2, at(0))];

            let best = most_active_premium(&subs, &counts(&[(1, 2), (2, 9), (3, 50)]));

            assert_eq!(best, Some((UserId::from(2), 9)));
        }

        #[test]
        fn first_subscriber_wins_ties() {
            let subs = vec![
                subscription(2, at(0)),
                subscription(1, at(0)),
                subscription(2, at(5)),
            ];

            let best = most_active_premium(&subs, &counts(&[(1, 4), (2, 4)]));

            assert_eq!(best, Some((UserId::from(2), 4)));
        }

        #[test]
        fn none_when_nobody_dispensed() {
            let subs = vec![subscription(1, at(0))];

            assert_eq!(most_active_premium(&subs, &IndexMap::new()), None);
            assert_eq!(most_active_premium(&[], &counts(&[(1, 3)])), None);
        }
    }

    #[test]
    fn report_combines_lifetime_and_window_figures() {
        let now = at(10 * 3600);
        let mut doc = Document::new(at(0));
        doc.stock.extend(["x".to_string(), "y".to_string()]);
        doc.stats.logs = vec![log(1, 0), log(1, 3600), log(2, 9 * 3600)];
        doc.stats.user_counts = counts(&[(1, 2), (2, 1)]);
        doc.subscriptions.push(subscription(2, at(20 * 3600)));

        let report = Report::build(&doc, now);

        assert_eq!(report.lifetime_total, 3);
        assert_eq!(report.lifetime_unique, 2);
        assert_eq!(report.lifetime_rate, 0.3);
        assert_eq!(report.window_total, 3);
        assert_eq!(report.window_unique, 2);
        assert_eq!(report.window_rate, 0.13);
        assert_eq!(report.stock_remaining, 2);
        assert_eq!(report.lifetime_top[0], (UserId::from(1), 2));
        assert_eq!(report.most_active_premium, Some((UserId::from(2), 1)));
    }

    #[test]
    fn report_without_start_time_uses_one_hour() {
        let now = at(1_000_000);
        let mut doc = Document::default();
        doc.stats.logs = vec![log(1, 999_000)];
        doc.stats.user_counts = counts(&[(1, 1)]);

        let report = Report::build(&doc, now);

        assert_eq!(report.lifetime_rate, 1.0);
    }

    #[test]
    fn leaderboard_window_excludes_old_entries() {
        let now = at(3 * 86_400);
        let mut doc = Document::default();
        doc.stats.logs = vec![log(1, 0), log(1, 10), log(2, now.timestamp() - 60)];
        doc.stats.user_counts = counts(&[(1, 2), (2, 1)]);

        let board = Leaderboard::build(&doc, now);

        assert_eq!(board.lifetime_top[0], (UserId::from(1), 2));
        assert_eq!(board.window_top, vec![(UserId::from(2), 1)]);
    }
}
