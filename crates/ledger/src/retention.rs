//! Optional trimming of the usage log.
//!
//! Removed entries are folded into `compacted_counts`, so lifetime totals stay
//! exact while the log only keeps what the rolling window can still see.

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::Document;
use crate::stats::WINDOW;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// `None` keeps every log entry.
    pub keep_logs_for: Option<Duration>,
}

impl RetentionPolicy {
    pub fn keep_for(keep_logs_for: Duration) -> Self {
        Self {
            keep_logs_for: Some(keep_logs_for),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.keep_logs_for.is_some()
    }

    /// Entries strictly older than this are compacted. Never inside the
    /// stats window.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.keep_logs_for.map(|keep| now - keep.max(WINDOW))
    }
}

/// Fold log entries older than `cutoff` into the compacted counts.
/// Returns how many entries were removed.
pub fn compact(document: &mut Document, cutoff: DateTime<Utc>) -> usize {
    let stats = &mut document.stats;
    let before = stats.logs.len();
    let (old, kept): (Vec<_>, Vec<_>) = stats
        .logs
        .drain(..)
        .partition(|entry| entry.time < cutoff);

    for entry in old {
        *stats.compacted_counts.entry(entry.user_id).or_insert(0) += 1;
    }
    stats.logs = kept;

    before - stats.logs.len()
}

impl Ledger {
    /// Apply the configured retention. A no-op when retention is disabled or
    /// nothing is old enough.
    pub async fn compact(&self, now: DateTime<Utc>) -> Result<usize> {
        let Some(cutoff) = self.policy.retention.cutoff(now) else {
            return Ok(0);
        };

        let mut state = self.state.lock().await;
        if !state
            .document
            .stats
            .logs
            .iter()
            .any(|entry| entry.time < cutoff)
        {
            return Ok(0);
        }

        let mut staged = state.document.clone();
        let removed = compact(&mut staged, cutoff);
        self.commit(&mut state.document, staged).await?;

        tracing::info!(removed, "compacted usage log");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Policy;
    use crate::models::{UsageLogEntry, UserId};
    use crate::store::MockDocumentStore;
    use crate::test_utils::{TestLedgerBuilder, at};

    const DAY: i64 = 86_400;

    fn with_logs(entries: &[(u64, i64)]) -> Document {
        let mut doc = Document::new(at(0));
        for (user, secs) in entries {
            let user_id = UserId::from(*user);
            doc.stats.logs.push(UsageLogEntry {
                user_id: user_id.clone(),
                time: at(*secs),
            });
            *doc.stats.user_counts.entry(user_id).or_insert(0) += 1;
        }
        doc
    }

    fn keep_days(days: i64) -> Policy {
        Policy {
            retention: RetentionPolicy::keep_for(Duration::days(days)),
            ..Policy::default()
        }
    }

    #[test]
    fn disabled_by_default() {
        let policy = RetentionPolicy::default();

        assert!(!policy.is_enabled());
        assert!(policy.cutoff(at(10 * DAY)).is_none());
    }

    #[test]
    fn cutoff_never_reaches_into_stats_window() {
        let policy = RetentionPolicy::keep_for(Duration::hours(1));

        assert_eq!(policy.cutoff(at(10 * DAY)), Some(at(9 * DAY)));
    }

    #[test]
    fn compact_folds_old_entries_into_counts() {
        let mut doc = with_logs(&[(1, 0), (2, 10), (1, 20), (1, 5 * DAY)]);

        let removed = compact(&mut doc, at(DAY));

        assert_eq!(removed, 3);
        assert_eq!(doc.stats.logs.len(), 1);
        assert_eq!(doc.stats.compacted_counts[&UserId::from(1)], 2);
        assert_eq!(doc.stats.compacted_counts[&UserId::from(2)], 1);
        assert_eq!(doc.stats.user_counts[&UserId::from(1)], 3);
        assert!(doc.counts_consistent());
    }

    #[test]
    fn compact_keeps_entries_at_cutoff() {
        let mut doc = with_logs(&[(1, DAY)]);

        assert_eq!(compact(&mut doc, at(DAY)), 0);
        assert!(doc.stats.compacted_counts.is_empty());
    }

    #[tokio::test]
    async fn ledger_compact_persists_once_when_something_is_removed() {
        let mut store = MockDocumentStore::new();
        store
            .expect_persist()
            .withf(|doc| doc.stats.logs.len() == 1 && doc.counts_consistent())
            .times(1)
            .returning(|_| Ok(()));
        let ledger = TestLedgerBuilder::new()
            .with_document(with_logs(&[(1, 0), (1, 9 * DAY)]))
            .with_store(store)
            .with_policy(keep_days(7))
            .build();

        let removed = ledger.compact(at(10 * DAY)).await.unwrap();

        assert_eq!(removed, 1);
        let snapshot = ledger.snapshot().await;
        assert_eq!(snapshot.stats.compacted_counts[&UserId::from(1)], 1);
    }

    #[tokio::test]
    async fn ledger_compact_without_old_entries_skips_write() {
        let mut store = MockDocumentStore::new();
        store.expect_persist().never();
        let ledger = TestLedgerBuilder::new()
            .with_document(with_logs(&[(1, 9 * DAY)]))
            .with_store(store)
            .with_policy(keep_days(7))
            .build();

        assert_eq!(ledger.compact(at(10 * DAY)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ledger_compact_is_noop_when_disabled() {
        let mut store = MockDocumentStore::new();
        store.expect_persist().never();
        let doc = with_logs(&[(1, 0)]);
        let ledger = TestLedgerBuilder::new()
            .with_document(doc.clone())
            .with_store(store)
            .build();

        assert_eq!(ledger.compact(at(100 * DAY)).await.unwrap(), 0);
        assert_eq!(ledger.snapshot().await, doc);
    }

    #[tokio::test]
    async fn failed_compaction_keeps_log() {
        let mut store = MockDocumentStore::new();
        store
            .expect_persist()
            .returning(|_| Err(std::io::Error::other("disk full").into()));
        let doc = with_logs(&[(1, 0)]);
        let ledger = TestLedgerBuilder::new()
            .with_document(doc.clone())
            .with_store(store)
            .with_policy(keep_days(1))
            .build();

        assert!(ledger.compact(at(10 * DAY)).await.is_err());
        assert_eq!(ledger.snapshot().await, doc);
    }
}
