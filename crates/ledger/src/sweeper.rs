//! Background loop for expiry sweeps and log compaction.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use crate::ledger::Ledger;

/// Default spacing between compaction runs.
pub const COMPACTION_EVERY: Duration = Duration::from_secs(3600);

pub struct Sweeper {
    ledger: Ledger,
    every: Duration,
    compact_every: Option<Duration>,
}

impl Sweeper {
    pub fn new(ledger: Ledger, every: Duration) -> Self {
        Self {
            ledger,
            every,
            compact_every: None,
        }
    }

    /// Also compact the usage log on its own interval. Has no effect unless
    /// the ledger's retention policy is enabled.
    pub fn with_compaction(mut self, every: Duration) -> Self {
        if self.ledger.policy().retention.is_enabled() {
            self.compact_every = Some(every);
        }
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until the task is dropped. Failures are logged and retried on the
    /// next tick.
    pub async fn run(self) {
        let mut sweeps = ticker(self.every);
        let mut compactions = self.compact_every.map(ticker);

        tracing::info!(
            every_secs = self.every.as_secs(),
            compaction = compactions.is_some(),
            "sweeper started"
        );

        loop {
            tokio::select! {
                _ = sweeps.tick() => self.sweep().await,
                _ = next_tick(&mut compactions) => self.compact().await,
            }
        }
    }

    async fn sweep(&self) {
        match self.ledger.sweep_expired(Utc::now()).await {
            Ok(outcome) if outcome.pruned_cooldowns > 0 => {
                tracing::debug!(pruned = outcome.pruned_cooldowns, "cooldowns pruned");
            }
            Ok(_) => {}
            Err(err) => tracing::error!(error = %err, "subscription sweep failed"),
        }
    }

    async fn compact(&self) {
        if let Err(err) = self.ledger.compact(Utc::now()).await {
            tracing::error!(error = %err, "log compaction failed");
        }
    }
}

fn ticker(every: Duration) -> Interval {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
