//! Stock import, clearing, and the rate-limited dispense path.

use chrono::{DateTime, Utc};

use crate::cooldown::ceil_secs;
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::models::UserId;

/// Split an uploaded stock file into items: one per non-blank line, trimmed.
pub fn parse_stock(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl Ledger {
    /// Hand the oldest stock item to `user_id`.
    ///
    /// Checks run in order: cooldown, entitlement, stock. Stock, used, log and
    /// counts change in a single write, and the cooldown starts only once that
    /// write succeeded.
    pub async fn dispense(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<String> {
        let mut state = self.state.lock().await;

        let window = self.policy.cooldown.window_for(&state.document, user_id, now);
        if let Some(remaining) = state.cooldowns.remaining(user_id, now, window) {
            return Err(LedgerError::RateLimited {
                remaining_secs: ceil_secs(remaining),
            });
        }

        if !state.document.is_entitled(user_id, now) {
            return Err(LedgerError::NotEntitled);
        }

        let mut staged = state.document.clone();
        let item = staged
            .take_next(user_id, now)
            .ok_or(LedgerError::OutOfStock)?;

        self.commit(&mut state.document, staged).await?;
        state.cooldowns.record(user_id, now);

        tracing::info!(
            user_id = %user_id,
            stock_remaining = state.document.stock.len(),
            "item dispensed"
        );

        Ok(item)
    }

    /// Append `items` to the back of the stock queue. Returns how many were added.
    pub async fn import_stock(&self, items: Vec<String>) -> Result<usize> {
        let added = items.len();
        if added == 0 {
            return Ok(0);
        }

        let mut state = self.state.lock().await;
        let mut staged = state.document.clone();
        staged.stock.extend(items);
        self.commit(&mut state.document, staged).await?;

        tracing::info!(
            added,
            stock = state.document.stock.len(),
            "stock imported"
        );

        Ok(added)
    }

    /// Drop all undispensed stock. Returns how many items were removed.
    pub async fn clear_stock(&self) -> Result<usize> {
        let mut state = self.state.lock().await;
        let removed = state.document.stock.len();

        let mut staged = state.document.clone();
        staged.stock.clear();
        self.commit(&mut state.document, staged).await?;

        tracing::info!(removed, "stock cleared");

        Ok(removed)
    }
}
