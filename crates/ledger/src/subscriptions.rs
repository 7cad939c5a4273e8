//! Premium subscriptions: grant, entitlement check, and the expiry sweep.
//!
//! Records are never merged. A user granted twice holds two records, and
//! each one expires on its own schedule.

use chrono::{DateTime, Duration, Utc};

use crate::error::{LedgerError, Result};
use crate::ledger::{Ledger, State};
use crate::models::{Subscription, UserId};
use crate::services::Notice;

/// 30 days.
pub const DEFAULT_DURATION_SECS: u64 = 2_592_000;

/// `secs` as a duration, saturating instead of overflowing.
pub fn saturating_seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// What a sweep removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub expired: Vec<Subscription>,
    /// Cooldown entries dropped from memory.
    pub pruned_cooldowns: usize,
}

impl Ledger {
    /// Grant premium to `user_id` for `duration`.
    ///
    /// The platform role is granted first; nothing is recorded if that fails.
    pub async fn grant(
        &self,
        user_id: &UserId,
        duration: Duration,
        cooldown_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<Subscription> {
        self.roles
            .grant_role(user_id)
            .await
            .map_err(LedgerError::external)?;

        let subscription = Subscription {
            user_id: user_id.clone(),
            expires_at: now
                .checked_add_signed(duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            cooldown: cooldown_secs,
        };

        let mut state = self.state.lock().await;
        let mut staged = state.document.clone();
        staged.subscriptions.push(subscription.clone());

        if let Err(err) = self.commit(&mut state.document, staged).await {
            drop(state);
            // The user must not keep a role with no record backing it.
            if let Err(revoke_err) = self.roles.revoke_role(user_id).await {
                tracing::warn!(
                    user_id = %user_id,
                    error = %revoke_err,
                    "failed to roll back premium role after persist failure"
                );
            }
            return Err(err.into());
        }

        tracing::info!(
            user_id = %user_id,
            expires_at = %subscription.expires_at,
            cooldown_secs,
            "subscription granted"
        );

        Ok(subscription)
    }

    pub async fn is_entitled(&self, user_id: &UserId, now: DateTime<Utc>) -> bool {
        self.state.lock().await.document.is_entitled(user_id, now)
    }

    /// Remove every subscription with `expires_at <= now`.
    ///
    /// The document is persisted once, and only if something was removed.
    /// Role revocation and the expiry DM follow the write and are best-effort
    /// per record; a failed write makes no platform calls.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<SweepOutcome> {
        let mut state = self.state.lock().await;
        let pruned_cooldowns = self.prune_cooldowns(&mut state, now);

        let (expired, live): (Vec<_>, Vec<_>) = state
            .document
            .subscriptions
            .iter()
            .cloned()
            .partition(|sub| !sub.is_active(now));

        if expired.is_empty() {
            return Ok(SweepOutcome {
                expired,
                pruned_cooldowns,
            });
        }

        let mut staged = state.document.clone();
        staged.subscriptions = live;
        self.commit(&mut state.document, staged).await?;

        for sub in &expired {
            if let Err(err) = self.roles.revoke_role(&sub.user_id).await {
                tracing::warn!(
                    user_id = %sub.user_id,
                    error = %err,
                    "failed to revoke premium role"
                );
            }

            if let Err(err) = self
                .notifier
                .notify_user(&sub.user_id, Notice::SubscriptionExpired)
                .await
            {
                tracing::debug!(user_id = %sub.user_id, error = %err, "expiry DM not delivered");
            }
        }

        tracing::info!(removed = expired.len(), "expired subscriptions swept");

        Ok(SweepOutcome {
            expired,
            pruned_cooldowns,
        })
    }

    fn prune_cooldowns(&self, state: &mut State, now: DateTime<Utc>) -> usize {
        let State {
            document,
            cooldowns,
        } = state;
        let document = &*document;
        let source = self.policy.cooldown;
        cooldowns.prune(now, |user_id| source.window_for(document, user_id, now))
    }
}
