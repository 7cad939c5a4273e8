//! Platform capabilities the ledger calls into.
//!
//! Each capability sits behind a trait so tests can swap in a mock and the bot
//! can supply the real platform client.
//!
//! ## Capabilities
//!
//! - **roles** - grant and revoke the premium entitlement role
//! - **notifier** - direct-message a user (always best-effort)

use anyhow::Result;
use async_trait::async_trait;

use crate::models::UserId;

/// Grants and revokes the platform role that mirrors an active subscription.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleService: Send + Sync {
    async fn grant_role(&self, user_id: &UserId) -> Result<()>;

    async fn revoke_role(&self, user_id: &UserId) -> Result<()>;
}

/// What a direct message tells the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SubscriptionExpired,
    /// The user's freshly dispensed item.
    Dispensed { item: String },
}

/// Sends direct messages to users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_user(&self, user_id: &UserId, notice: Notice) -> Result<()>;
}
