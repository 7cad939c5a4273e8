//! Core of the stock dispenser: a single JSON state document holding stock,
//! usage history and premium subscriptions, guarded by one lock.
//!
//! The platform side (roles, direct messages) is reached only through the
//! traits in [`services`], so everything here runs without a chat client.

pub mod cooldown;
pub mod dispenser;
pub mod error;
mod ledger;
pub mod models;
pub mod retention;
pub mod services;
pub mod stats;
pub mod store;
pub mod subscriptions;
pub mod sweeper;

#[cfg(test)]
mod test_utils;

pub use cooldown::CooldownSource;
pub use dispenser::parse_stock;
pub use error::{LedgerError, StoreError};
pub use ledger::{Ledger, Policy};
pub use models::{Document, Subscription, UserId};
pub use retention::RetentionPolicy;
pub use services::{Notice, Notifier, RoleService};
pub use stats::{Leaderboard, Report};
pub use store::{DocumentStore, JsonFileStore};
pub use subscriptions::{DEFAULT_DURATION_SECS, SweepOutcome, saturating_seconds};
pub use sweeper::Sweeper;
