//! Platform-facing service implementations.
//!
//! ## Services
//!
//! - **discord** - premium role management and direct messages, implementing
//!   the ledger's `RoleService` and `Notifier`
//! - **attachments** - downloads uploaded stock files over HTTP

mod attachments;
mod discord;

pub use attachments::{HttpStockFetcher, StockFetcher};
pub use discord::{DiscordNotifier, DiscordRoles};
