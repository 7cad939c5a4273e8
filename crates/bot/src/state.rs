use std::sync::Arc;

use ledger::{Ledger, Notifier};

use crate::{config::Config, error::BotError, render::Brand, services::StockFetcher};

/// Shared data handed to every command.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// The stock and subscription ledger.
    pub ledger: Ledger,
    /// DM delivery, also used by the ledger's sweep.
    pub notifier: Arc<dyn Notifier>,
    /// Attachment downloads for `/stock`.
    pub fetcher: Arc<dyn StockFetcher>,
    pub brand: Brand,
}

pub type Context<'a> = poise::Context<'a, AppState, BotError>;
