mod commands;
mod config;
mod error;
mod leaderboard;
mod render;
mod services;
mod state;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use ledger::{DocumentStore, JsonFileStore, Ledger, Sweeper, sweeper::COMPACTION_EVERY};
use poise::serenity_prelude as serenity;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Config,
    render::Brand,
    services::{DiscordNotifier, DiscordRoles, HttpStockFetcher},
    state::AppState,
};

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Subscription-gated stock bot")]
struct Args {
    /// Load and validate the state file, then exit
    #[arg(long)]
    check: bool,
    /// Compact the usage log per the retention setting, then exit
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = envy::prefixed("STOCKROOM_").from_env::<Config>()?;
    config.validate()?;

    // Initialize Sentry for error tracking (guard must stay alive)
    let _sentry_guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(config.env.clone().into()),
                ..Default::default()
            },
        ))
    });

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    let store = Arc::new(JsonFileStore::new(&config.state_file));

    if args.check {
        return check(&store).await;
    }

    let brand = Brand {
        name: config.brand_name.clone(),
        icon_url: config.brand_icon_url.clone(),
    };
    let http = Arc::new(serenity::Http::new(&config.token));
    let roles = Arc::new(DiscordRoles::new(
        http.clone(),
        config.guild(),
        config.premium_role(),
    ));
    let notifier = Arc::new(DiscordNotifier::new(http, brand.clone()));

    let ledger = Ledger::open(
        store,
        roles,
        notifier.clone(),
        config.policy(),
        Utc::now(),
    )
    .await?;

    if args.compact {
        let removed = ledger.compact(Utc::now()).await?;
        tracing::info!(removed, "compaction complete");
        return Ok(());
    }

    let sweeper = Sweeper::new(ledger.clone(), config.sweep_interval())
        .with_compaction(COMPACTION_EVERY)
        .spawn();

    let guild_id = config.guild();
    let token = config.token.clone();
    let state = AppState {
        config,
        ledger,
        notifier,
        fetcher: Arc::new(HttpStockFetcher::new()),
        brand,
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(commands::on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                    .await?;
                tracing::info!(
                    user = %ready.user.name,
                    guild_id = %guild_id,
                    "commands registered"
                );
                Ok(state)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, serenity::GatewayIntents::GUILDS)
        .framework(framework)
        .await?;
    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start() => result?,
        _ = shutdown_signal() => shard_manager.shutdown_all().await,
    }

    sweeper.abort();
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Report what the state file holds without connecting anywhere.
async fn check(store: &JsonFileStore) -> Result<()> {
    let Some(document) = store.load().await? else {
        tracing::info!(path = %store.path().display(), "no state file yet");
        return Ok(());
    };

    let consistent = document.counts_consistent();
    tracing::info!(
        path = %store.path().display(),
        stock = document.stock.len(),
        used = document.used.len(),
        subscriptions = document.subscriptions.len(),
        log_entries = document.stats.logs.len(),
        consistent,
        "state file is readable"
    );

    if !consistent {
        anyhow::bail!("lifetime counts disagree with the usage log");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
