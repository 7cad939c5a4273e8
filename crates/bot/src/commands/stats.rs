use chrono::Utc;
use poise::CreateReply;

use crate::{commands::ensure_admin, error::BotError, state::Context};

/// View bot statistics
#[poise::command(slash_command, guild_only)]
pub async fn stats(ctx: Context<'_>) -> Result<(), BotError> {
    ensure_admin(ctx).await?;
    ctx.defer().await?;

    let state = ctx.data();
    let report = state.ledger.report(Utc::now()).await;

    ctx.send(CreateReply::default().embed(state.brand.stats(&report)))
        .await?;

    Ok(())
}
