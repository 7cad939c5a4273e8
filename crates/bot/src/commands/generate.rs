use chrono::Utc;
use ledger::{Notice, UserId};
use poise::CreateReply;

use crate::{error::BotError, leaderboard, state::Context};

/// Generate an item
#[poise::command(slash_command, guild_only, rename = "gen")]
pub async fn generate(ctx: Context<'_>) -> Result<(), BotError> {
    let state = ctx.data();
    let user_id = UserId::from(ctx.author().id.get());
    let now = Utc::now();

    let item = state.ledger.dispense(&user_id, now).await?;

    // DMs are best-effort; a closed inbox still counts as dispensed.
    if let Err(err) = state
        .notifier
        .notify_user(&user_id, Notice::Dispensed { item })
        .await
    {
        tracing::debug!(user_id = %user_id, error = %err, "item DM not delivered");
    }

    ctx.send(CreateReply::default().embed(state.brand.generated(&user_id)))
        .await?;

    let board = state.ledger.leaderboard(now).await;
    if let Err(err) = leaderboard::refresh(
        ctx.http(),
        ctx.channel_id(),
        ctx.framework().bot_id,
        state.brand.leaderboard(&board),
    )
    .await
    {
        tracing::warn!(
            channel_id = %ctx.channel_id(),
            error = %err,
            "failed to refresh leaderboard"
        );
    }

    Ok(())
}
