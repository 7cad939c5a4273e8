use ledger::parse_stock;
use poise::{
    CreateReply,
    serenity_prelude::{self as serenity, CreateAllowedMentions},
};

use crate::{commands::ensure_admin, error::BotError, state::Context};

/// Upload stock file
#[poise::command(slash_command, guild_only)]
pub async fn stock(
    ctx: Context<'_>,
    #[description = "Text file with stock"] file: serenity::Attachment,
) -> Result<(), BotError> {
    ensure_admin(ctx).await?;
    ctx.defer().await?;

    let state = ctx.data();
    let text = state.fetcher.fetch_text(&file.url).await?;
    let added = state.ledger.import_stock(parse_stock(&text)).await?;

    ctx.send(
        CreateReply::default()
            .content("@here")
            .allowed_mentions(CreateAllowedMentions::new().everyone(true))
            .embed(state.brand.stock_added(added)),
    )
    .await?;

    tracing::info!(added, file = %file.filename, by = %ctx.author().id, "stock imported");

    Ok(())
}

/// Remove all stock
#[poise::command(slash_command, guild_only)]
pub async fn removestock(ctx: Context<'_>) -> Result<(), BotError> {
    ensure_admin(ctx).await?;

    let state = ctx.data();
    let removed = state.ledger.clear_stock().await?;

    ctx.send(CreateReply::default().embed(state.brand.stock_cleared(removed)))
        .await?;

    tracing::info!(removed, by = %ctx.author().id, "stock cleared");

    Ok(())
}
