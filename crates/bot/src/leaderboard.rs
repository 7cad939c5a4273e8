//! The pinned live leaderboard in the generation channel.

use poise::serenity_prelude::{ChannelId, CreateEmbed, CreateMessage, EditMessage, Http, UserId};

use crate::render::LEADERBOARD_MARKER;

/// Whether a pinned message is this bot's leaderboard.
pub fn is_leaderboard(author: UserId, bot: UserId, first_title: Option<&str>) -> bool {
    author == bot && first_title.is_some_and(|title| title.contains(LEADERBOARD_MARKER))
}

/// Edit the bot's pinned leaderboard in `channel`, or post and pin a new one.
pub async fn refresh(
    http: &Http,
    channel: ChannelId,
    bot: UserId,
    embed: CreateEmbed,
) -> Result<(), poise::serenity_prelude::Error> {
    let pinned = channel.pins(http).await?;
    let existing = pinned.into_iter().find(|msg| {
        is_leaderboard(
            msg.author.id,
            bot,
            msg.embeds.first().and_then(|e| e.title.as_deref()),
        )
    });

    match existing {
        Some(mut msg) => {
            msg.edit(http, EditMessage::new().embed(embed)).await?;
        }
        None => {
            let msg = channel
                .send_message(http, CreateMessage::new().embed(embed))
                .await?;
            msg.pin(http).await?;
            tracing::info!(channel_id = %channel, "pinned new leaderboard");
        }
    }

    Ok(())
}
