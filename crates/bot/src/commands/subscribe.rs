use chrono::Utc;
use ledger::{DEFAULT_DURATION_SECS, UserId, saturating_seconds};
use poise::{CreateReply, serenity_prelude as serenity};

use crate::{commands::ensure_admin, error::BotError, state::Context};

/// Missing or non-positive durations fall back to 30 days.
fn effective_duration(duration: Option<i64>) -> u64 {
    duration
        .filter(|secs| *secs > 0)
        .map(|secs| secs.unsigned_abs())
        .unwrap_or(DEFAULT_DURATION_SECS)
}

fn effective_cooldown(cooldown: Option<i64>) -> u64 {
    cooldown.map(|secs| secs.max(0).unsigned_abs()).unwrap_or(0)
}

/// Subscribe a user
#[poise::command(slash_command, guild_only)]
pub async fn subscribe(
    ctx: Context<'_>,
    #[description = "User to subscribe"] target: serenity::User,
    #[description = "Duration in seconds"] duration: Option<i64>,
    #[description = "Cooldown in seconds"] cooldown: Option<i64>,
) -> Result<(), BotError> {
    ensure_admin(ctx).await?;

    let user_id = UserId::from(target.id.get());
    let duration_secs = effective_duration(duration);
    let cooldown_secs = effective_cooldown(cooldown);

    let state = ctx.data();
    state
        .ledger
        .grant(
            &user_id,
            saturating_seconds(duration_secs),
            cooldown_secs,
            Utc::now(),
        )
        .await?;

    ctx.send(CreateReply::default().embed(state.brand.subscribed(&user_id, duration_secs)))
        .await?;

    tracing::info!(
        user_id = %user_id,
        by = %ctx.author().id,
        duration_secs,
        cooldown_secs,
        "subscribed user"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_defaults_when_missing_or_non_positive() {
        assert_eq!(effective_duration(None), DEFAULT_DURATION_SECS);
        assert_eq!(effective_duration(Some(0)), DEFAULT_DURATION_SECS);
        assert_eq!(effective_duration(Some(-5)), DEFAULT_DURATION_SECS);
        assert_eq!(effective_duration(Some(3600)), 3600);
    }

    #[test]
    fn negative_cooldown_clamps_to_zero() {
        assert_eq!(effective_cooldown(None), 0);
        assert_eq!(effective_cooldown(Some(-10)), 0);
        assert_eq!(effective_cooldown(Some(30)), 30);
    }
}
