//! Slash commands and the shared error handler.
//!
//! ## Commands
//!
//! - **subscribe** - grant premium to a user (admin)
//! - **gen** - dispense one item to a subscriber
//! - **stock** / **removestock** - import or clear stock (admin)
//! - **stats** - usage report (admin)

mod generate;
mod stats;
mod stock;
mod subscribe;

use poise::{CreateReply, FrameworkError};

use crate::{
    error::{BotError, ErrorReply},
    state::{AppState, Context},
};

pub fn all() -> Vec<poise::Command<AppState, BotError>> {
    vec![
        subscribe::subscribe(),
        generate::generate(),
        stock::stock(),
        stock::removestock(),
        stats::stats(),
    ]
}

/// Fails with `PermissionDenied` unless the caller holds the admin role.
async fn ensure_admin(ctx: Context<'_>) -> Result<(), BotError> {
    let admin_role = ctx.data().config.admin_role();
    let member = ctx
        .author_member()
        .await
        .ok_or(BotError::PermissionDenied)?;

    if member.roles.contains(&admin_role) {
        Ok(())
    } else {
        Err(BotError::PermissionDenied)
    }
}

pub async fn on_error(error: FrameworkError<'_, AppState, BotError>) {
    match error {
        FrameworkError::Command { error, ctx, .. } => {
            let command = ctx.command().name.as_str();
            error.report(command);

            let reply = match error.user_reply(command) {
                ErrorReply::Text(text) => CreateReply::default().content(text),
                ErrorReply::Cooldown { remaining_secs } => {
                    CreateReply::default().embed(ctx.data().brand.cooldown(remaining_secs))
                }
            };

            if let Err(err) = ctx.send(reply.ephemeral(true)).await {
                tracing::warn!(command, error = %err, "failed to send error reply");
            }
        }
        other => {
            if let Err(err) = poise::builtins::on_error(other).await {
                tracing::error!(error = %err, "error while handling framework error");
            }
        }
    }
}
