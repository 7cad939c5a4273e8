//! Discord-backed role and DM capabilities.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use ledger::{Notice, Notifier, RoleService, UserId};
use poise::serenity_prelude::{self as serenity, CreateMessage, GuildId, Http, RoleId};

use crate::render::Brand;

const AUDIT_REASON: &str = "premium subscription";

/// Discord user id for a stored user id.
pub fn discord_user(user_id: &UserId) -> Result<serenity::UserId> {
    user_id
        .snowflake()
        .filter(|id| *id != 0)
        .map(serenity::UserId::new)
        .ok_or_else(|| anyhow!("not a Discord user id: {user_id}"))
}

/// Adds and removes the premium role in the configured guild.
pub struct DiscordRoles {
    http: Arc<Http>,
    guild_id: GuildId,
    role_id: RoleId,
}

impl DiscordRoles {
    pub fn new(http: Arc<Http>, guild_id: GuildId, role_id: RoleId) -> Self {
        Self {
            http,
            guild_id,
            role_id,
        }
    }
}

#[async_trait]
impl RoleService for DiscordRoles {
    async fn grant_role(&self, user_id: &UserId) -> Result<()> {
        self.http
            .add_member_role(
                self.guild_id,
                discord_user(user_id)?,
                self.role_id,
                Some(AUDIT_REASON),
            )
            .await?;
        Ok(())
    }

    async fn revoke_role(&self, user_id: &UserId) -> Result<()> {
        self.http
            .remove_member_role(
                self.guild_id,
                discord_user(user_id)?,
                self.role_id,
                Some(AUDIT_REASON),
            )
            .await?;
        Ok(())
    }
}

/// Sends notices as DM embeds.
pub struct DiscordNotifier {
    http: Arc<Http>,
    brand: Brand,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>, brand: Brand) -> Self {
        Self { http, brand }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify_user(&self, user_id: &UserId, notice: Notice) -> Result<()> {
        let embed = match &notice {
            Notice::SubscriptionExpired => self.brand.expired_dm(),
            Notice::Dispensed { item } => self.brand.item_dm(item),
        };

        let channel = discord_user(user_id)?
            .create_dm_channel(self.http.as_ref())
            .await?;
        channel
            .send_message(self.http.as_ref(), CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_snowflake_ids() {
        let id = discord_user(&UserId::from(123_456_789_012_345_678)).unwrap();

        assert_eq!(id.get(), 123_456_789_012_345_678);
    }

    #[test]
    fn rejects_non_snowflake_ids() {
        assert!(discord_user(&UserId::from("alice")).is_err());
        assert!(discord_user(&UserId::from(0)).is_err());
    }
}
