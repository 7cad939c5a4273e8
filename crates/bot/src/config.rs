use anyhow::{Result, bail};
use chrono::Duration;
use ledger::{CooldownSource, Policy, RetentionPolicy, saturating_seconds};
use poise::serenity_prelude::{GuildId, RoleId};
use serde::{Deserialize, Serialize};

/// Where `/gen` takes its cooldown window from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CooldownMode {
    /// `cooldown_secs` for everyone.
    #[default]
    Fixed,
    /// The subscription's own cooldown, with `cooldown_secs` as fallback.
    Subscription,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub token: String,
    pub guild_id: u64,
    pub admin_role_id: u64,
    pub premium_role_id: u64,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default)]
    pub cooldown_source: CooldownMode,
    /// Unset keeps the usage log forever.
    #[serde(default)]
    pub log_retention_hours: Option<u64>,
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
    #[serde(default)]
    pub brand_icon_url: Option<String>,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Sentry DSN for error tracking
    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

fn default_state_file() -> String {
    "users.json".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_brand_name() -> String {
    "Stockroom".to_string()
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }

    /// Rejects values the Discord client would panic on.
    pub fn validate(&self) -> Result<()> {
        for (name, id) in [
            ("guild_id", self.guild_id),
            ("admin_role_id", self.admin_role_id),
            ("premium_role_id", self.premium_role_id),
        ] {
            if id == 0 {
                bail!("{name} must be a non-zero Discord id");
            }
        }
        if self.sweep_interval_secs == 0 {
            bail!("sweep_interval_secs must be at least 1");
        }
        Ok(())
    }

    pub fn guild(&self) -> GuildId {
        GuildId::new(self.guild_id)
    }

    pub fn admin_role(&self) -> RoleId {
        RoleId::new(self.admin_role_id)
    }

    pub fn premium_role(&self) -> RoleId {
        RoleId::new(self.premium_role_id)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn policy(&self) -> Policy {
        let window = saturating_seconds(self.cooldown_secs);
        let cooldown = match self.cooldown_source {
            CooldownMode::Fixed => CooldownSource::Fixed(window),
            CooldownMode::Subscription => CooldownSource::Subscription { fallback: window },
        };
        let retention = self
            .log_retention_hours
            .map(|hours| RetentionPolicy::keep_for(hours_to_duration(hours)))
            .unwrap_or_default();

        Policy {
            cooldown,
            retention,
        }
    }
}

fn hours_to_duration(hours: u64) -> Duration {
    saturating_seconds(hours.saturating_mul(3600))
}
