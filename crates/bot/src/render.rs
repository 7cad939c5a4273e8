//! Embeds and reply text.

use ledger::{Leaderboard, Report, UserId};
use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter, Timestamp};

pub const BRAND_COLOUR: u32 = 0x5865F2;
pub const ALERT_COLOUR: u32 = 0xFF0000;

/// Title fragment that identifies the pinned leaderboard message.
pub const LEADERBOARD_MARKER: &str = "Live Leaderboard";

const CELEBRATION_GIF: &str = "https://media.giphy.com/media/3o7aD6vRNRlWlLXdJ2/giphy.gif";

#[derive(Debug, Clone)]
pub struct Brand {
    pub name: String,
    pub icon_url: Option<String>,
}

impl Brand {
    fn embed(&self, title: impl Into<String>, footer: &str) -> CreateEmbed {
        let mut footer = CreateEmbedFooter::new(footer);
        let mut embed = CreateEmbed::new()
            .colour(BRAND_COLOUR)
            .title(title)
            .timestamp(Timestamp::now());

        if let Some(icon) = &self.icon_url {
            footer = footer.icon_url(icon);
            embed = embed.thumbnail(icon);
        }
        embed.footer(footer)
    }

    fn generator_footer(&self) -> String {
        format!("{} Generator", self.name)
    }

    pub fn subscribed(&self, user: &UserId, duration_secs: u64) -> CreateEmbed {
        self.embed("🎉 New Premium Subscriber! 🎉", &self.generator_footer())
            .description(format!(
                "✨ {} just got **premium**!\nSubscribed for **{}** 🎊",
                mention(user),
                duration_text(duration_secs)
            ))
            .image(CELEBRATION_GIF)
    }

    pub fn cooldown(&self, remaining_secs: i64) -> CreateEmbed {
        self.embed("⏱ Cooldown", &self.generator_footer())
            .colour(ALERT_COLOUR)
            .description(format!(
                "You need to wait **{remaining_secs} seconds** before generating again!"
            ))
    }

    /// Direct message carrying the dispensed item.
    pub fn item_dm(&self, item: &str) -> CreateEmbed {
        self.embed(format!("✨ Your {} Item", self.name), &self.generator_footer())
            .description(format!("Here's your item:\n```{item}```"))
    }

    pub fn expired_dm(&self) -> CreateEmbed {
        self.embed("💔 Subscription Expired", &self.generator_footer())
            .colour(ALERT_COLOUR)
            .description("Your premium subscription has expired.")
    }

    pub fn generated(&self, user: &UserId) -> CreateEmbed {
        self.embed("🎉 Item Generated! 🎉", &self.generator_footer())
            .description(format!("{} just generated an item! 🤩", mention(user)))
    }

    pub fn stock_added(&self, count: usize) -> CreateEmbed {
        self.embed("🎉 Stock Added! 🎉", &self.generator_footer())
            .description(format!(
                "Stock has been added, you're welcome! 🤩\n**{count} new items** now available! 🎆🎊"
            ))
            .image(CELEBRATION_GIF)
    }

    pub fn stock_cleared(&self, removed: usize) -> CreateEmbed {
        self.embed("🗑️ Stock Cleared!", &self.generator_footer())
            .colour(ALERT_COLOUR)
            .description(format!(
                "All stock has been removed!\n\n**{removed} items deleted.**"
            ))
    }

    pub fn leaderboard(&self, board: &Leaderboard) -> CreateEmbed {
        let title = format!("{} {LEADERBOARD_MARKER}", self.name);
        self.embed(format!("📊 {title}"), &title)
            .field("🏆 Top Lifetime Generators", ranking(&board.lifetime_top), true)
            .field("🏆 Top 24h Generators", ranking(&board.window_top), true)
    }

    pub fn stats(&self, report: &Report) -> CreateEmbed {
        self.embed(format!("📊 {} Bot Stats", self.name), &self.generator_footer())
            .field("💎 Total Generated (Lifetime)", report.lifetime_total.to_string(), true)
            .field("💎 Total Generated (24h)", report.window_total.to_string(), true)
            .field("👤 Unique Users (Lifetime)", report.lifetime_unique.to_string(), true)
            .field("👤 Unique Users (24h)", report.window_unique.to_string(), true)
            .field("⏱ Average/hour (Lifetime)", format!("{:.2}", report.lifetime_rate), true)
            .field("⏱ Average/hour (24h)", format!("{:.2}", report.window_rate), true)
            .field("📦 Stock Remaining", report.stock_remaining.to_string(), true)
            .field("🏆 Top Generators (Lifetime)", ranking(&report.lifetime_top), true)
            .field("🏆 Top Generators (24h)", ranking(&report.window_top), true)
            .field(
                "💫 Most Active Premium User",
                most_active(report.most_active_premium.as_ref()),
                true,
            )
    }
}

pub fn mention(user: &UserId) -> String {
    format!("<@{user}>")
}

/// `Nd Nh Nm Ns`, leaving out zero units.
pub fn duration_text(secs: u64) -> String {
    let parts = [
        (secs / 86_400, "d"),
        ((secs % 86_400) / 3_600, "h"),
        ((secs % 3_600) / 60, "m"),
        (secs % 60, "s"),
    ];

    let text: Vec<String> = parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if text.is_empty() {
        "0s".to_string()
    } else {
        text.join(" ")
    }
}

/// Numbered `1. <@id> (n)` lines, or "N/A" when empty.
pub fn ranking(entries: &[(UserId, u64)]) -> String {
    if entries.is_empty() {
        return "N/A".to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, (user, count))| format!("{}. {} ({count})", i + 1, mention(user)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn most_active(entry: Option<&(UserId, u64)>) -> String {
    match entry {
        Some((user, count)) => format!("{} ({count} generated)", mention(user)),
        None => "N/A".to_string(),
    }
}
