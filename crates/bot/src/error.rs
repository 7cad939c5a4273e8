use ledger::LedgerError;
use poise::serenity_prelude as serenity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Caller lacks the admin role. Safe to show.
    #[error("permission denied")]
    PermissionDenied,
    /// Refusals are shown to the user; persistence and platform failures are
    /// reported like internal errors.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Internal errors: logged, never shown.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<serenity::Error> for BotError {
    fn from(err: serenity::Error) -> Self {
        Self::Internal(err.into())
    }
}

/// What the caller gets to see. Always sent ephemerally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorReply {
    Text(String),
    Cooldown { remaining_secs: i64 },
}

impl BotError {
    /// Failures the user can't act on.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::Ledger(LedgerError::Persistence(_) | LedgerError::External(_))
        )
    }

    pub fn user_reply(&self, command: &str) -> ErrorReply {
        match self {
            Self::PermissionDenied => ErrorReply::Text("No permission.".to_string()),
            Self::Ledger(LedgerError::RateLimited { remaining_secs }) => ErrorReply::Cooldown {
                remaining_secs: *remaining_secs,
            },
            Self::Ledger(LedgerError::NotEntitled) => {
                ErrorReply::Text("❌ You must be subscribed to generate!".to_string())
            }
            Self::Ledger(LedgerError::OutOfStock) => {
                ErrorReply::Text("No stock available!".to_string())
            }
            _ => ErrorReply::Text(failure_text(command).to_string()),
        }
    }

    /// Log internal failures and send them to Sentry.
    pub fn report(&self, command: &str) {
        match self {
            Self::Internal(err) => {
                tracing::error!(command, "internal error: {:?}", err);
                sentry::capture_error(
                    err.as_ref() as &(dyn std::error::Error + Send + Sync + 'static)
                );
            }
            Self::Ledger(err) if self.is_internal() => {
                tracing::error!(command, error = %err, "ledger operation failed");
                sentry::capture_error(err);
            }
            _ => tracing::debug!(command, reason = %self, "command refused"),
        }
    }
}

fn failure_text(command: &str) -> &'static str {
    match command {
        "subscribe" => "❌ Something went wrong with subscribing!",
        "stock" => "❌ Failed to add stock!",
        _ => "❌ Something went wrong!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger::StoreError;

    fn text(reply: ErrorReply) -> String {
        match reply {
            ErrorReply::Text(text) => text,
            other => panic!("expected text reply, got {other:?}"),
        }
    }

    #[test]
    fn permission_denied_is_plain_refusal() {
        let err = BotError::PermissionDenied;

        assert_eq!(text(err.user_reply("stats")), "No permission.");
        assert!(!err.is_internal());
    }

    #[test]
    fn rate_limited_maps_to_cooldown_reply() {
        let err = BotError::from(LedgerError::RateLimited { remaining_secs: 12 });

        assert_eq!(
            err.user_reply("gen"),
            ErrorReply::Cooldown { remaining_secs: 12 }
        );
    }

    #[test]
    fn refusals_have_specific_messages() {
        assert_eq!(
            text(BotError::from(LedgerError::NotEntitled).user_reply("gen")),
            "❌ You must be subscribed to generate!"
        );
        assert_eq!(
            text(BotError::from(LedgerError::OutOfStock).user_reply("gen")),
            "No stock available!"
        );
    }

    #[test]
    fn internal_error_hides_sensitive_details() {
        let err = BotError::Internal(anyhow::anyhow!("token=secret123 leaked"));

        let reply = text(err.user_reply("gen"));

        assert!(err.is_internal());
        assert!(!reply.contains("secret123"));
        assert!(!reply.contains("token"));
    }

    #[test]
    fn persistence_failure_is_internal_and_generic() {
        let io_err = std::io::Error::other("disk full");
        let err = BotError::from(LedgerError::Persistence(StoreError::Io(io_err)));

        assert!(err.is_internal());
        assert_eq!(text(err.user_reply("gen")), "❌ Something went wrong!");
    }

    #[test]
    fn generic_failure_text_follows_command() {
        let err = BotError::Internal(anyhow::anyhow!("boom"));

        assert_eq!(
            text(err.user_reply("subscribe")),
            "❌ Something went wrong with subscribing!"
        );
        assert_eq!(text(err.user_reply("stock")), "❌ Failed to add stock!");
    }

    #[test]
    fn serenity_error_converts_to_internal() {
        let err: BotError = serenity::Error::Other("gateway closed").into();

        assert!(matches!(err, BotError::Internal(_)));
    }
}
