//! Presence (status and activity) shown by the bot.

use poise::serenity_prelude::{ActivityData, OnlineStatus};
use tracing::warn;

/// Parses a configured status; `offline` is shown as invisible and unknown
/// values as online.
#[must_use]
pub fn parse_status(raw: &str) -> OnlineStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "online" => OnlineStatus::Online,
        "idle" => OnlineStatus::Idle,
        "dnd" | "donotdisturb" | "do_not_disturb" => OnlineStatus::DoNotDisturb,
        "invisible" | "offline" => OnlineStatus::Invisible,
        other => {
            warn!(status = other, "Unknown status, using online");
            OnlineStatus::Online
        }
    }
}

/// Parses an activity such as `Playing chess`, `Listening to music`,
/// `Watching the server` or `Streaming code`.
///
/// Text without a known verb yields `None`, as does streaming without a
/// valid stream URL.
#[must_use]
pub fn parse_activity(raw: &str, url: Option<&str>) -> Option<ActivityData> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (verb, rest) = raw.split_once(' ').unwrap_or((raw, ""));
    let rest = rest.trim();
    let activity = match verb.to_ascii_lowercase().as_str() {
        "playing" if !rest.is_empty() => ActivityData::playing(rest),
        "watching" if !rest.is_empty() => ActivityData::watching(rest),
        "listening" => {
            let name = if rest.eq_ignore_ascii_case("to") {
                ""
            } else {
                rest.strip_prefix("to ").unwrap_or(rest).trim()
            };
            if name.is_empty() {
                return None;
            }
            ActivityData::listening(name)
        }
        "streaming" if !rest.is_empty() => {
            let Some(url) = url else {
                warn!(activity = raw, "Streaming activity without activity_url, skipping");
                return None;
            };
            match ActivityData::streaming(rest, url) {
                Ok(activity) => activity,
                Err(e) => {
                    warn!(activity = raw, error = %e, "Invalid stream URL, skipping activity");
                    return None;
                }
            }
        }
        _ => {
            warn!(activity = raw, "Unrecognized activity, skipping");
            return None;
        }
    };
    Some(activity)
}
