//! Messages the bot sends, with their English fallback text.

#![allow(missing_docs)]

use crate::core::i18n::Term;

pub const PONG: Term = Term::new("ping.pong", "Pong!");
pub const HELP: Term = Term::new(
    "help.text",
    "**Levin**\nInvoke commands with `{prefix}` or by mentioning me.\n\n\
     **Settings**\n\
     • `{prefix}prefix [new prefix]` - shows or changes the prefix of this server.\n\
     • `{prefix}clearprefix` - removes the prefix, leaving only mentions.\n\
     • `{prefix}language [language]` - lists the languages or changes the language.\n\
     • `{prefix}timezone [zone]` - shows or changes the time zone.\n\
     • `{prefix}botmaster list|add|remove` - manages who may change settings.\n\n\
     **Utility**\n\
     • `{prefix}ping` - checks whether I am responsive.\n\
     • `{prefix}help` - shows this message.",
);

pub const INTERNAL_ERROR: Term = Term::new(
    "error.internal",
    "Something went wrong on my side. The error has been reported.",
);
pub const NOT_BOT_MASTER: Term = Term::new(
    "error.not_bot_master",
    "Only bot masters may change this. Administrators always are; see `{prefix}botmaster list` for the others.",
);
pub const GUILD_ONLY: Term = Term::new("error.guild_only", "This command only works in servers.");
pub const COOLDOWN: Term = Term::new(
    "error.cooldown",
    "Slow down! You can use this command again in {seconds} seconds.",
);

pub const PREFIX_SHOW: Term = Term::new(
    "prefix.show",
    "My prefixes here: {prefixes}. Mentioning me always works, too.",
);
pub const PREFIX_SHOW_MENTION_ONLY: Term =
    Term::new("prefix.show_mention_only", "I only respond to mentions here.");
pub const PREFIX_CHANGED: Term = Term::new("prefix.changed", "The prefix is now `{prefix}`.");
pub const PREFIX_CLEARED: Term = Term::new(
    "prefix.cleared",
    "Removed the prefix. I now only respond to mentions here.",
);
pub const PREFIX_INVALID: Term = Term::new(
    "prefix.error.invalid",
    "`{prefix}` is not a valid prefix. A prefix must not be empty or contain whitespace.",
);

pub const LANGUAGE_LIST: Term = Term::new(
    "language.list",
    "The language here is `{language}`. Available languages: {languages}.",
);
pub const LANGUAGE_CHANGED: Term =
    Term::new("language.changed", "From now on I will speak English here.");
pub const LANGUAGE_UNKNOWN: Term = Term::new(
    "language.error.unknown",
    "`{language}` is not a language I know. Use `{invoke}` to list the available languages.",
);

pub const TIME_ZONE_SHOW: Term = Term::new(
    "timezone.show",
    "The time zone here is `{time_zone}`, where it is {time} right now.",
);
pub const TIME_ZONE_CHANGED: Term =
    Term::new("timezone.changed", "The time zone is now `{time_zone}`.");
pub const TIME_ZONE_UNKNOWN: Term = Term::new(
    "timezone.error.unknown",
    "`{time_zone}` is not a known time zone. Use a name like `Europe/Berlin` or `America/New_York`.",
);

pub const BOT_MASTER_LIST: Term = Term::new(
    "botmaster.list",
    "Bot masters here: {masters}. Administrators are always bot masters.",
);
pub const BOT_MASTER_LIST_EMPTY: Term = Term::new(
    "botmaster.list_empty",
    "No bot masters are listed. Administrators are always bot masters.",
);
pub const BOT_MASTER_ADDED: Term = Term::new("botmaster.added", "{target} is now a bot master.");
pub const BOT_MASTER_ALREADY_LISTED: Term =
    Term::new("botmaster.already_listed", "{target} already is a bot master.");
pub const BOT_MASTER_REMOVED: Term =
    Term::new("botmaster.removed", "{target} is no longer a bot master.");
pub const BOT_MASTER_NOT_LISTED: Term =
    Term::new("botmaster.not_listed", "{target} is not a listed bot master.");
pub const BOT_MASTER_MISSING_TARGET: Term =
    Term::new("botmaster.missing_target", "Name a user or a role.");
