//! Reply formatting shared by the dispatcher and command handlers.

use crate::BotHandle;

/// Prefix a reply with the bot it concerns: `<bot> text`.
pub fn format_bot_response(bot: &BotHandle, text: impl AsRef<str>) -> String {
    format!("<{}> {}", bot.name(), text.as_ref())
}

/// Prefix a reply that is not about any single bot: `<tag> text`.
pub fn format_static_response(tag: &str, text: impl AsRef<str>) -> String {
    format!("<{tag}> {}", text.as_ref())
}
