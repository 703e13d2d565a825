use std::{collections::HashSet, sync::LazyLock};

use {
    async_trait::async_trait,
    fleet_dispatch::{CommandContext, CommandHandler},
    regex::Regex,
};

static KEY_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)\b[0-9A-Z]{5}(?:-[0-9A-Z]{5}){2,4}\b"));

/// Product keys (`XXXXX-XXXXX-XXXXX`, up to five groups) found in `text`,
/// uppercased, first occurrence order, no duplicates.
pub fn extract_keys(text: &str) -> anyhow::Result<Vec<String>> {
    let pattern = KEY_PATTERN.as_ref().map_err(Clone::clone)?;
    let mut seen = HashSet::new();
    Ok(pattern
        .find_iter(text)
        .map(|m| m.as_str().to_uppercase())
        .filter(|key| seen.insert(key.clone()))
        .collect())
}

/// `KEY <text>`: pull every product key out of pasted text.
pub struct ExtractKeys;

#[async_trait]
impl CommandHandler for ExtractKeys {
    fn name(&self) -> &str {
        "extract_keys"
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> anyhow::Result<Option<String>> {
        let keys = extract_keys(ctx.params.tail(0))?;
        if keys.is_empty() {
            return Ok(ctx.static_reply("No keys found"));
        }
        Ok(ctx.static_reply(keys.join("\n")))
    }
}
