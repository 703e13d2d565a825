//! Help rendered straight from the alias table, so it can't drift from
//! what is actually routable.

use std::collections::HashSet;

use {
    async_trait::async_trait,
    fleet_common::AccessLevel,
    fleet_dispatch::{
        AliasTable, CommandContext, CommandFamily, CommandHandler, RouteFlags, Shape,
    },
};

fn render(family: &CommandFamily) -> String {
    let mut line = family.primary().to_string();
    if let [_, aliases @ ..] = family.names()
        && !aliases.is_empty()
    {
        line.push_str(&format!(" ({})", aliases.join(", ")));
    }
    if !family.usage().is_empty() {
        line.push(' ');
        line.push_str(family.usage());
    }
    if !family.summary().is_empty() {
        line.push_str(" - ");
        line.push_str(family.summary());
    }
    line
}

/// One line per command the caller may use, in registration order. A verb
/// registered in both shapes is listed once.
pub fn command_list(table: &AliasTable, access: AccessLevel, flags: RouteFlags) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .families()
        .filter(|(_, family)| family.visible_to(access, flags))
        .filter(|(_, family)| seen.insert(family.primary().to_string()))
        .map(|(_, family)| render(family))
        .collect()
}

/// Usage for one verb or alias, preferring the with-arguments form.
pub fn command_usage(
    table: &AliasTable,
    verb: &str,
    access: AccessLevel,
    flags: RouteFlags,
) -> Option<String> {
    [Shape::WithArgs, Shape::Bare]
        .into_iter()
        .filter_map(|shape| table.family(shape, verb))
        .find(|family| family.visible_to(access, flags))
        .map(render)
}

fn flags(ctx: &CommandContext<'_>) -> RouteFlags {
    RouteFlags {
        dev_features: ctx.options.dev_features,
    }
}

/// `EHELP`: every command the caller may use.
pub struct HelpList;

#[async_trait]
impl CommandHandler for HelpList {
    fn name(&self) -> &str {
        "help_list"
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> anyhow::Result<Option<String>> {
        let lines = command_list(ctx.table, ctx.access(), flags(ctx));
        Ok(ctx.static_reply(format!("Commands:\n{}", lines.join("\n"))))
    }
}

/// `EHELP <verb>...`: usage for each named verb.
pub struct HelpUsage;

#[async_trait]
impl CommandHandler for HelpUsage {
    fn name(&self) -> &str {
        "help_usage"
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> anyhow::Result<Option<String>> {
        let lines: Vec<String> = ctx
            .params
            .iter()
            .map(|verb| {
                command_usage(ctx.table, verb, ctx.access(), flags(ctx))
                    .unwrap_or_else(|| format!("{}: unknown command", verb.to_uppercase()))
            })
            .collect();
        Ok(ctx.static_reply(lines.join("\n")))
    }
}
