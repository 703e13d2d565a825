use std::collections::HashSet;

use {
    fleet_accounts::BotManager,
    fleet_common::{BotHandle, format_static_response},
    tracing::debug,
};

/// The accounts an invocation resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSet {
    /// No name list was given: act on the origin account.
    Single(BotHandle),
    /// Every account matched by the name list, deduplicated, in the order
    /// the names were given.
    Resolved(Vec<BotHandle>),
    /// The name list matched nothing. Carries the list as typed.
    NotFound(String),
}

impl TargetSet {
    pub fn handles(&self) -> &[BotHandle] {
        match self {
            Self::Single(bot) => std::slice::from_ref(bot),
            Self::Resolved(bots) => bots,
            Self::NotFound(_) => &[],
        }
    }

    /// The uniform "not found" reply.
    pub fn not_found_message(tag: &str, names: &str) -> String {
        format_static_response(tag, format!("Bot(s) not found: {names}"))
    }
}

/// Turns a delimiter-separated name list into account handles.
pub struct TargetResolver<'a> {
    bots: &'a dyn BotManager,
    delimiter: char,
}

impl<'a> TargetResolver<'a> {
    pub fn new(bots: &'a dyn BotManager, delimiter: char) -> Self {
        Self { bots, delimiter }
    }

    pub fn resolve(&self, names: Option<&str>, origin: &BotHandle) -> TargetSet {
        let Some(names) = names.map(str::trim).filter(|n| !n.is_empty()) else {
            return TargetSet::Single(origin.clone());
        };

        let mut seen_names = HashSet::new();
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for name in names
            .split(self.delimiter)
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            if !seen_names.insert(name.to_lowercase()) {
                continue;
            }
            for handle in self.bots.identify(name) {
                if seen.insert(handle.clone()) {
                    resolved.push(handle);
                }
            }
        }

        if resolved.is_empty() {
            debug!(names, "no accounts matched");
            TargetSet::NotFound(names.to_string())
        } else {
            TargetSet::Resolved(resolved)
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, fleet_accounts::BotRegistry};

    fn registry() -> BotRegistry {
        let r = BotRegistry::new();
        for name in ["alpha", "beta", "gamma"] {
            r.add(name, &[], true).unwrap();
        }
        r.add("delta", &["d".into()], true).unwrap();
        r
    }

    fn names(set: &TargetSet) -> Vec<&str> {
        set.handles().iter().map(BotHandle::name).collect()
    }

    #[test]
    fn absent_or_blank_list_targets_origin() {
        let r = registry();
        let resolver = TargetResolver::new(&r, ',');
        let origin = BotHandle::new("alpha");
        assert_eq!(resolver.resolve(None, &origin), TargetSet::Single(origin.clone()));
        assert_eq!(resolver.resolve(Some("  "), &origin), TargetSet::Single(origin));
    }

    #[test]
    fn dedupes_and_keeps_order() {
        let r = registry();
        let resolver = TargetResolver::new(&r, ',');
        let set = resolver.resolve(Some("gamma, ALPHA,,alpha,delta,d"), &BotHandle::new("beta"));
        assert_eq!(names(&set), vec!["gamma", "alpha", "delta"]);
    }

    #[test]
    fn expands_groups_and_skips_unknown_names() {
        let r = registry();
        let resolver = TargetResolver::new(&r, ',');
        let set = resolver.resolve(Some("ghost,ALL"), &BotHandle::new("beta"));
        assert_eq!(names(&set), vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn nothing_matched_keeps_list_verbatim() {
        let r = registry();
        let resolver = TargetResolver::new(&r, ',');
        let set = resolver.resolve(Some("ghost,phantom"), &BotHandle::new("beta"));
        assert_eq!(set, TargetSet::NotFound("ghost,phantom".into()));
        assert!(set.handles().is_empty());
        assert_eq!(
            TargetSet::not_found_message("fleet", "ghost,phantom"),
            "<fleet> Bot(s) not found: ghost,phantom"
        );
    }

    #[test]
    fn custom_delimiter() {
        let r = registry();
        let resolver = TargetResolver::new(&r, ';');
        let set = resolver.resolve(Some("beta;gamma"), &BotHandle::new("alpha"));
        assert_eq!(names(&set), vec!["beta", "gamma"]);
    }
}
