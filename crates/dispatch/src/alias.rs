//! The routing table: verb → ordered guard alternatives → handler.

use std::{collections::HashMap, fmt, sync::Arc};

use {fleet_common::AccessLevel, tracing::debug};

use crate::{
    error::{Error, Result},
    handler::CommandHandler,
    invocation::Invocation,
};

// ── Shape ───────────────────────────────────────────────────────────────────

/// Which of the two tables a line is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    /// Verb only.
    Bare,
    /// Verb plus at least one argument.
    WithArgs,
}

impl Shape {
    pub const ALL: &'static [Shape] = &[Self::Bare, Self::WithArgs];

    pub fn of(token_count: usize) -> Self {
        if token_count <= 1 {
            Self::Bare
        } else {
            Self::WithArgs
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bare => "bare",
            Self::WithArgs => "with-args",
        })
    }
}

// ── Guards ──────────────────────────────────────────────────────────────────

/// Token-count guard. Counts include the verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arity {
    #[default]
    Any,
    AtLeast(usize),
    Exactly(usize),
}

impl Arity {
    pub fn accepts(self, token_count: usize) -> bool {
        match self {
            Self::Any => true,
            Self::AtLeast(n) => token_count >= n,
            Self::Exactly(n) => token_count == n,
        }
    }
}

/// Where the target-name list comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// A single token.
    Token(usize),
    /// Tokens from the index onward, joined with the name delimiter.
    JoinedFrom(usize),
    /// Raw text from the index onward.
    TailFrom(usize),
}

impl NameSource {
    /// Extract the name list; `None` when the source is empty.
    pub fn extract(self, invocation: &Invocation, delimiter: char) -> Option<String> {
        let text = match self {
            Self::Token(i) => invocation.token(i)?.to_string(),
            Self::JoinedFrom(i) => invocation.joined(i, delimiter.encode_utf8(&mut [0; 4])),
            Self::TailFrom(i) => invocation.tail(i).to_string(),
        };
        (!text.is_empty()).then_some(text)
    }

    fn params_start(self, token_count: usize) -> usize {
        match self {
            Self::Token(i) => i + 1,
            Self::JoinedFrom(_) | Self::TailFrom(_) => token_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetForm {
    /// Act on the account that received the command.
    #[default]
    Origin,
    /// Act on the named accounts.
    Named(NameSource),
}

impl TargetForm {
    /// Index of the first handler parameter.
    pub fn params_start(self, token_count: usize) -> usize {
        match self {
            Self::Origin => 1,
            Self::Named(source) => source.params_start(token_count),
        }
    }
}

/// Runtime switches consulted during selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteFlags {
    pub dev_features: bool,
}

// ── CommandAlternative ──────────────────────────────────────────────────────

/// One guarded way of running a verb.
#[derive(Clone)]
pub struct CommandAlternative {
    pub required: AccessLevel,
    pub arity: Arity,
    /// Higher values are tried first. Ties keep registration order.
    pub priority: i32,
    pub dev_only: bool,
    pub target: TargetForm,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandAlternative {
    /// Priority for alternatives that take an explicit target list, so they
    /// shadow the origin-targeted form when enough tokens are present.
    pub const EXPLICIT_TARGETS: i32 = 10;

    pub fn new(required: AccessLevel, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            required,
            arity: Arity::Any,
            priority: 0,
            dev_only: false,
            target: TargetForm::Origin,
            handler,
        }
    }

    /// Act on the accounts named by `source`, ahead of origin-targeted forms.
    pub fn targets(mut self, source: NameSource) -> Self {
        self.target = TargetForm::Named(source);
        self.priority = self.priority.max(Self::EXPLICIT_TARGETS);
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    pub fn at_least(self, tokens: usize) -> Self {
        self.arity(Arity::AtLeast(tokens))
    }

    pub fn exactly(self, tokens: usize) -> Self {
        self.arity(Arity::Exactly(tokens))
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Only selectable while the dev-features flag is on.
    pub fn dev_only(mut self) -> Self {
        self.dev_only = true;
        self
    }

    pub fn admits(&self, token_count: usize, access: AccessLevel, flags: RouteFlags) -> bool {
        (!self.dev_only || flags.dev_features)
            && access.permits(self.required)
            && self.arity.accepts(token_count)
    }

    /// Visible to `access` at all, ignoring arity.
    pub fn visible_to(&self, access: AccessLevel, flags: RouteFlags) -> bool {
        (!self.dev_only || flags.dev_features) && access.permits(self.required)
    }
}

impl fmt::Debug for CommandAlternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandAlternative")
            .field("required", &self.required)
            .field("arity", &self.arity)
            .field("priority", &self.priority)
            .field("dev_only", &self.dev_only)
            .field("target", &self.target)
            .field("handler", &self.handler.name())
            .finish()
    }
}

// ── CommandFamily ───────────────────────────────────────────────────────────

/// A verb, its aliases, and the alternatives they all share.
#[derive(Debug, Clone)]
pub struct CommandFamily {
    names: Vec<String>,
    usage: String,
    summary: String,
    alternatives: Vec<CommandAlternative>,
}

impl CommandFamily {
    /// `names[0]` is the primary verb, the rest are aliases.
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_uppercase()).collect(),
            usage: String::new(),
            summary: String::new(),
            alternatives: Vec::new(),
        }
    }

    pub fn describe(mut self, usage: impl Into<String>, summary: impl Into<String>) -> Self {
        self.usage = usage.into();
        self.summary = summary.into();
        self
    }

    pub fn alternative(mut self, alternative: CommandAlternative) -> Self {
        self.alternatives.push(alternative);
        self
    }

    pub fn primary(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn alternatives(&self) -> &[CommandAlternative] {
        &self.alternatives
    }

    pub fn visible_to(&self, access: AccessLevel, flags: RouteFlags) -> bool {
        self.alternatives.iter().any(|a| a.visible_to(access, flags))
    }
}

// ── AliasTable ──────────────────────────────────────────────────────────────

/// Both verb tables. Built once at startup, read-only afterwards.
#[derive(Debug, Default)]
pub struct AliasTable {
    families: Vec<(Shape, Arc<CommandFamily>)>,
    index: HashMap<(Shape, String), Arc<CommandFamily>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a family under `shape`.
    ///
    /// Alternatives are sorted by priority (descending); ties keep the order
    /// they were added in. Every name must be free in that shape's table.
    pub fn register(&mut self, shape: Shape, mut family: CommandFamily) -> Result<()> {
        if family.names.is_empty() {
            return Err(Error::UnnamedFamily);
        }
        if let Some(taken) = family
            .names
            .iter()
            .find(|name| self.index.contains_key(&(shape, (*name).clone())))
        {
            return Err(Error::DuplicateVerb {
                verb: taken.clone(),
                shape,
            });
        }

        family
            .alternatives
            .sort_by_key(|a| std::cmp::Reverse(a.priority));
        let family = Arc::new(family);
        for name in &family.names {
            self.index.insert((shape, name.clone()), Arc::clone(&family));
        }
        debug!(
            verb = family.primary(),
            %shape,
            aliases = family.names.len() - 1,
            "registered command"
        );
        self.families.push((shape, family));
        Ok(())
    }

    pub fn family(&self, shape: Shape, verb: &str) -> Option<&CommandFamily> {
        self.index
            .get(&(shape, verb.to_uppercase()))
            .map(Arc::as_ref)
    }

    /// Alternatives for `verb` in priority order. Empty when unknown.
    pub fn lookup(&self, shape: Shape, verb: &str) -> &[CommandAlternative] {
        self.family(shape, verb)
            .map(CommandFamily::alternatives)
            .unwrap_or_default()
    }

    /// First alternative whose guards all pass.
    pub fn select(
        &self,
        verb: &str,
        token_count: usize,
        access: AccessLevel,
        flags: RouteFlags,
    ) -> Option<&CommandAlternative> {
        self.lookup(Shape::of(token_count), verb)
            .iter()
            .find(|a| a.admits(token_count, access, flags))
    }

    /// Families in registration order.
    pub fn families(&self) -> impl Iterator<Item = (Shape, &CommandFamily)> {
        self.families.iter().map(|(shape, f)| (*shape, f.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::handler::CommandContext,
        async_trait::async_trait,
        rstest::rstest,
    };

    struct Named(&'static str);

    #[async_trait]
    impl CommandHandler for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn handle(&self, _ctx: &CommandContext<'_>) -> anyhow::Result<Option<String>> {
            Ok(Some(self.0.to_string()))
        }
    }

    fn alt(required: AccessLevel, name: &'static str) -> CommandAlternative {
        CommandAlternative::new(required, Arc::new(Named(name)))
    }

    fn table() -> AliasTable {
        let mut table = AliasTable::new();
        table
            .register(
                Shape::WithArgs,
                CommandFamily::new(&["addwishlist", "aw"])
                    .alternative(alt(AccessLevel::Master, "own").exactly(2))
                    .alternative(
                        alt(AccessLevel::Master, "targeted")
                            .at_least(3)
                            .targets(NameSource::Token(1)),
                    ),
            )
            .unwrap();
        table
            .register(
                Shape::Bare,
                CommandFamily::new(&["COOKIES"])
                    .alternative(alt(AccessLevel::Owner, "cookies").dev_only()),
            )
            .unwrap();
        table
    }

    fn selected<'t>(
        table: &'t AliasTable,
        verb: &str,
        tokens: usize,
        access: AccessLevel,
    ) -> Option<&'t str> {
        table
            .select(verb, tokens, access, RouteFlags::default())
            .map(|a| a.handler.name())
    }

    #[rstest]
    #[case(0, Shape::Bare)]
    #[case(1, Shape::Bare)]
    #[case(2, Shape::WithArgs)]
    fn shape_from_token_count(#[case] tokens: usize, #[case] want: Shape) {
        assert_eq!(Shape::of(tokens), want);
    }

    #[test]
    fn explicit_target_form_is_tried_first() {
        let t = table();
        let alts = t.lookup(Shape::WithArgs, "AW");
        assert_eq!(alts[0].handler.name(), "targeted");
        assert_eq!(selected(&t, "aw", 3, AccessLevel::Master), Some("targeted"));
        assert_eq!(selected(&t, "AddWishlist", 2, AccessLevel::Owner), Some("own"));
    }

    #[test]
    fn guards_filter_alternatives() {
        let t = table();
        assert_eq!(selected(&t, "aw", 2, AccessLevel::Operator), None);
        assert_eq!(selected(&t, "aw", 1, AccessLevel::Owner), None);
        assert_eq!(selected(&t, "nope", 2, AccessLevel::Owner), None);
    }

    #[test]
    fn dev_only_needs_flag() {
        let t = table();
        assert_eq!(selected(&t, "cookies", 1, AccessLevel::Owner), None);
        let on = RouteFlags { dev_features: true };
        assert_eq!(
            t.select("cookies", 1, AccessLevel::Owner, on)
                .map(|a| a.handler.name()),
            Some("cookies")
        );
    }

    #[test]
    fn duplicate_verbs_rejected_per_shape() {
        let mut t = table();
        let err = t
            .register(
                Shape::WithArgs,
                CommandFamily::new(&["WISHLIST", "AW"]).alternative(alt(AccessLevel::Owner, "x")),
            )
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateVerb { ref verb, .. } if verb == "AW"));

        // Same verb in the other shape is fine.
        t.register(
            Shape::Bare,
            CommandFamily::new(&["AW"]).alternative(alt(AccessLevel::Owner, "bare")),
        )
        .unwrap();
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn unnamed_family_rejected() {
        let mut t = AliasTable::new();
        assert!(matches!(
            t.register(Shape::Bare, CommandFamily::new(&[])),
            Err(Error::UnnamedFamily)
        ));
    }
}
