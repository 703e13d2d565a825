//! Every verb the bot answers to.
//!
//! Most account features come in two forms: a bare verb acting on the
//! receiving account, and a with-arguments form taking a bot list. Features
//! that also take their own arguments put the bot list first when there
//! are enough tokens for both, and fall back to the receiving account
//! otherwise.

use std::sync::Arc;

use {
    fleet_common::AccessLevel::{self, FamilySharing, Master, Operator, Owner, Public},
    fleet_dispatch::{
        AliasTable, CommandAlternative, CommandFamily, CommandHandler, NameSource, Result, Shape,
    },
    tracing::info,
};

use crate::{
    action::{Action, ActionCommand, ActionHandler, ArgStyle},
    builtin::BuiltinShortcut,
    explorer::ExploreQueue,
    help::{HelpList, HelpUsage},
    keys::ExtractKeys,
    version::OwnVersion,
};

const BOTS: &str = "[Bots]";

struct Catalog {
    table: AliasTable,
    actions: Arc<dyn ActionHandler>,
}

impl Catalog {
    fn action(&self, action: Action, args: ArgStyle) -> Arc<dyn CommandHandler> {
        Arc::new(ActionCommand::new(action, args, Arc::clone(&self.actions)))
    }

    fn add(&mut self, shape: Shape, family: CommandFamily) -> Result<()> {
        self.table.register(shape, family)
    }

    /// Bare form on the receiving account; with-arguments form on a bot
    /// list.
    fn per_bot(
        &mut self,
        names: &[&str],
        bare: AccessLevel,
        listed: AccessLevel,
        handler: Arc<dyn CommandHandler>,
        summary: &str,
    ) -> Result<()> {
        self.add(
            Shape::Bare,
            CommandFamily::new(names)
                .describe(BOTS, summary)
                .alternative(CommandAlternative::new(bare, Arc::clone(&handler))),
        )?;
        self.add(
            Shape::WithArgs,
            CommandFamily::new(names)
                .describe(BOTS, summary)
                .alternative(
                    CommandAlternative::new(listed, handler).targets(NameSource::JoinedFrom(1)),
                ),
        )
    }

    fn per_bot_action(
        &mut self,
        names: &[&str],
        access: AccessLevel,
        action: Action,
        summary: &str,
    ) -> Result<()> {
        let handler = self.action(action, ArgStyle::None);
        self.per_bot(names, access, access, handler, summary)
    }

    /// With-arguments only: `VERB <Bots> <args>` when there are at least
    /// three tokens, `VERB <arg>` on the receiving account otherwise.
    fn targeted(
        &mut self,
        names: &[&str],
        access: AccessLevel,
        action: Action,
        listed_args: ArgStyle,
        usage: &str,
        summary: &str,
    ) -> Result<()> {
        let listed = self.action(action, listed_args);
        let own = self.action(action, ArgStyle::Tokens(1));
        self.add(
            Shape::WithArgs,
            CommandFamily::new(names)
                .describe(usage, summary)
                .alternative(
                    CommandAlternative::new(access, listed)
                        .at_least(3)
                        .targets(NameSource::Token(1)),
                )
                .alternative(CommandAlternative::new(access, own).at_least(2)),
        )
    }

    fn shortcut(
        &mut self,
        shape: Shape,
        name: &str,
        shortcut: BuiltinShortcut,
        usage: &str,
    ) -> Result<()> {
        let summary = format!("Shortcut for {}", shortcut.name());
        self.add(
            shape,
            CommandFamily::new(&[name])
                .describe(usage, summary)
                .alternative(CommandAlternative::new(Public, Arc::new(shortcut))),
        )
    }
}

/// Build the complete alias table, with remote features going to
/// `actions`.
pub fn build_catalog(actions: Arc<dyn ActionHandler>) -> Result<AliasTable> {
    let mut c = Catalog {
        table: AliasTable::new(),
        actions,
    };
    register_events(&mut c)?;
    register_shortcuts(&mut c)?;
    register_account(&mut c)?;
    register_cart(&mut c)?;
    register_community(&mut c)?;
    register_store(&mut c)?;
    register_meta(&mut c)?;
    register_dev(&mut c)?;
    info!(families = c.table.len(), "command catalog built");
    Ok(c.table)
}

fn register_events(c: &mut Catalog) -> Result<()> {
    c.per_bot_action(&["EVENT", "E"], Operator, Action::Event, "Claim sale event rewards")?;
    c.per_bot_action(
        &["EVENTTHEME", "ET"],
        Operator,
        Action::EventTheme,
        "Claim the sale event theme",
    )
}

fn register_shortcuts(c: &mut Catalog) -> Result<()> {
    c.shortcut(Shape::Bare, "P", BuiltinShortcut::fixed("POINTS"), "")?;
    c.shortcut(Shape::Bare, "PA", BuiltinShortcut::fixed("POINTS ASF"), "")?;
    c.shortcut(Shape::Bare, "LA", BuiltinShortcut::fixed("LEVEL ASF"), "")?;
    c.shortcut(Shape::Bare, "BA", BuiltinShortcut::fixed("BALANCE ASF"), "")?;
    c.shortcut(Shape::Bare, "CA", BuiltinShortcut::fixed("CART ASF"), "")?;
    c.shortcut(
        Shape::WithArgs,
        "AL",
        BuiltinShortcut::with_tail("ADDLICENSE"),
        "<Bots> <Licenses>",
    )?;
    c.shortcut(Shape::WithArgs, "P", BuiltinShortcut::with_tail("POINTS"), BOTS)
}

fn register_account(c: &mut Catalog) -> Result<()> {
    let history = c.action(Action::PurchaseHistory, ArgStyle::None);
    c.per_bot(
        &["PURCHASEHISTORY", "PH"],
        Operator,
        Master,
        history,
        "Show purchase history",
    )?;
    c.per_bot_action(
        &["FREELICENSES", "FREELICENSE", "FL"],
        Operator,
        Action::FreeLicenses,
        "List free licenses",
    )?;
    c.per_bot_action(
        &["LICENSES", "LICENSE", "L"],
        Operator,
        Action::Licenses,
        "List all licenses",
    )?;
    c.per_bot_action(
        &["REMOVEDEMOS", "REMOVEDEMO", "RD"],
        Master,
        Action::RemoveDemos,
        "Remove every demo license",
    )?;
    c.targeted(
        &["REMOVELICENSES", "REMOVELICENSE", "RL"],
        Master,
        Action::RemoveLicenses,
        ArgStyle::List,
        "[Bots] <SubIds>",
        "Remove free licenses",
    )
}

fn register_cart(c: &mut Catalog) -> Result<()> {
    c.per_bot_action(&["CART", "C"], Operator, Action::Cart, "Show the cart")?;
    c.per_bot_action(
        &["CARTCOUNTRY", "CC"],
        Operator,
        Action::CartCountries,
        "List countries the cart can be paid in",
    )?;
    c.per_bot_action(&["CARTRESET", "CR"], Operator, Action::CartReset, "Empty the cart")?;
    c.targeted(
        &["ADDCART", "AC"],
        Operator,
        Action::AddCart,
        ArgStyle::List,
        "[Bots] <SubIds|BundleIds>",
        "Add items to the cart",
    )?;
    c.targeted(
        &["SETCOUNTRY", "SC"],
        Master,
        Action::SetCountry,
        ArgStyle::List,
        "[Bots] <CountryCode>",
        "Set the cart country",
    )?;
    c.per_bot_action(&["PURCHASE", "PC"], Master, Action::Purchase, "Buy the cart for yourself")?;

    let gift = c.action(Action::PurchaseGift, ArgStyle::Tokens(1));
    c.add(
        Shape::WithArgs,
        CommandFamily::new(&["PURCHASEGIFT", "PCG"])
            .describe("[BotA] <BotB>", "Buy the cart as a gift for another bot")
            .alternative(
                CommandAlternative::new(Master, Arc::clone(&gift))
                    .exactly(3)
                    .targets(NameSource::Token(1)),
            )
            .alternative(CommandAlternative::new(Master, gift).exactly(2)),
    )
}

fn register_community(c: &mut Catalog) -> Result<()> {
    c.per_bot(
        &["EXPLORER", "EX"],
        Master,
        Master,
        Arc::new(ExploreQueue),
        "Explore the discovery queue",
    )?;
    c.targeted(
        &["JOINGROUP", "JG"],
        Master,
        Action::JoinGroup,
        ArgStyle::Text,
        "[Bots] <GroupName>",
        "Join a community group",
    )?;
    c.targeted(
        &["LEAVEGROUP", "LG"],
        Master,
        Action::LeaveGroup,
        ArgStyle::Text,
        "[Bots] <GroupId>",
        "Leave a community group",
    )?;

    let groups = c.action(Action::GroupList, ArgStyle::None);
    c.add(
        Shape::Bare,
        CommandFamily::new(&["GROUPLIST", "GL"])
            .describe(BOTS, "List joined groups")
            .alternative(CommandAlternative::new(FamilySharing, Arc::clone(&groups))),
    )?;
    c.add(
        Shape::WithArgs,
        CommandFamily::new(&["GROUPLIST", "GL"])
            .describe(BOTS, "List joined groups")
            .alternative(
                CommandAlternative::new(FamilySharing, groups).targets(NameSource::TailFrom(1)),
            ),
    )?;

    c.per_bot_action(
        &["FRIENDCODE", "FC"],
        FamilySharing,
        Action::FriendCode,
        "Show the friend code",
    )?;
    c.per_bot_action(&["STEAMID", "SID"], FamilySharing, Action::SteamId, "Show the account id")?;
    c.per_bot_action(
        &["PROFILE", "PF"],
        FamilySharing,
        Action::Profile,
        "Show the profile summary",
    )?;
    c.per_bot_action(
        &["PROFILELINK", "PFL"],
        FamilySharing,
        Action::ProfileLink,
        "Show the profile link",
    )
}

fn register_store(c: &mut Catalog) -> Result<()> {
    c.targeted(
        &["APPDETAIL", "AD"],
        Operator,
        Action::AppDetail,
        ArgStyle::List,
        "[Bots] <AppIds>",
        "Show store details for apps",
    )?;
    c.targeted(
        &["SEARCH", "SS"],
        Operator,
        Action::Search,
        ArgStyle::List,
        "[Bots] <Keywords>",
        "Search the store",
    )?;
    c.targeted(
        &["SUBS", "S"],
        Operator,
        Action::Subscriptions,
        ArgStyle::List,
        "[Bots] <AppIds>",
        "List purchasable packages for apps",
    )?;
    c.targeted(
        &["DELETERECOMMENT", "DREC"],
        Master,
        Action::DeleteReview,
        ArgStyle::List,
        "[Bots] <AppIds>",
        "Delete reviews",
    )?;

    let publish_listed = c.action(Action::PublishReview, ArgStyle::TokensThenList(1));
    let publish_own = c.action(Action::PublishReview, ArgStyle::Tokens(2));
    c.add(
        Shape::WithArgs,
        CommandFamily::new(&["PUBLISHRECOMMEND", "PREC"])
            .describe("[Bots] <AppIds> <Review>", "Publish a review")
            .alternative(
                CommandAlternative::new(Master, publish_listed)
                    .at_least(4)
                    .targets(NameSource::Token(1)),
            )
            .alternative(CommandAlternative::new(Master, publish_own).exactly(3)),
    )?;

    c.targeted(
        &["ADDWISHLIST", "AW"],
        Master,
        Action::AddWishlist,
        ArgStyle::Text,
        "[Bots] <AppIds>",
        "Add apps to the wishlist",
    )?;
    c.targeted(
        &["REMOVEWISHLIST", "RW"],
        Master,
        Action::RemoveWishlist,
        ArgStyle::Text,
        "[Bots] <AppIds>",
        "Remove apps from the wishlist",
    )
}

fn register_meta(c: &mut Catalog) -> Result<()> {
    c.add(
        Shape::Bare,
        CommandFamily::new(&["ASFEHELP", "EHELP"])
            .describe("", "List available commands")
            .alternative(CommandAlternative::new(Public, Arc::new(HelpList))),
    )?;
    c.add(
        Shape::WithArgs,
        CommandFamily::new(&["EHELP", "HELP"])
            .describe("<Commands>", "Show usage for commands")
            .alternative(CommandAlternative::new(FamilySharing, Arc::new(HelpUsage))),
    )?;
    c.add(
        Shape::WithArgs,
        CommandFamily::new(&["KEY", "K"])
            .describe("<Text>", "Extract product keys from text")
            .alternative(CommandAlternative::new(FamilySharing, Arc::new(ExtractKeys))),
    )?;
    c.add(
        Shape::Bare,
        CommandFamily::new(&["ASFENHANCE", "ASFE"])
            .describe("", "Show the command set version")
            .alternative(CommandAlternative::new(FamilySharing, Arc::new(OwnVersion))),
    )?;

    let latest = c.action(Action::LatestVersion, ArgStyle::None);
    c.add(
        Shape::Bare,
        CommandFamily::new(&["ASFEVERSION", "AV"])
            .describe("", "Check for a newer command set release")
            .alternative(CommandAlternative::new(Operator, latest)),
    )?;
    let update = c.action(Action::Update, ArgStyle::None);
    c.add(
        Shape::Bare,
        CommandFamily::new(&["ASFEUPDATE", "AU"])
            .describe("", "Update the command set")
            .alternative(CommandAlternative::new(Owner, update)),
    )
}

fn register_dev(c: &mut Catalog) -> Result<()> {
    for (name, action, summary) in [
        ("COOKIES", Action::Cookies, "Show session cookies"),
        ("APIKEY", Action::ApiKey, "Show the web API key"),
        ("ACCESSTOKEN", Action::AccessToken, "Show the access token"),
    ] {
        let handler = c.action(action, ArgStyle::None);
        c.add(
            Shape::Bare,
            CommandFamily::new(&[name])
                .describe(BOTS, summary)
                .alternative(CommandAlternative::new(Owner, Arc::clone(&handler)).dev_only()),
        )?;
        c.add(
            Shape::WithArgs,
            CommandFamily::new(&[name])
                .describe(BOTS, summary)
                .alternative(
                    CommandAlternative::new(Owner, handler)
                        .targets(NameSource::JoinedFrom(1))
                        .dev_only(),
                ),
        )?;
    }
    Ok(())
}
