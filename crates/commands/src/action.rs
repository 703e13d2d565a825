use std::{fmt, sync::Arc};

use {
    async_trait::async_trait,
    fleet_common::{AccessLevel, BotHandle},
    fleet_dispatch::{CommandContext, CommandHandler},
};

/// Remote account features. The host performs them; the catalog only
/// decides which one runs, on which accounts, with which arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Event,
    EventTheme,
    PurchaseHistory,
    FreeLicenses,
    Licenses,
    RemoveDemos,
    RemoveLicenses,
    Cart,
    CartCountries,
    CartReset,
    AddCart,
    SetCountry,
    Purchase,
    PurchaseGift,
    JoinGroup,
    LeaveGroup,
    GroupList,
    FriendCode,
    SteamId,
    Profile,
    ProfileLink,
    AppDetail,
    Search,
    Subscriptions,
    DeleteReview,
    PublishReview,
    AddWishlist,
    RemoveWishlist,
    LatestVersion,
    Update,
    Cookies,
    ApiKey,
    AccessToken,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Self::Event,
        Self::EventTheme,
        Self::PurchaseHistory,
        Self::FreeLicenses,
        Self::Licenses,
        Self::RemoveDemos,
        Self::RemoveLicenses,
        Self::Cart,
        Self::CartCountries,
        Self::CartReset,
        Self::AddCart,
        Self::SetCountry,
        Self::Purchase,
        Self::PurchaseGift,
        Self::JoinGroup,
        Self::LeaveGroup,
        Self::GroupList,
        Self::FriendCode,
        Self::SteamId,
        Self::Profile,
        Self::ProfileLink,
        Self::AppDetail,
        Self::Search,
        Self::Subscriptions,
        Self::DeleteReview,
        Self::PublishReview,
        Self::AddWishlist,
        Self::RemoveWishlist,
        Self::LatestVersion,
        Self::Update,
        Self::Cookies,
        Self::ApiKey,
        Self::AccessToken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::EventTheme => "event_theme",
            Self::PurchaseHistory => "purchase_history",
            Self::FreeLicenses => "free_licenses",
            Self::Licenses => "licenses",
            Self::RemoveDemos => "remove_demos",
            Self::RemoveLicenses => "remove_licenses",
            Self::Cart => "cart",
            Self::CartCountries => "cart_countries",
            Self::CartReset => "cart_reset",
            Self::AddCart => "add_cart",
            Self::SetCountry => "set_country",
            Self::Purchase => "purchase",
            Self::PurchaseGift => "purchase_gift",
            Self::JoinGroup => "join_group",
            Self::LeaveGroup => "leave_group",
            Self::GroupList => "group_list",
            Self::FriendCode => "friend_code",
            Self::SteamId => "steam_id",
            Self::Profile => "profile",
            Self::ProfileLink => "profile_link",
            Self::AppDetail => "app_detail",
            Self::Search => "search",
            Self::Subscriptions => "subscriptions",
            Self::DeleteReview => "delete_review",
            Self::PublishReview => "publish_review",
            Self::AddWishlist => "add_wishlist",
            Self::RemoveWishlist => "remove_wishlist",
            Self::LatestVersion => "latest_version",
            Self::Update => "update",
            Self::Cookies => "cookies",
            Self::ApiKey => "api_key",
            Self::AccessToken => "access_token",
        }
    }

    /// Account-bound actions need a live session; the self-update checks
    /// do not touch any account.
    pub fn requires_connection(&self) -> bool {
        !matches!(self, Self::LatestVersion | Self::Update)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a routed alternative turns its parameters into action arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgStyle {
    /// No arguments.
    #[default]
    None,
    /// The first `n` parameters, one argument each.
    Tokens(usize),
    /// All parameters joined with `,` as a single argument.
    List,
    /// The raw remainder of the line as a single argument.
    Text,
    /// The first `n` parameters, then the rest joined with `,`.
    TokensThenList(usize),
}

impl ArgStyle {
    pub fn extract(self, ctx: &CommandContext<'_>) -> anyhow::Result<Vec<String>> {
        let params = &ctx.params;
        let leading = |n: usize| -> anyhow::Result<Vec<String>> {
            (0..n)
                .map(|i| -> anyhow::Result<String> { Ok(params.require(i)?.to_string()) })
                .collect()
        };
        Ok(match self {
            Self::None => Vec::new(),
            Self::Tokens(n) => leading(n)?,
            Self::List => vec![params.joined(0, ",")],
            Self::Text => vec![params.tail(0).to_string()],
            Self::TokensThenList(n) => {
                let mut args = leading(n)?;
                args.push(params.joined(n, ","));
                args
            },
        })
    }
}

/// One action to perform on one account.
#[derive(Debug, Clone)]
pub struct ActionRequest<'a> {
    pub action: Action,
    pub bot: &'a BotHandle,
    pub access: AccessLevel,
    pub args: Vec<String>,
}

/// Performs remote actions. Provided by the host.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn perform(&self, request: ActionRequest<'_>) -> anyhow::Result<Option<String>>;
}

/// Adapts an [`Action`] to the dispatcher's [`CommandHandler`] seam.
pub struct ActionCommand {
    action: Action,
    args: ArgStyle,
    actions: Arc<dyn ActionHandler>,
}

impl ActionCommand {
    pub fn new(action: Action, args: ArgStyle, actions: Arc<dyn ActionHandler>) -> Self {
        Self {
            action,
            args,
            actions,
        }
    }
}

#[async_trait]
impl CommandHandler for ActionCommand {
    fn name(&self) -> &str {
        self.action.as_str()
    }

    fn requires_connection(&self) -> bool {
        self.action.requires_connection()
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> anyhow::Result<Option<String>> {
        let request = ActionRequest {
            action: self.action,
            bot: ctx.bot,
            access: ctx.access(),
            args: self.args.extract(ctx)?,
        };
        self.actions.perform(request).await
    }
}
