use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Authorization rank of the caller issuing a command.
///
/// Variants are declared lowest to highest; the derived `Ord` is the
/// authorization order, so `caller >= required` is the whole access check.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Public,
    FamilySharing,
    Operator,
    Master,
    Owner,
}

impl AccessLevel {
    /// All variants, lowest first.
    pub const ALL: &'static [AccessLevel] = &[
        Self::Public,
        Self::FamilySharing,
        Self::Operator,
        Self::Master,
        Self::Owner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::FamilySharing => "family_sharing",
            Self::Operator => "operator",
            Self::Master => "master",
            Self::Owner => "owner",
        }
    }

    /// Returns true if a caller at this level may use something that
    /// requires `required`.
    pub fn permits(self, required: AccessLevel) -> bool {
        self >= required
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "public" | "none" => Ok(Self::Public),
            "family_sharing" | "familysharing" | "family" => Ok(Self::FamilySharing),
            "operator" => Ok(Self::Operator),
            "master" => Ok(Self::Master),
            "owner" => Ok(Self::Owner),
            _ => Err(Error::UnknownAccessLevel {
                value: s.to_string(),
            }),
        }
    }
}

/// Handle to a single managed account.
///
/// Cloning is cheap; equality is by exact account name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BotHandle {
    name: Arc<str>,
}

impl BotHandle {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for BotHandle {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[test]
    fn levels_are_totally_ordered() {
        for pair in AccessLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should rank below {}", pair[0], pair[1]);
        }
        assert!(AccessLevel::Owner.permits(AccessLevel::Master));
        assert!(AccessLevel::Operator.permits(AccessLevel::Operator));
        assert!(!AccessLevel::FamilySharing.permits(AccessLevel::Operator));
    }

    #[rstest]
    #[case("owner", AccessLevel::Owner)]
    #[case("Master", AccessLevel::Master)]
    #[case("family-sharing", AccessLevel::FamilySharing)]
    #[case("FamilySharing", AccessLevel::FamilySharing)]
    #[case(" operator ", AccessLevel::Operator)]
    #[case("none", AccessLevel::Public)]
    fn parses_access_levels(#[case] input: &str, #[case] expected: AccessLevel) {
        assert_eq!(input.parse::<AccessLevel>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_access_level() {
        let err = "admin".parse::<AccessLevel>().unwrap_err();
        assert_eq!(err.kind(), "unknown_access_level");
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn access_level_serde_uses_snake_case() {
        let json = serde_json::to_string(&AccessLevel::FamilySharing).unwrap();
        assert_eq!(json, "\"family_sharing\"");
        let back: AccessLevel = serde_json::from_str("\"operator\"").unwrap();
        assert_eq!(back, AccessLevel::Operator);
    }

    #[test]
    fn bot_handles_compare_by_name() {
        let a = BotHandle::new("alpha");
        let b = BotHandle::from("alpha");
        assert_eq!(a, b);
        assert_ne!(a, BotHandle::new("Alpha"));
        assert_eq!(a.to_string(), "alpha");
    }
}
