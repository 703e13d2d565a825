use fleet_common::FromMessage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("account already registered: {name}")]
    DuplicateAccount { name: String },

    #[error("unknown account: {name}")]
    UnknownAccount { name: String },

    #[error("{0}")]
    Message(String),
}

impl Error {
    #[must_use]
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateAccount { name: name.into() }
    }

    #[must_use]
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownAccount { name: name.into() }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateAccount { .. } => "duplicate_account",
            Self::UnknownAccount { .. } => "unknown_account",
            Self::Message(_) => "message",
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fleet_common::impl_context!();
