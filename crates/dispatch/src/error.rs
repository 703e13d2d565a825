use crate::alias::Shape;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("empty command line")]
    EmptyMessage,

    #[error("{verb} is already registered as a {shape} command")]
    DuplicateVerb { verb: String, shape: Shape },

    #[error("command family has no names")]
    UnnamedFamily,

    #[error("missing argument #{index}")]
    MissingArgument { index: usize },

    #[error("invalid argument {value:?}: {reason}")]
    InvalidArgument { value: String, reason: String },
}

impl Error {
    #[must_use]
    pub fn invalid_argument(value: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidArgument {
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Short, stable category name used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "empty_message",
            Self::DuplicateVerb { .. } => "duplicate_verb",
            Self::UnnamedFamily => "unnamed_family",
            Self::MissingArgument { .. } => "missing_argument",
            Self::InvalidArgument { .. } => "invalid_argument",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
