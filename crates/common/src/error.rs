use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("unknown access level: {value}")]
    UnknownAccessLevel { value: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Stable category name, used as the suffix of `common::<kind>`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::UnknownAccessLevel { .. } => "unknown_access_level",
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Context helpers ─────────────────────────────────────────────────────────

/// Error types that can be built from a rendered message.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Prefix a failure with a label: `"<label>: <cause>"`.
#[doc(hidden)]
pub fn labelled<E: FromMessage>(label: String, cause: impl std::fmt::Display) -> E {
    E::from_message(format!("{label}: {cause}"))
}

/// Declares `Context` for the calling module's `Error`/`Result` pair.
///
/// The module must define `Error: FromMessage` and a one-parameter `Result`
/// alias. `Result` failures become `"<label>: <cause>"`; a `None` becomes
/// the label alone.
///
/// ```ignore
/// fleet_common::impl_context!();
/// ```
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn context(self, label: impl Into<String>) -> Result<T>;
            fn with_context<L: Into<String>>(self, label: impl FnOnce() -> L) -> Result<T>;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, label: impl Into<String>) -> Result<T> {
                self.map_err(|cause| $crate::labelled(label.into(), cause))
            }

            fn with_context<L: Into<String>>(self, label: impl FnOnce() -> L) -> Result<T> {
                self.map_err(|cause| $crate::labelled(label().into(), cause))
            }
        }

        impl<T> Context<T> for Option<T> {
            fn context(self, label: impl Into<String>) -> Result<T> {
                self.with_context(|| label)
            }

            fn with_context<L: Into<String>>(self, label: impl FnOnce() -> L) -> Result<T> {
                self.ok_or_else(|| <Error as $crate::FromMessage>::from_message(label().into()))
            }
        }
    };
}
