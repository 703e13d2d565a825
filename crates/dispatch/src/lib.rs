//! Command dispatch core.
//!
//! Flow: raw line → [`Invocation`] (tokenize) → [`AliasTable`] lookup →
//! first alternative whose access, arity and feature gates pass →
//! [`TargetResolver`] → single handler call or [`fanout`] across targets →
//! reply text. [`Dispatcher::execute`] wraps all of it in the
//! [`FailureReporter`] boundary so nothing escapes to the host.

pub mod alias;
pub mod engine;
pub mod error;
pub mod failure;
pub mod fanout;
pub mod handler;
pub mod invocation;
pub mod options;
pub mod target;

pub use {
    alias::{
        AliasTable, Arity, CommandAlternative, CommandFamily, NameSource, RouteFlags, Shape,
        TargetForm,
    },
    engine::{DispatchOutcome, DispatchRequest, Dispatcher},
    error::{Error, Result},
    failure::{Diagnostic, DiagnosticSink, Failure, FailureReporter, TracingSink},
    handler::{CommandContext, CommandHandler},
    invocation::{Invocation, Params},
    options::DispatchOptions,
    target::{TargetResolver, TargetSet},
};
