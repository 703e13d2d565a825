use std::sync::Arc;

use {
    fleet_accounts::BotManager,
    fleet_common::{AccessLevel, BotHandle, format_bot_response},
    tracing::{debug, instrument},
};

use crate::{
    alias::{AliasTable, CommandAlternative, RouteFlags, TargetForm},
    failure::{Diagnostic, DiagnosticSink, FailureReporter},
    fanout,
    handler::CommandContext,
    invocation::{Invocation, Params},
    options::DispatchOptions,
    target::{TargetResolver, TargetSet},
};

const NOT_CONNECTED: &str = "Not connected!";

/// One incoming command line.
#[derive(Debug, Clone)]
pub struct DispatchRequest<'a> {
    /// The account that received the command.
    pub origin: BotHandle,
    pub access: AccessLevel,
    pub message: &'a str,
    pub caller_id: u64,
}

impl<'a> DispatchRequest<'a> {
    pub fn new(origin: BotHandle, access: AccessLevel, message: &'a str) -> Self {
        Self {
            origin,
            access,
            message,
            caller_id: 0,
        }
    }

    pub fn with_caller(mut self, caller_id: u64) -> Self {
        self.caller_id = caller_id;
        self
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Reply(String),
    /// Unrecognized, not permitted, or nothing to say.
    Silent,
    /// Something escaped routing. The diagnostic doubles as the reply.
    Failure(Diagnostic),
}

impl DispatchOutcome {
    pub fn into_reply(self) -> Option<String> {
        match self {
            Self::Reply(text) => Some(text),
            Self::Silent => None,
            Self::Failure(diagnostic) => Some(diagnostic.to_string()),
        }
    }
}

/// Routes command lines to handlers.
///
/// Holds no per-request state; one instance serves concurrent requests.
pub struct Dispatcher {
    table: Arc<AliasTable>,
    bots: Arc<dyn BotManager>,
    options: DispatchOptions,
    reporter: FailureReporter,
}

impl Dispatcher {
    pub fn new(
        table: Arc<AliasTable>,
        bots: Arc<dyn BotManager>,
        options: DispatchOptions,
    ) -> Self {
        let reporter = FailureReporter::new(
            Arc::clone(&bots),
            options.failure_log_delay,
            options.version_marker,
        );
        Self {
            table,
            bots,
            options,
            reporter,
        }
    }

    pub fn with_diagnostic_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.reporter = self.reporter.with_sink(sink);
        self
    }

    pub fn table(&self) -> &AliasTable {
        &self.table
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Reply text for `request`, if any.
    pub async fn dispatch(&self, request: DispatchRequest<'_>) -> Option<String> {
        self.execute(request).await.into_reply()
    }

    /// Route `request` and report how it ended. Never fails.
    #[instrument(skip_all, fields(origin = %request.origin, access = %request.access))]
    pub async fn execute(&self, request: DispatchRequest<'_>) -> DispatchOutcome {
        match self.reporter.guard(self.route(&request)).await {
            Ok(Some(text)) => DispatchOutcome::Reply(text),
            Ok(None) => DispatchOutcome::Silent,
            Err(failure) => DispatchOutcome::Failure(
                self.reporter
                    .report(request.message, request.access, failure)
                    .await,
            ),
        }
    }

    async fn route(&self, request: &DispatchRequest<'_>) -> anyhow::Result<Option<String>> {
        let invocation = Invocation::parse(
            request.message,
            request.access,
            request.origin.clone(),
            request.caller_id,
        )?;
        let flags = RouteFlags {
            dev_features: self.options.dev_features,
        };
        let Some(alternative) = self.table.select(
            invocation.verb(),
            invocation.token_count(),
            invocation.access(),
            flags,
        ) else {
            debug!(
                verb = invocation.verb(),
                tokens = invocation.token_count(),
                "no command matched"
            );
            return Ok(None);
        };

        debug!(
            verb = invocation.verb(),
            handler = alternative.handler.name(),
            "routing command"
        );
        self.run(alternative, &invocation).await
    }

    async fn run(
        &self,
        alternative: &CommandAlternative,
        invocation: &Invocation,
    ) -> anyhow::Result<Option<String>> {
        let names = match alternative.target {
            TargetForm::Origin => None,
            TargetForm::Named(source) => source.extract(invocation, self.options.name_delimiter),
        };
        let params_start = alternative.target.params_start(invocation.token_count());
        let resolver = TargetResolver::new(self.bots.as_ref(), self.options.name_delimiter);

        match resolver.resolve(names.as_deref(), invocation.origin()) {
            TargetSet::NotFound(names) => Ok(Some(TargetSet::not_found_message(
                &self.options.response_tag,
                &names,
            ))),
            TargetSet::Single(bot) => {
                self.run_target(alternative, invocation, &bot, params_start)
                    .await
            },
            TargetSet::Resolved(bots) => Ok(fanout::run_all(&bots, |bot| {
                self.run_target(alternative, invocation, bot, params_start)
            })
            .await),
        }
    }

    async fn run_target(
        &self,
        alternative: &CommandAlternative,
        invocation: &Invocation,
        bot: &BotHandle,
        params_start: usize,
    ) -> anyhow::Result<Option<String>> {
        if alternative.handler.requires_connection() && !self.bots.is_connected(bot) {
            return Ok(Some(format_bot_response(bot, NOT_CONNECTED)));
        }
        let ctx = CommandContext {
            bot,
            invocation,
            params: Params::new(invocation, params_start),
            bots: self.bots.as_ref(),
            table: &self.table,
            options: &self.options,
        };
        alternative.handler.handle(&ctx).await
    }
}
