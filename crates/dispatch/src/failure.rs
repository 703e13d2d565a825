//! The last-resort boundary around command execution.
//!
//! Anything that escapes routing or a handler (an `Err` or a panic) is
//! turned into a [`Diagnostic`]. The diagnostic is returned to the caller
//! right away and handed to a [`DiagnosticSink`] after a short delay, off
//! the request path: on a tokio task when a runtime is present, otherwise on
//! a short-lived thread.

use std::{
    any::Any,
    backtrace::{Backtrace, BacktraceStatus},
    fmt,
    future::Future,
    panic::AssertUnwindSafe,
    sync::Arc,
    time::Duration,
};

use {
    fleet_accounts::BotManager,
    fleet_common::AccessLevel,
    futures::FutureExt,
    tracing::{debug, error, warn},
};

const UNKNOWN_VERSION: &str = "unknown";

// ── Failure ─────────────────────────────────────────────────────────────────

/// What escaped the guarded call.
#[derive(Debug)]
pub enum Failure {
    Error(anyhow::Error),
    /// The backtrace is taken where the unwind was caught.
    Panic { message: String, backtrace: Backtrace },
}

impl Failure {
    pub fn panic(message: impl Into<String>) -> Self {
        Self::Panic {
            message: message.into(),
            backtrace: Backtrace::force_capture(),
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::panic(message)
    }

    /// Stable category name for the diagnostic header.
    pub fn category(&self) -> String {
        match self {
            Self::Panic { .. } => "panic".into(),
            Self::Error(err) => {
                if let Some(e) = err.downcast_ref::<crate::Error>() {
                    format!("dispatch::{}", e.kind())
                } else if let Some(e) = err.downcast_ref::<fleet_accounts::Error>() {
                    format!("accounts::{}", e.kind())
                } else if let Some(e) = err.downcast_ref::<fleet_common::Error>() {
                    format!("common::{}", e.kind())
                } else if err.downcast_ref::<std::io::Error>().is_some() {
                    "io".into()
                } else {
                    "external".into()
                }
            },
        }
    }

    /// Message plus cause chain.
    pub fn cause(&self) -> String {
        match self {
            Self::Error(err) => format!("{err:#}"),
            Self::Panic { message, .. } => format!("panicked: {message}"),
        }
    }

    /// Stack trace for the diagnostic. An error's own backtrace is used when
    /// `RUST_BACKTRACE` made anyhow capture one; otherwise the current stack
    /// is captured.
    pub fn backtrace(&self) -> String {
        match self {
            Self::Error(err) if err.backtrace().status() == BacktraceStatus::Captured => {
                err.backtrace().to_string()
            },
            Self::Error(_) => Backtrace::force_capture().to_string(),
            Self::Panic { backtrace, .. } => backtrace.to_string(),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::Error(err)
    }
}

// ── Diagnostic ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub access: AccessLevel,
    pub host_version: String,
    pub category: String,
    pub cause: String,
    pub backtrace: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RULE: &str = "----------------------------------------";
        writeln!(f, "Command dispatch failed, diagnostic follows:")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, " - Raw message: {}", self.message)?;
        writeln!(f, " - Access: {}", self.access)?;
        writeln!(f, " - Host version: {}", self.host_version)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, " - Error category: {}", self.category)?;
        write!(f, "{}", self.cause)?;
        if !self.backtrace.is_empty() {
            write!(f, "\n - Stack trace:\n{}", self.backtrace.trim_end())?;
        }
        Ok(())
    }
}

/// Receives diagnostics once the log delay has passed.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: &Diagnostic);
}

/// Logs diagnostics at error level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: &Diagnostic) {
        error!(
            category = %diagnostic.category,
            access = %diagnostic.access,
            "\n{diagnostic}"
        );
    }
}

// ── FailureReporter ─────────────────────────────────────────────────────────

pub struct FailureReporter {
    bots: Arc<dyn BotManager>,
    sink: Arc<dyn DiagnosticSink>,
    delay: Duration,
    version_marker: char,
}

impl FailureReporter {
    pub fn new(bots: Arc<dyn BotManager>, delay: Duration, version_marker: char) -> Self {
        Self {
            bots,
            sink: Arc::new(TracingSink),
            delay,
            version_marker,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Await `fut`, converting both `Err` and panics into a [`Failure`].
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, Failure>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(Failure::Error(err)),
            Err(payload) => Err(Failure::from_panic(payload)),
        }
    }

    /// Build the diagnostic for `failure`, schedule the deferred log and
    /// return the diagnostic.
    pub async fn report(&self, message: &str, access: AccessLevel, failure: Failure) -> Diagnostic {
        let diagnostic = Diagnostic {
            message: message.to_string(),
            access,
            host_version: self.host_version().await,
            category: failure.category(),
            cause: failure.cause(),
            backtrace: failure.backtrace(),
        };
        warn!(category = %diagnostic.category, "command dispatch failed");
        self.schedule(diagnostic.clone());
        diagnostic
    }

    /// Best-effort host version. Never fails.
    async fn host_version(&self) -> String {
        match AssertUnwindSafe(self.bots.version_report())
            .catch_unwind()
            .await
        {
            Ok(Ok(Some(report))) => extract_version(&report, self.version_marker).to_string(),
            Ok(Ok(None)) => UNKNOWN_VERSION.to_string(),
            Ok(Err(e)) => {
                debug!(error = %e, "version report failed");
                UNKNOWN_VERSION.to_string()
            },
            Err(_) => {
                debug!("version report panicked");
                UNKNOWN_VERSION.to_string()
            },
        }
    }

    fn schedule(&self, diagnostic: Diagnostic) {
        let sink = Arc::clone(&self.sink);
        let delay = self.delay;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                deliver(sink.as_ref(), &diagnostic);
            });
            return;
        }

        let category = diagnostic.category.clone();
        let spawned = std::thread::Builder::new()
            .name("fleet-diagnostic".to_string())
            .spawn(move || {
                std::thread::sleep(delay);
                deliver(sink.as_ref(), &diagnostic);
            });
        if let Err(e) = spawned {
            warn!(%category, error = %e, "diagnostic dropped, no logging thread");
        }
    }
}

/// Hand `diagnostic` to `sink`. A panicking sink loses the diagnostic and
/// nothing else.
fn deliver(sink: &dyn DiagnosticSink, diagnostic: &Diagnostic) {
    if std::panic::catch_unwind(AssertUnwindSafe(|| sink.record(diagnostic))).is_err() {
        warn!(category = %diagnostic.category, "diagnostic sink panicked");
    }
}

/// Pull the bare version out of a host version report.
///
/// Takes the text from the last `marker` onward; without a marker, strips a
/// leading `<tag> ` prefix.
pub fn extract_version(report: &str, marker: char) -> &str {
    let report = report.trim();
    if let Some(idx) = report.rfind(marker) {
        return report[idx..].trim();
    }
    if report.starts_with('<')
        && let Some(end) = report.find("> ")
    {
        return report[end + 2..].trim();
    }
    report
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        async_trait::async_trait,
        fleet_common::BotHandle,
        rstest::rstest,
        std::sync::Mutex,
    };

    struct VersionHost(Option<&'static str>);

    #[async_trait]
    impl BotManager for VersionHost {
        fn is_connected(&self, _bot: &BotHandle) -> bool {
            true
        }

        fn identify(&self, _name: &str) -> Vec<BotHandle> {
            Vec::new()
        }

        async fn run_builtin(
            &self,
            _bot: &BotHandle,
            _access: AccessLevel,
            _command_line: &str,
            _caller_id: u64,
        ) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        async fn version_report(&self) -> anyhow::Result<Option<String>> {
            match self.0 {
                Some("fail") => anyhow::bail!("host offline"),
                other => Ok(other.map(str::to_string)),
            }
        }
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<Diagnostic>>);

    impl DiagnosticSink for Collect {
        fn record(&self, diagnostic: &Diagnostic) {
            self.0.lock().unwrap().push(diagnostic.clone());
        }
    }

    fn reporter(version: Option<&'static str>, sink: Arc<Collect>) -> FailureReporter {
        FailureReporter::new(Arc::new(VersionHost(version)), Duration::from_millis(20), 'V')
            .with_sink(sink)
    }

    #[rstest]
    #[case("<fleet> fleet V1.2.3", "V1.2.3")]
    #[case("<ASF> ArchiSteamFarm V5.0 (mono) V6.1.0.3", "V6.1.0.3")]
    #[case("<ASF> 6.1.0.3", "6.1.0.3")]
    #[case("  plain  ", "plain")]
    fn version_extraction(#[case] report: &str, #[case] want: &str) {
        assert_eq!(extract_version(report, 'V'), want);
    }

    #[tokio::test]
    async fn guard_catches_errors_and_panics() {
        let r = reporter(None, Arc::default());
        assert_eq!(r.guard(async { Ok(5) }).await.unwrap(), 5);

        let err = r
            .guard(async { Err::<(), _>(anyhow::Error::from(crate::Error::EmptyMessage)) })
            .await
            .unwrap_err();
        assert_eq!(err.category(), "dispatch::empty_message");

        let err = r
            .guard(async {
                if true {
                    panic!("bad index");
                }
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.category(), "panic");
        assert_eq!(err.cause(), "panicked: bad index");
        assert!(!err.backtrace().is_empty());
    }

    #[rstest]
    #[case(anyhow::anyhow!("socket closed"), "external")]
    #[case(anyhow::Error::from(std::io::Error::other("disk")), "io")]
    #[case(anyhow::Error::from(fleet_common::Error::message("x")), "common::message")]
    #[case(anyhow::Error::from(fleet_accounts::Error::unknown("x")), "accounts::unknown_account")]
    fn categories(#[case] err: anyhow::Error, #[case] want: &str) {
        assert_eq!(Failure::Error(err).category(), want);
    }

    #[tokio::test]
    async fn report_returns_now_and_logs_later() {
        let sink = Arc::new(Collect::default());
        let r = reporter(Some("<fleet> fleet V9.9.9"), Arc::clone(&sink));
        let failure = Failure::Error(anyhow::anyhow!("boom").context("loading cart"));
        let diagnostic = r.report("CART main", AccessLevel::Master, failure).await;

        assert_eq!(diagnostic.message, "CART main");
        assert_eq!(diagnostic.host_version, "V9.9.9");
        assert_eq!(diagnostic.category, "external");
        let text = diagnostic.to_string();
        assert!(text.contains(" - Raw message: CART main"));
        assert!(text.contains(" - Access: master"));
        assert!(text.contains("loading cart: boom"));
        assert!(text.contains(" - Stack trace:\n"));

        assert!(sink.0.lock().unwrap().is_empty());
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(*sink.0.lock().unwrap(), vec![diagnostic]);
    }

    #[tokio::test]
    async fn version_failure_degrades_to_unknown() {
        for version in [None, Some("fail")] {
            let r = reporter(version, Arc::default());
            let d = r
                .report("X", AccessLevel::Owner, Failure::panic("p"))
                .await;
            assert_eq!(d.host_version, UNKNOWN_VERSION);
        }
    }

    fn sample() -> Diagnostic {
        Diagnostic {
            message: "m".into(),
            access: AccessLevel::Owner,
            host_version: UNKNOWN_VERSION.into(),
            category: "panic".into(),
            cause: "panicked: p".into(),
            backtrace: String::new(),
        }
    }

    #[test]
    fn without_runtime_logs_later_on_a_thread() {
        let sink = Arc::new(Collect::default());
        let r = reporter(None, Arc::clone(&sink));
        r.schedule(sample());
        assert!(sink.0.lock().unwrap().is_empty());
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(*sink.0.lock().unwrap(), vec![sample()]);
    }

    struct Refusing;

    impl DiagnosticSink for Refusing {
        fn record(&self, _diagnostic: &Diagnostic) {
            panic!("sink unavailable");
        }
    }

    #[test]
    fn panicking_sink_is_contained() {
        deliver(&Refusing, &sample());
    }

    #[test]
    fn block_lists_stack_trace_only_when_present() {
        let mut d = sample();
        assert!(!d.to_string().contains("Stack trace"));
        d.backtrace = "   0: fleet_dispatch::engine\n".into();
        assert!(
            d.to_string()
                .ends_with(" - Stack trace:\n   0: fleet_dispatch::engine")
        );
    }
}
