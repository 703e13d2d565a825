use std::sync::{Arc, RwLock};

use {
    async_trait::async_trait,
    fleet_common::{AccessLevel, BotHandle},
    fleet_config::{AccountConfig, HostConfig},
    tracing::{debug, info},
};

use crate::{
    error::{Context, Error, Result},
    manager::{BotManager, BuiltinRunner, DiscoveryQueue},
    matcher::{is_pattern, name_matches},
};

struct AccountEntry {
    handle: BotHandle,
    aliases: Vec<String>,
    connected: bool,
}

impl AccountEntry {
    fn answers_to(&self, name: &str) -> bool {
        self.handle.name().eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// In-memory account manager.
///
/// Accounts keep their registration order, which is also the order group
/// expansions return them in.
pub struct BotRegistry {
    accounts: RwLock<Vec<AccountEntry>>,
    all_keyword: String,
    version: Option<String>,
    builtin: Option<Arc<dyn BuiltinRunner>>,
    discovery: Option<Arc<dyn DiscoveryQueue>>,
}

impl Default for BotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BotRegistry {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(Vec::new()),
            all_keyword: HostConfig::default().all_keyword,
            version: None,
            builtin: None,
            discovery: None,
        }
    }

    /// Build a registry from the `[host]` and `[[accounts]]` config sections.
    pub fn from_config(host: &HostConfig, accounts: &[AccountConfig]) -> Result<Self> {
        let registry = Self::new()
            .with_all_keyword(&host.all_keyword)
            .with_version(&host.version);
        for (i, account) in accounts.iter().enumerate() {
            registry
                .add(&account.name, &account.aliases, account.connected)
                .with_context(|| format!("accounts[{i}]"))?;
        }
        info!(count = accounts.len(), "account registry loaded");
        Ok(registry)
    }

    /// Set the keyword that expands to every account.
    pub fn with_all_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.all_keyword = keyword.into();
        self
    }

    /// Set the text returned by [`BotManager::version_report`].
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Delegate built-in commands to `runner`.
    pub fn with_builtin(mut self, runner: Arc<dyn BuiltinRunner>) -> Self {
        self.builtin = Some(runner);
        self
    }

    /// Grant the discovery-queue capability.
    pub fn with_discovery_queue(mut self, queue: Arc<dyn DiscoveryQueue>) -> Self {
        self.discovery = Some(queue);
        self
    }

    /// Register an account. Names and aliases must be unique
    /// (case-insensitive) across the registry.
    pub fn add(&self, name: &str, aliases: &[String], connected: bool) -> Result<BotHandle> {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        let clash = std::iter::once(name)
            .chain(aliases.iter().map(String::as_str))
            .find(|n| accounts.iter().any(|entry| entry.answers_to(n)));
        if let Some(taken) = clash {
            return Err(Error::duplicate(taken));
        }

        let handle = BotHandle::new(name);
        accounts.push(AccountEntry {
            handle: handle.clone(),
            aliases: aliases.to_vec(),
            connected,
        });
        debug!(bot = %handle, connected, "account registered");
        Ok(handle)
    }

    /// Flip an account's connectivity.
    pub fn set_connected(&self, name: &str, connected: bool) -> Result<()> {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        let entry = accounts
            .iter_mut()
            .find(|entry| entry.answers_to(name))
            .ok_or_else(|| Error::unknown(name))?;
        entry.connected = connected;
        Ok(())
    }

    /// Handle for an exact account name or alias.
    pub fn get(&self, name: &str) -> Option<BotHandle> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        accounts
            .iter()
            .find(|entry| entry.answers_to(name))
            .map(|entry| entry.handle.clone())
    }

    /// All account handles in registration order.
    pub fn handles(&self) -> Vec<BotHandle> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        accounts.iter().map(|entry| entry.handle.clone()).collect()
    }
}

#[async_trait]
impl BotManager for BotRegistry {
    fn is_connected(&self, bot: &BotHandle) -> bool {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        accounts
            .iter()
            .any(|entry| entry.handle == *bot && entry.connected)
    }

    fn identify(&self, name: &str) -> Vec<BotHandle> {
        let name = name.trim();
        if name.is_empty() {
            return Vec::new();
        }
        if name.eq_ignore_ascii_case(&self.all_keyword) {
            return self.handles();
        }

        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        if is_pattern(name) {
            return accounts
                .iter()
                .filter(|entry| {
                    name_matches(name, entry.handle.name())
                        || entry.aliases.iter().any(|a| name_matches(name, a))
                })
                .map(|entry| entry.handle.clone())
                .collect();
        }
        accounts
            .iter()
            .filter(|entry| entry.answers_to(name))
            .map(|entry| entry.handle.clone())
            .collect()
    }

    async fn run_builtin(
        &self,
        bot: &BotHandle,
        access: AccessLevel,
        command_line: &str,
        caller_id: u64,
    ) -> anyhow::Result<Option<String>> {
        match &self.builtin {
            Some(runner) => runner.run(bot, access, command_line, caller_id).await,
            None => {
                debug!(bot = %bot, command_line, "no built-in runner configured");
                Ok(None)
            },
        }
    }

    async fn version_report(&self) -> anyhow::Result<Option<String>> {
        Ok(self.version.clone())
    }

    fn discovery_queue(&self) -> Option<&dyn DiscoveryQueue> {
        self.discovery.as_deref()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, std::sync::Mutex};

    fn registry() -> BotRegistry {
        let registry = BotRegistry::new().with_version("<fleet> fleet V1.2.3");
        registry.add("main", &["primary".into()], true).unwrap();
        registry.add("farm01", &[], true).unwrap();
        registry.add("farm02", &[], false).unwrap();
        registry
    }

    fn names(handles: Vec<BotHandle>) -> Vec<String> {
        handles.iter().map(|h| h.name().to_string()).collect()
    }

    #[test]
    fn identify_exact_and_alias_case_insensitive() {
        let r = registry();
        assert_eq!(names(r.identify("MAIN")), vec!["main"]);
        assert_eq!(names(r.identify("Primary")), vec!["main"]);
        assert!(r.identify("nobody").is_empty());
        assert!(r.identify("  ").is_empty());
    }

    #[test]
    fn identify_all_keyword_in_registration_order() {
        let r = registry();
        assert_eq!(names(r.identify("all")), vec!["main", "farm01", "farm02"]);
    }

    #[test]
    fn identify_glob() {
        let r = registry();
        assert_eq!(names(r.identify("farm*")), vec!["farm01", "farm02"]);
        assert_eq!(names(r.identify("prim*")), vec!["main"]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let r = registry();
        let err = r.add("PRIMARY", &[], true).unwrap_err();
        assert!(matches!(err, Error::DuplicateAccount { .. }));
        let err = r.add("fresh", &["farm01".into()], true).unwrap_err();
        assert!(err.to_string().contains("farm01"));
    }

    #[test]
    fn connectivity_toggles() {
        let r = registry();
        let farm02 = r.get("farm02").unwrap();
        assert!(!r.is_connected(&farm02));
        r.set_connected("farm02", true).unwrap();
        assert!(r.is_connected(&farm02));
        assert!(matches!(
            r.set_connected("ghost", true),
            Err(Error::UnknownAccount { .. })
        ));
        assert!(!r.is_connected(&BotHandle::new("ghost")));
    }

    #[test]
    fn from_config_reports_offending_entry() {
        let accounts = vec![
            AccountConfig {
                name: "a".into(),
                ..Default::default()
            },
            AccountConfig {
                name: "A".into(),
                ..Default::default()
            },
        ];
        let err = BotRegistry::from_config(&HostConfig::default(), &accounts)
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("accounts[1]"), "{err}");
    }

    struct RecordingRunner(Mutex<Vec<String>>);

    #[async_trait]
    impl BuiltinRunner for RecordingRunner {
        async fn run(
            &self,
            bot: &BotHandle,
            access: AccessLevel,
            command_line: &str,
            _caller_id: u64,
        ) -> anyhow::Result<Option<String>> {
            self.0
                .lock()
                .unwrap()
                .push(format!("{bot}:{access}:{command_line}"));
            Ok(Some("ok".into()))
        }
    }

    #[tokio::test]
    async fn builtin_delegates_to_runner() {
        let runner = Arc::new(RecordingRunner(Mutex::new(Vec::new())));
        let r = BotRegistry::new().with_builtin(runner.clone());
        let bot = r.add("main", &[], true).unwrap();
        let reply = r
            .run_builtin(&bot, AccessLevel::Operator, "POINTS", 7)
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("ok"));
        assert_eq!(*runner.0.lock().unwrap(), vec!["main:operator:POINTS"]);
    }

    #[tokio::test]
    async fn builtin_without_runner_is_silent() {
        let r = registry();
        let bot = r.get("main").unwrap();
        assert!(
            r.run_builtin(&bot, AccessLevel::Owner, "VERSION", 0)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            r.version_report().await.unwrap().as_deref(),
            Some("<fleet> fleet V1.2.3")
        );
        assert!(r.discovery_queue().is_none());
    }
}
