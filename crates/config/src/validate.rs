//! Checks a config document before it is deserialized.
//!
//! Three passes: keys the schema does not know (with spelling hints), values
//! of the wrong type, and settings that parse but make dispatch misbehave.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{env_subst::substitute_env, loader::parse_config_value, schema::FleetConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding, addressed by a dotted path such as `accounts[2].name`.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// `syntax`, `file-ref`, `unknown-field`, `legacy`, `type-error`,
    /// `security`, `value` or `accounts`.
    pub category: &'static str,
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    /// File that was checked; `None` when no file was found.
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    fn single(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
            config_path: None,
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Expected document shape ─────────────────────────────────────────────────

enum Expect {
    Table(HashMap<&'static str, Expect>),
    List(Box<Expect>),
    /// Anything; the type pass handles it.
    Any,
}

impl Expect {
    fn table<const N: usize>(fields: [(&'static str, Expect); N]) -> Self {
        Self::Table(HashMap::from(fields))
    }
}

/// Top-level keys from older layouts, reported as `legacy` rather than
/// unknown.
const LEGACY_TOP_LEVEL_KEYS: &[&str] = &["dev_features"];

/// Mirrors `schema.rs`; a field added there must be added here.
fn expected_shape() -> Expect {
    use Expect::{Any, List};

    Expect::table([
        (
            "dispatch",
            Expect::table([
                ("dev_features", Any),
                ("name_delimiter", Any),
                ("failure_log_delay_ms", Any),
                ("response_tag", Any),
                ("version_marker", Any),
            ]),
        ),
        (
            "host",
            Expect::table([("version", Any), ("all_keyword", Any)]),
        ),
        (
            "accounts",
            List(Box::new(Expect::table([
                ("name", Any),
                ("connected", Any),
                ("aliases", Any),
            ]))),
        ),
    ])
}

// ── Spelling hints ──────────────────────────────────────────────────────────

/// Edit distance with a single rolling row.
fn levenshtein(a: &str, b: &str) -> usize {
    let target: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=target.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in target.iter().enumerate() {
            let substitute = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j + 1] + 1).min(row[j] + 1);
        }
    }
    row[target.len()]
}

/// Closest differing candidate at most three edits away.
fn closest<'a>(key: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    const MAX_EDITS: usize = 3;
    candidates
        .into_iter()
        .map(|candidate| (levenshtein(key, candidate), candidate))
        .filter(|&(edits, _)| (1..=MAX_EDITS).contains(&edits))
        .min()
        .map(|(_, candidate)| candidate)
}

// ── Entry points ────────────────────────────────────────────────────────────

/// Check the file at `path`, or the discovered config file when `path` is
/// `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let Some(file) = path
        .map(Path::to_path_buf)
        .or_else(crate::loader::find_config_file)
    else {
        return ValidationResult::single(Diagnostic::new(
            Severity::Info,
            "file-ref",
            "",
            "no config file found; using defaults",
        ));
    };

    let mut result = match std::fs::read_to_string(&file) {
        Err(e) => ValidationResult::single(Diagnostic::new(
            Severity::Error,
            "syntax",
            "",
            format!("failed to read config file: {e}"),
        )),
        Ok(raw) => match parse_config_value(&substitute_env(&raw), &file) {
            Ok(value) => validate_value(&value),
            Err(e) => ValidationResult::single(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("syntax error: {e}"),
            )),
        },
    };
    result.config_path = Some(file);
    result
}

/// Check an already-parsed document.
#[must_use]
pub fn validate_value(value: &Value) -> ValidationResult {
    let mut diagnostics = Vec::new();

    check_legacy_keys(value, &mut diagnostics);
    check_shape(value, &expected_shape(), "", &mut diagnostics);

    match serde_json::from_value::<FleetConfig>(value.clone()) {
        Ok(config) => check_semantic_warnings(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_legacy_keys(value: &Value, diagnostics: &mut Vec<Diagnostic>) {
    if value
        .get("dev_features")
        .is_some_and(Value::is_boolean)
    {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "legacy",
            "dev_features",
            "top-level dev_features is ignored; set dispatch.dev_features instead",
        ));
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Flag keys the expected shape does not declare. Mismatched types are left
/// to the deserializing pass.
fn check_shape(value: &Value, expect: &Expect, at: &str, diagnostics: &mut Vec<Diagnostic>) {
    match (value, expect) {
        (Value::Object(map), Expect::Table(fields)) => {
            for (key, child) in map {
                let path = child_path(at, key);
                if let Some(expected) = fields.get(key.as_str()) {
                    check_shape(child, expected, &path, diagnostics);
                } else if !(at.is_empty() && LEGACY_TOP_LEVEL_KEYS.contains(&key.as_str())) {
                    let message = closest(key, fields.keys().copied()).map_or_else(
                        || "unknown field".to_string(),
                        |hint| format!("unknown field (did you mean \"{hint}\"?)"),
                    );
                    diagnostics.push(Diagnostic::new(
                        Severity::Error,
                        "unknown-field",
                        path,
                        message,
                    ));
                }
            }
        },
        (Value::Array(items), Expect::List(item)) => {
            for (i, child) in items.iter().enumerate() {
                check_shape(child, item, &format!("{at}[{i}]"), diagnostics);
            }
        },
        _ => {},
    }
}

/// Run semantic checks on a successfully parsed config.
fn check_semantic_warnings(config: &FleetConfig, diagnostics: &mut Vec<Diagnostic>) {
    if config.dispatch.dev_features {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "security",
            "dispatch.dev_features",
            "developer commands are enabled; owners can read session cookies and tokens",
        ));
    }

    let delimiter = config.dispatch.name_delimiter;
    if delimiter.is_whitespace() || delimiter.is_alphanumeric() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "value",
            "dispatch.name_delimiter",
            format!("{delimiter:?} cannot separate bot names"),
        ));
    }

    if config.dispatch.response_tag.trim().is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "value",
            "dispatch.response_tag",
            "empty response tag; static replies will start with \"<>\"",
        ));
    }

    let mut seen = HashSet::new();
    for (i, account) in config.accounts.iter().enumerate() {
        if account.name.trim().is_empty() {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "accounts",
                format!("accounts[{i}].name"),
                "account name is empty",
            ));
            continue;
        }
        for name in std::iter::once(&account.name).chain(&account.aliases) {
            if !seen.insert(name.to_lowercase()) {
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "accounts",
                    format!("accounts[{i}]"),
                    format!("duplicate account name or alias \"{name}\""),
                ));
            }
        }
        if account.name.eq_ignore_ascii_case(&config.host.all_keyword) {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "accounts",
                format!("accounts[{i}].name"),
                "account name shadows the all-accounts keyword",
            ));
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abd"), 1);
        assert_eq!(levenshtein("abc", "abcd"), 1);
    }

    #[test]
    fn empty_config_is_valid() {
        let result = validate_value(&json!({}));
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn unknown_nested_key_with_suggestion() {
        let result = validate_value(&json!({"dispatch": {"dev_feature": true}}));
        let d = result
            .diagnostics
            .iter()
            .find(|d| d.category == "unknown-field")
            .unwrap();
        assert_eq!(d.path, "dispatch.dev_feature");
        assert!(d.message.contains("dev_features"));
        assert!(result.has_errors());
    }

    #[test]
    fn unknown_field_inside_account_entry() {
        let result = validate_value(&json!({"accounts": [{"name": "a", "conected": true}]}));
        let d = &result.diagnostics[0];
        assert_eq!(d.path, "accounts[0].conected");
        assert!(d.message.contains("connected"));
    }

    #[test]
    fn misplaced_dev_flag_is_a_legacy_warning() {
        let result = validate_value(&json!({"dev_features": true}));
        assert!(!result.has_errors(), "{:?}", result.diagnostics);
        assert_eq!(result.count(Severity::Warning), 1);
        assert_eq!(result.diagnostics[0].category, "legacy");
    }

    #[test]
    fn enabled_dev_features_warns() {
        let result = validate_value(&json!({"dispatch": {"dev_features": true}}));
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.category == "security" && d.severity == Severity::Warning)
        );
    }

    #[test]
    fn whitespace_delimiter_is_error() {
        let result = validate_value(&json!({"dispatch": {"name_delimiter": " "}}));
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].path, "dispatch.name_delimiter");
    }

    #[test]
    fn type_errors_reported() {
        let result = validate_value(&json!({"dispatch": {"failure_log_delay_ms": "soon"}}));
        assert!(result.diagnostics.iter().any(|d| d.category == "type-error"));
    }

    #[test]
    fn duplicate_names_and_aliases_are_errors() {
        let result = validate_value(&json!({
            "accounts": [
                {"name": "main", "aliases": ["primary"]},
                {"name": "Primary"},
            ]
        }));
        assert_eq!(result.count(Severity::Error), 1);
        assert!(result.diagnostics[0].message.contains("Primary"));
    }

    #[test]
    fn validate_reads_file_and_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.toml");
        std::fs::write(&path, "[dispatch\n").unwrap();
        let result = validate(Some(&path));
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].category, "syntax");
        assert_eq!(result.config_path.as_deref(), Some(path.as_path()));
    }
}
