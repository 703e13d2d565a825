use std::path::Path;

use {
    anyhow::Result,
    fleet_config::{Diagnostic, Severity, ValidationResult, validate},
};

fn painted(severity: Severity) -> String {
    let color = match severity {
        Severity::Error => 31,
        Severity::Warning => 33,
        Severity::Info => 36,
    };
    format!("\x1b[1;{color}m{severity}\x1b[0m")
}

fn line(d: &Diagnostic) -> String {
    match d.path.as_str() {
        "" => format!("  {} {}", painted(d.severity), d.message),
        path => format!("  {} {path}: {}", painted(d.severity), d.message),
    }
}

/// Report lines for `result`; info diagnostics only when `verbose`.
fn report(result: &ValidationResult, verbose: bool) -> Vec<String> {
    let mut lines = vec![match &result.config_path {
        Some(path) => format!("Checking {}", path.display()),
        None => "No config file found; checking defaults.".to_string(),
    }];
    lines.push(String::new());

    let shown: Vec<String> = result
        .diagnostics
        .iter()
        .filter(|d| verbose || d.severity != Severity::Info)
        .map(line)
        .collect();
    if !shown.is_empty() {
        lines.extend(shown);
        lines.push(String::new());
    }

    let (errors, warnings) = (
        result.count(Severity::Error),
        result.count(Severity::Warning),
    );
    lines.push(if errors + warnings == 0 {
        "No issues found.".to_string()
    } else {
        format!("{errors} error(s), {warnings} warning(s)")
    });
    lines
}

/// `fleet check`: print the report to stderr, exit 1 on errors.
pub fn check(path: Option<&Path>, verbose: bool) -> Result<()> {
    let result = validate::validate(path);
    for text in report(&result, verbose) {
        eprintln!("{text}");
    }
    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
