use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    schema::FleetConfig,
    validate::{Severity, validate_value},
};

/// File names tried in each directory, in order.
const CONFIG_FILENAMES: &[&str] = &["fleet.toml", "fleet.yaml", "fleet.yml", "fleet.json"];

/// Read, substitute, validate and deserialize one config file.
///
/// Warnings are logged. The first error aborts the load.
pub fn load_config(path: &Path) -> anyhow::Result<FleetConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
    let value = parse_config_value(&substitute_env(&text), path)?;

    let result = validate_value(&value);
    for diagnostic in &result.diagnostics {
        match diagnostic.severity {
            Severity::Error => {},
            Severity::Warning => warn!(
                path = %diagnostic.path,
                category = diagnostic.category,
                "{}",
                diagnostic.message
            ),
            Severity::Info => debug!(path = %diagnostic.path, "{}", diagnostic.message),
        }
    }
    if let Some(first) = result
        .diagnostics
        .iter()
        .find(|d| d.severity == Severity::Error)
    {
        anyhow::bail!(
            "invalid config {}: {}: {}",
            path.display(),
            first.path,
            first.message
        );
    }

    Ok(serde_json::from_value(value)?)
}

/// Config from the first file [`find_config_file`] finds, falling back to
/// defaults when there is none or it fails to load.
///
/// The working directory wins over `~/.config/fleet/`.
pub fn discover_and_load() -> FleetConfig {
    let Some(path) = find_config_file() else {
        debug!("no fleet config found; defaults apply");
        return FleetConfig::default();
    };
    debug!(path = %path.display(), "reading fleet config");
    load_config(&path).unwrap_or_else(|error| {
        warn!(path = %path.display(), %error, "fleet config rejected; defaults apply");
        FleetConfig::default()
    })
}

/// `fleet.{toml,yaml,yml,json}` in the working directory, then in
/// [`config_dir`].
pub fn find_config_file() -> Option<PathBuf> {
    let in_dir = |dir: &Path| {
        CONFIG_FILENAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    };
    in_dir(Path::new(".")).or_else(|| config_dir().and_then(|dir| in_dir(&dir)))
}

/// Per-user config directory (`~/.config/fleet/` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "fleet").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Decode TOML, YAML or JSON into a JSON tree. The extension picks the
/// format; no extension means TOML.
pub(crate) fn parse_config_value(raw: &str, path: &Path) -> anyhow::Result<serde_json::Value> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("toml");

    let value = match format {
        "toml" => serde_json::to_value(toml::from_str::<toml::Value>(raw)?)?,
        "yaml" | "yml" => serde_json::to_value(serde_yaml::from_str::<serde_yaml::Value>(raw)?)?,
        "json" => serde_json::from_str(raw)?,
        other => anyhow::bail!("unsupported config format: .{other}"),
    };
    Ok(value)
}
