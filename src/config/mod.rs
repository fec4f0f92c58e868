/// Configuration system for binwatch.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::BinwatchConfig::default()`]
/// 2. **User global config** — `~/.binwatch/config.toml`
/// 3. **Project local config** — `.binwatch.toml` in the current working directory
/// 4. **Environment variables** — `BINWATCH_*` overrides (highest precedence)
///
/// Layers are merged key by key: a file that sets only `evaluator.capacity`
/// leaves every other value from the previous layer untouched.
///
/// # Usage
///
/// ```rust,ignore
/// let cfg = binwatch::config::load();
/// let level = binwatch::evaluator::evaluate(&reading, cfg.evaluator.capacity)?;
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::BinwatchConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved binwatch configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Malformed files are skipped.
pub fn load() -> BinwatchConfig {
    let layers = [
        load_toml_file(global_config_path()),
        load_toml_file(project_config_path()),
    ];

    let mut config = resolve_layers(layers.into_iter().flatten());
    apply_env_overrides(&mut config);
    config
}

/// Merge TOML layers over the defaults, in order.
///
/// A layer that fails to deserialize against the schema (wrong types) is
/// dropped as a whole rather than poisoning the result.
fn resolve_layers(layers: impl IntoIterator<Item = toml::Value>) -> BinwatchConfig {
    let mut merged = match toml::Value::try_from(BinwatchConfig::default()) {
        Ok(value) => value,
        Err(_) => return BinwatchConfig::default(),
    };

    for layer in layers {
        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);
        if candidate.clone().try_into::<BinwatchConfig>().is_ok() {
            merged = candidate;
        }
    }

    merged.try_into().unwrap_or_default()
}

/// Load a TOML file as an untyped value (if it exists and parses).
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively overlay `overlay` onto `base`. Tables merge, scalars replace.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding config, session and activity log: `~/.binwatch`.
///
/// `BINWATCH_HOME` overrides the location.
pub fn data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("BINWATCH_HOME")
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|home| home.join(".binwatch"))
}

fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".binwatch.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `BINWATCH_API_URL` — monitoring API base URL
/// - `BINWATCH_AUTH_URL` — identity provider sign-in endpoint
/// - `BINWATCH_API_KEY` — identity provider web API key
/// - `BINWATCH_TIMEOUT_MS` — per-request timeout
/// - `BINWATCH_CAPACITY` — usage count of an empty bin
/// - `BINWATCH_LOG` — activity log on/off (`1`/`true`/`yes`/`on`)
/// - `BINWATCH_WEB_ADDR` — dashboard listen address
fn apply_env_overrides(config: &mut BinwatchConfig) {
    if let Ok(val) = std::env::var("BINWATCH_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("BINWATCH_AUTH_URL")
        && !val.is_empty()
    {
        config.api.auth_url = val;
    }
    if let Ok(val) = std::env::var("BINWATCH_API_KEY")
        && !val.is_empty()
    {
        config.api.api_key = val;
    }
    if let Ok(val) = std::env::var("BINWATCH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("BINWATCH_CAPACITY")
        && let Ok(capacity) = val.parse::<i64>()
    {
        config.evaluator.capacity = capacity;
    }
    if let Ok(val) = std::env::var("BINWATCH_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("BINWATCH_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.binwatch/config.toml`.
///
/// Returns an error if the file already exists and `force` is not set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.binwatch/ directory")?;
    }

    fs::write(&path, BinwatchConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted config key (e.g. `evaluator.capacity`) in the global
/// config file, creating the file from defaults if needed.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        toml::Value::try_from(BinwatchConfig::default())
            .context("failed to serialize default config")?
    };

    // Missing sections in a hand-written file are filled from defaults so
    // that any schema key can be set.
    let mut complete = toml::Value::try_from(BinwatchConfig::default())
        .context("failed to serialize default config")?;
    merge_values(&mut complete, root.clone());
    if key_exists(&complete, key) && !key_exists(&root, key) {
        root = complete;
    }

    set_toml_value(&mut root, key, value)?;

    // Reject writes that no longer match the schema.
    root.clone()
        .try_into::<BinwatchConfig>()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

fn key_exists(root: &toml::Value, key: &str) -> bool {
    key.split('.')
        .try_fold(root, |current, part| current.get(part))
        .is_some()
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The existing value's type decides how `raw_value` is parsed.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        None => anyhow::bail!("unknown config key: '{key}'"),
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
