//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.docterm/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::keymap::KeyMap;
use crate::core::state::DEFAULT_PAGE_SIZE;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DocTermConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub keys: KeyMap,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub page_size: Option<usize>,
    pub show_sidebar: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    pub data_file: Option<PathBuf>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_file: Option<PathBuf>,
    pub page_size: usize,
    pub show_sidebar: bool,
    pub log_level: LevelFilter,
    pub keys: KeyMap,
}

/// Values given on the command line (None = not specified).
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub data_file: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub log_level: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.docterm/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".docterm").join("config.toml"))
}

/// Load config from `~/.docterm/config.toml`, or from `explicit` if given.
///
/// A missing default file is generated and treated as empty. A missing
/// explicit file is an error. A malformed file returns `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<DocTermConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(DocTermConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(DocTermConfig::default());
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<DocTermConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DocTermConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# docterm Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# page_size = 50                     # Documents per page (DOCTERM_PAGE_SIZE)
# show_sidebar = true
# log_level = "debug"                # "error", "warn", "info", "debug", "trace"

# [store]
# data_file = "/path/to/data.json"   # { "db": { "collection": [docs] } } (DOCTERM_DATA_FILE)

# Key bindings: any operation left out keeps its default.
# Keys: Enter, Tab, Backtab, Esc, Backspace, Delete, Insert, Up, Down, Left,
# Right, Home, End, PgUp, PgDn, F1-F12, Ctrl+<letter>, Space.

# [keys.global]
# quit = { keys = ["Ctrl+C"], description = "Quit" }
# toggle_help = { keys = ["Ctrl+K"], description = "Toggle help" }
# toggle_sidebar = { keys = ["Ctrl+S"], description = "Toggle sidebar" }

# [keys.content]
# peek_document = { keys = ["Enter"], runes = ["p"], description = "Peek document" }
# edit_document = { runes = ["e"], description = "Edit document" }
# next_page = { keys = ["Ctrl+N"], description = "Next page" }

# [keys.editor]
# save = { keys = ["Ctrl+S"], description = "Save document" }
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &DocTermConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |name| std::env::var(name).ok())
}

/// `resolve` with an injectable environment lookup.
fn resolve_with_env(
    config: &DocTermConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Data file: CLI → env → config
    let data_file = cli
        .data_file
        .clone()
        .or_else(|| env("DOCTERM_DATA_FILE").map(PathBuf::from))
        .or_else(|| config.store.data_file.clone());

    // Page size: CLI → env → config → default
    let page_size = cli
        .page_size
        .or_else(|| {
            env("DOCTERM_PAGE_SIZE").and_then(|v| match v.parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!("Ignoring invalid DOCTERM_PAGE_SIZE: {}", v);
                    None
                }
            })
        })
        .or(config.general.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .max(1);

    // Log level: CLI → config → default
    let log_level = cli
        .log_level
        .as_deref()
        .or(config.general.log_level.as_deref())
        .and_then(|level| match level.parse::<LevelFilter>() {
            Ok(level) => Some(level),
            Err(_) => {
                warn!("Ignoring unknown log level: {}", level);
                None
            }
        })
        .unwrap_or(LevelFilter::Debug);

    ResolvedConfig {
        data_file,
        page_size,
        show_sidebar: config.general.show_sidebar.unwrap_or(true),
        log_level,
        keys: config.keys.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_parses() {
        let config = DocTermConfig::default();
        assert!(config.general.page_size.is_none());
        assert!(config.store.data_file.is_none());
        assert_eq!(config.keys, KeyMap::default());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved =
            resolve_with_env(&DocTermConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.page_size, DEFAULT_PAGE_SIZE);
        assert!(resolved.show_sidebar);
        assert_eq!(resolved.log_level, LevelFilter::Debug);
        assert!(resolved.data_file.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = DocTermConfig {
            general: GeneralConfig {
                page_size: Some(10),
                show_sidebar: Some(false),
                log_level: Some("warn".to_string()),
            },
            store: StoreConfig {
                data_file: Some(PathBuf::from("/tmp/data.json")),
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.page_size, 10);
        assert!(!resolved.show_sidebar);
        assert_eq!(resolved.log_level, LevelFilter::Warn);
        assert_eq!(resolved.data_file, Some(PathBuf::from("/tmp/data.json")));
    }

    #[test]
    fn test_env_beats_config_and_cli_beats_env() {
        let config = DocTermConfig {
            general: GeneralConfig {
                page_size: Some(10),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |name: &str| match name {
            "DOCTERM_PAGE_SIZE" => Some("25".to_string()),
            "DOCTERM_DATA_FILE" => Some("/env/data.json".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.page_size, 25);
        assert_eq!(resolved.data_file, Some(PathBuf::from("/env/data.json")));

        let cli = CliOverrides {
            data_file: Some(PathBuf::from("/cli/data.json")),
            page_size: Some(5),
            log_level: Some("trace".to_string()),
        };
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.page_size, 5);
        assert_eq!(resolved.data_file, Some(PathBuf::from("/cli/data.json")));
        assert_eq!(resolved.log_level, LevelFilter::Trace);
    }

    #[test]
    fn test_invalid_env_and_level_fall_back() {
        let env = |name: &str| (name == "DOCTERM_PAGE_SIZE").then(|| "lots".to_string());
        let cli = CliOverrides {
            log_level: Some("loud".to_string()),
            ..Default::default()
        };
        let resolved = resolve_with_env(&DocTermConfig::default(), &cli, env);
        assert_eq!(resolved.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(resolved.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_page_size_zero_is_clamped() {
        let cli = CliOverrides {
            page_size: Some(0),
            ..Default::default()
        };
        let resolved = resolve_with_env(&DocTermConfig::default(), &cli, no_env);
        assert_eq!(resolved.page_size, 1);
    }

    #[test]
    fn test_toml_with_keys() {
        let toml_str = r#"
[general]
page_size = 20

[store]
data_file = "fixtures/shop.json"

[keys.global]
quit = { keys = ["Ctrl+Q"], description = "Quit" }

[keys.editor]
save = { keys = ["Ctrl+W", "F2"], description = "Write" }
"#;
        let config: DocTermConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.page_size, Some(20));
        assert_eq!(config.store.data_file, Some(PathBuf::from("fixtures/shop.json")));
        assert_eq!(config.keys.global.quit.keys, ["Ctrl+Q"]);
        assert_eq!(config.keys.editor.save.keys, ["Ctrl+W", "F2"]);
        // Untouched operations keep their defaults
        assert_eq!(config.keys.global.toggle_help.keys, ["Ctrl+K"]);
        assert_eq!(config.keys.editor.cancel.keys, ["Esc"]);
    }

    #[test]
    fn test_read_explicit_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("docterm-does-not-exist.toml");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_read_explicit_malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("docterm-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[general\npage_size = ").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
        fs::remove_file(&path).ok();
    }
}
