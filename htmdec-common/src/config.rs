//! Configuration loading
//!
//! Bootstrap configuration comes from a TOML file. The file is located in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config directory (`~/.config/htmdec/config.toml` on Linux)
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "HTMDEC_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP bind address for `serve`
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Login of the identity imports run as
    #[serde(default = "default_service_user")]
    pub service_user: String,

    /// EventBus channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Extra file-name exclusion pattern merged into every import
    #[serde(default)]
    pub default_file_exclude_regex: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_service_user() -> String {
    "htmdec".to_string()
}

fn default_event_capacity() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            service_user: default_service_user(),
            event_capacity: default_event_capacity(),
            default_file_exclude_regex: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Resolve the config file location and load it, falling back to defaults
    ///
    /// An explicitly named file (CLI or environment) must exist; the user
    /// config directory is only consulted if present.
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg, CONFIG_ENV_VAR)? {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                debug!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Config file resolution (see module docs for priority order)
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Result<Option<PathBuf>> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return require_existing(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return require_existing(PathBuf::from(path));
    }

    // Priority 3: User config directory
    Ok(dirs::config_dir()
        .map(|d| d.join("htmdec").join("config.toml"))
        .filter(|p| p.exists()))
}

fn require_existing(path: PathBuf) -> Result<Option<PathBuf>> {
    if path.exists() {
        Ok(Some(path))
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config: TomlConfig = toml::from_str("service_user = \"alice\"").unwrap();
        assert_eq!(config.service_user, "alice");
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.event_capacity, 1000);
        assert_eq!(config.logging.level, "info");
        assert!(config.default_file_exclude_regex.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "default_file_exclude_regex = '\\.tmp$'\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = TomlConfig::load(file.path()).unwrap();
        assert_eq!(config.default_file_exclude_regex.as_deref(), Some("\\.tmp$"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "event_capacity = \"many\"").unwrap();
        assert!(matches!(TomlConfig::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_reports_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = TomlConfig::resolve(Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("absent.toml")));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "bind_address = [").unwrap();
        assert!(matches!(TomlConfig::resolve(Some(&broken)), Err(Error::Config(_))));

        let valid = dir.path().join("valid.toml");
        std::fs::write(&valid, "event_capacity = 16").unwrap();
        assert_eq!(TomlConfig::resolve(Some(&valid)).unwrap().event_capacity, 16);
    }

    #[test]
    #[serial]
    fn test_cli_arg_takes_priority_over_env() {
        let cli = tempfile::NamedTempFile::new().unwrap();
        std::env::set_var("HTMDEC_TEST_CONFIG", "/nonexistent/config.toml");

        let resolved = resolve_config_path(Some(cli.path()), "HTMDEC_TEST_CONFIG").unwrap();
        assert_eq!(resolved.as_deref(), Some(cli.path()));

        // env var alone points at a missing file
        assert!(resolve_config_path(None, "HTMDEC_TEST_CONFIG").is_err());
        std::env::remove_var("HTMDEC_TEST_CONFIG");
    }
}
