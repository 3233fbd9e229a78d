//! Configuration initialization and hierarchy management
//!
//! Precedence: CLI > Env > File > Defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::tool_resolver::{SearchPath, ToolSearchConfig, DEFAULT_INSTALL_DIRS};
use crate::app::session::SessionTiming;
use crate::domain::errors::*;

/// Name of the config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "trimkit.toml";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub json_logs: bool,
    /// Persisted settings file; the user config directory when unset
    pub settings_file: Option<PathBuf>,
    /// Directory holding bundled ffmpeg/ffprobe
    pub resource_dir: Option<PathBuf>,
    pub install_dirs: Vec<PathBuf>,
    pub debounce_ms: u64,
    pub progress_tick_ms: u64,
    pub preview_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            settings_file: None,
            resource_dir: None,
            install_dirs: DEFAULT_INSTALL_DIRS.iter().map(PathBuf::from).collect(),
            debounce_ms: 220,
            progress_tick_ms: 120,
            preview_timeout_ms: 3000,
        }
    }
}

impl AppConfig {
    pub fn timing(&self) -> SessionTiming {
        SessionTiming {
            debounce: Duration::from_millis(self.debounce_ms),
            progress_tick: Duration::from_millis(self.progress_tick_ms.max(1)),
        }
    }

    pub fn tool_search(&self) -> ToolSearchConfig {
        ToolSearchConfig {
            install_dirs: self.install_dirs.clone(),
            search_path: SearchPath::Inherit,
            resource_dir: self.resource_dir.clone(),
        }
    }

    pub fn preview_timeout(&self) -> Duration {
        Duration::from_millis(self.preview_timeout_ms)
    }

    /// Where persisted settings live, if anywhere
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.settings_file
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("trimkit").join("settings.toml")))
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub json_logs: bool,
    pub settings_file: Option<PathBuf>,
    pub resource_dir: Option<PathBuf>,
}

/// Build the effective configuration from every layer
pub fn initialize_configuration_hierarchy(overrides: &ConfigOverrides) -> DomainResult<AppConfig> {
    let mut config = match locate_config_file(overrides.config_file.as_deref())? {
        Some(path) => load_config_file(&path)?,
        None => AppConfig::default(),
    };

    apply_environment(&mut config, |key| std::env::var(key).ok())?;
    apply_cli_overrides(&mut config, overrides);
    Ok(config)
}

/// An explicit path must exist; otherwise the working directory wins over
/// the user config directory.
fn locate_config_file(explicit: Option<&Path>) -> DomainResult<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(DomainError::Config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let candidates = [
        Some(PathBuf::from(LOCAL_CONFIG_FILE)),
        dirs::config_dir().map(|dir| dir.join("trimkit").join("config.toml")),
    ];
    Ok(candidates.into_iter().flatten().find(|path| path.is_file()))
}

/// Parse a TOML config file; missing keys keep their defaults
pub fn load_config_file(path: &Path) -> DomainResult<AppConfig> {
    info!("Loading configuration from: {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| DomainError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Apply `TRIMKIT_*` variables, read through `lookup`
pub fn apply_environment(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> DomainResult<()> {
    let mut applied = 0;

    if let Some(value) = lookup("TRIMKIT_LOG_LEVEL") {
        config.log_level = value;
        applied += 1;
    }
    if let Some(value) = lookup("TRIMKIT_JSON_LOGS") {
        config.json_logs = parse_env_bool("TRIMKIT_JSON_LOGS", &value)?;
        applied += 1;
    }
    if let Some(value) = lookup("TRIMKIT_SETTINGS_FILE") {
        config.settings_file = Some(PathBuf::from(value));
        applied += 1;
    }
    if let Some(value) = lookup("TRIMKIT_RESOURCE_DIR") {
        config.resource_dir = Some(PathBuf::from(value));
        applied += 1;
    }
    if let Some(value) = lookup("TRIMKIT_DEBOUNCE_MS") {
        config.debounce_ms = parse_env_millis("TRIMKIT_DEBOUNCE_MS", &value)?;
        applied += 1;
    }
    if let Some(value) = lookup("TRIMKIT_PROGRESS_TICK_MS") {
        config.progress_tick_ms = parse_env_millis("TRIMKIT_PROGRESS_TICK_MS", &value)?;
        applied += 1;
    }

    if applied > 0 {
        info!("Applied {} environment variable overrides", applied);
    }
    Ok(())
}

fn parse_env_bool(key: &str, value: &str) -> DomainResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DomainError::Config(format!(
            "Invalid boolean value for {}: {}",
            key, value
        ))),
    }
}

fn parse_env_millis(key: &str, value: &str) -> DomainResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| DomainError::Config(format!("Invalid value for {}: {}", key, e)))
}

fn apply_cli_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) {
    if let Some(level) = &overrides.log_level {
        config.log_level = level.clone();
    }
    if overrides.json_logs {
        config.json_logs = true;
    }
    if let Some(path) = &overrides.settings_file {
        config.settings_file = Some(path.clone());
    }
    if let Some(dir) = &overrides.resource_dir {
        config.resource_dir = Some(dir.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_file_values_keep_defaults_for_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trimkit.toml");
        std::fs::write(&path, "log_level = \"debug\"\ndebounce_ms = 50\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.progress_tick_ms, 120);
        assert_eq!(config.install_dirs.len(), 3);
    }

    #[test]
    fn test_environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("TRIMKIT_LOG_LEVEL", "warn"),
            ("TRIMKIT_JSON_LOGS", "true"),
            ("TRIMKIT_DEBOUNCE_MS", "10"),
            ("TRIMKIT_RESOURCE_DIR", "/opt/trimkit"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        apply_environment(&mut config, |key| env.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.log_level, "warn");
        assert!(config.json_logs);
        assert_eq!(config.debounce_ms, 10);
        assert_eq!(config.resource_dir, Some(PathBuf::from("/opt/trimkit")));
    }

    #[test]
    fn test_invalid_environment_value() {
        let mut config = AppConfig::default();
        let result = apply_environment(&mut config, |key| {
            (key == "TRIMKIT_PROGRESS_TICK_MS").then(|| "fast".to_string())
        });
        assert!(matches!(result, Err(DomainError::Config(_))));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = AppConfig {
            log_level: "warn".to_string(),
            ..AppConfig::default()
        };
        let overrides = ConfigOverrides {
            log_level: Some("trace".to_string()),
            json_logs: true,
            settings_file: Some(PathBuf::from("/tmp/s.toml")),
            ..ConfigOverrides::default()
        };
        apply_cli_overrides(&mut config, &overrides);

        assert_eq!(config.log_level, "trace");
        assert!(config.json_logs);
        assert_eq!(config.settings_path(), Some(PathBuf::from("/tmp/s.toml")));
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let result = locate_config_file(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(DomainError::Config(_))));
    }

    #[test]
    fn test_timing_from_config() {
        let config = AppConfig {
            debounce_ms: 5,
            progress_tick_ms: 0,
            ..AppConfig::default()
        };
        let timing = config.timing();
        assert_eq!(timing.debounce, Duration::from_millis(5));
        assert_eq!(timing.progress_tick, Duration::from_millis(1));
    }
}
