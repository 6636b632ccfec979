//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for runtime settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// System layout and home shell settings
    #[serde(default)]
    pub system: SystemConfig,
    /// Title supervisor settings
    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

/// System directory layout and home shell selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// System root holding `sys/` and `titles/` (default: ".")
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Title id of the home shell under `sys/apps/` (default: "000400020000000")
    #[serde(default = "default_home_title")]
    pub home_title: String,
    /// Mount token for the home shell's resources (default: "S:/")
    #[serde(default = "default_home_mount")]
    pub home_mount: String,
}

/// Title supervisor timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Delay before the worker reports running, in milliseconds (default: 0)
    #[serde(default)]
    pub warmup_ms: u64,
    /// Wait for the host to hand off the graphics context before attaching
    /// (default: true)
    #[serde(default = "default_true")]
    pub await_handoff: bool,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_home_title() -> String {
    "000400020000000".to_string()
}
fn default_home_mount() -> String {
    "S:/".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            home_title: default_home_title(),
            home_mount: default_home_mount(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            warmup_ms: 0,
            await_handoff: default_true(),
        }
    }
}

impl SupervisorConfig {
    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }
}

impl SystemConfig {
    /// `<root>/sys/apps`
    pub fn apps_dir(&self) -> PathBuf {
        self.root.join("sys").join("apps")
    }

    /// `<root>/titles`
    pub fn titles_dir(&self) -> PathBuf {
        self.root.join("titles")
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Glint\config`
/// On macOS: `~/Library/Application Support/io.glint.Glint`
/// On Linux: `~/.config/Glint`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.glint", "", "Glint")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_dir()
        .map(|dir| load_from(&dir.join("config.toml")))
        .unwrap_or_default()
}

/// Loads the configuration from an explicit file, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Config::default();
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
pub fn save(config: &Config) -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        save_to(config, &dir.join("config.toml"))?;
    }
    Ok(())
}

/// Saves the configuration to an explicit file.
pub fn save_to(config: &Config, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(path, content)
}
