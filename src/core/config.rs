//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.screenstack/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::panel_layer::ALL_PRIORITIES;
use crate::core::screen::{
    LostForeground, PanelPriority, QueuePriority, TakeForeground, WindowPolicy,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StackConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub windows: Vec<WindowEntry>,
    #[serde(default)]
    pub panels: Vec<PanelEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub transition_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub animate: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LayoutConfig {
    /// Priority tiers that get a panel container.
    pub para_layers: Option<Vec<PanelPriority>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WindowEntry {
    pub id: String,
    pub title: Option<String>,
    pub popup: Option<bool>,
    pub queue_priority: Option<QueuePriority>,
    pub lost_foreground: Option<LostForeground>,
    pub take_foreground: Option<TakeForeground>,
    pub transition_ms: Option<u64>,
}

impl WindowEntry {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: None,
            popup: None,
            queue_priority: None,
            lost_foreground: None,
            take_foreground: None,
            transition_ms: None,
        }
    }

    pub fn policy(&self) -> WindowPolicy {
        WindowPolicy {
            is_popup: self.popup.unwrap_or(false),
            queue_priority: self.queue_priority.unwrap_or_default(),
            lost_foreground: self.lost_foreground.unwrap_or_default(),
            take_foreground: self.take_foreground.unwrap_or_default(),
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms.unwrap_or(DEFAULT_TRANSITION_MS))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PanelEntry {
    pub id: String,
    pub title: Option<String>,
    pub priority: Option<PanelPriority>,
    pub transition_ms: Option<u64>,
}

impl PanelEntry {
    fn new(id: &str, priority: PanelPriority) -> Self {
        Self {
            id: id.to_string(),
            title: None,
            priority: Some(priority),
            transition_ms: None,
        }
    }

    pub fn priority(&self) -> PanelPriority {
        self.priority.unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms.unwrap_or(DEFAULT_TRANSITION_MS))
    }
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_TRANSITION_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_TRANSITION_MS: u64 = 400;
pub const DEFAULT_LOG_FILE: &str = "screenstack.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

/// Demo windows used when the config declares none.
pub fn default_windows() -> Vec<WindowEntry> {
    vec![
        WindowEntry::new("Inventory"),
        WindowEntry::new("Settings"),
        WindowEntry {
            title: Some("World Map".to_string()),
            lost_foreground: Some(LostForeground::StayOpen),
            ..WindowEntry::new("Map")
        },
        WindowEntry {
            queue_priority: Some(QueuePriority::Enqueue),
            ..WindowEntry::new("Mail")
        },
        WindowEntry {
            title: Some("Are you sure?".to_string()),
            popup: Some(true),
            transition_ms: Some(250),
            ..WindowEntry::new("Confirm")
        },
        WindowEntry {
            title: Some("Title Screen".to_string()),
            take_foreground: Some(TakeForeground::CloseAll),
            ..WindowEntry::new("Title")
        },
    ]
}

/// Demo panels used when the config declares none.
pub fn default_panels() -> Vec<PanelEntry> {
    vec![
        PanelEntry::new("Hud", PanelPriority::Default),
        PanelEntry::new("Quest", PanelPriority::Priority),
        PanelEntry {
            transition_ms: Some(200),
            ..PanelEntry::new("Toast", PanelPriority::SuperPriority)
        },
    ]
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// `None` disables the stalled-transition watchdog.
    pub transition_timeout: Option<Duration>,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    pub animate: bool,
    pub para_layers: Vec<PanelPriority>,
    pub windows: Vec<WindowEntry>,
    pub panels: Vec<PanelEntry>,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub transition_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
    pub no_animate: bool,
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

/// Returns the path to `~/.screenstack/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".screenstack").join("config.toml"))
}

/// Load config from `~/.screenstack/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `StackConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<StackConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(StackConfig::default())
        }
    }
}

/// Same as [`load_config`] for an explicit path.
pub fn load_config_from(path: &Path) -> Result<StackConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(StackConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: StackConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# screenstack configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# transition_timeout_ms = 5000       # 0 disables the stalled-transition watchdog
# log_level = "debug"                # "off", "error", "warn", "info", "debug", "trace"
# log_file = "screenstack.log"
# animate = true

# [layout]
# para_layers = ["default", "priority", "super_priority"]

# [[windows]]
# id = "Inventory"
# title = "Inventory"
# popup = false
# queue_priority = "force_foreground" # or "enqueue"
# lost_foreground = "hide"            # "stay_open", "hide", "close"
# take_foreground = "none"            # "none", "close_previous", "close_all"
# transition_ms = 400

# [[panels]]
# id = "Hud"
# priority = "default"                # "default", "priority", "super_priority"
# transition_ms = 400
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
pub fn resolve(config: &StackConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Timeout: CLI → env → config → default
    let timeout_ms = cli
        .transition_timeout_ms
        .or_else(|| env_parse("SCREENSTACK_TRANSITION_TIMEOUT_MS"))
        .or(config.general.transition_timeout_ms)
        .unwrap_or(DEFAULT_TRANSITION_TIMEOUT_MS);
    let transition_timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));

    // Log level: CLI → env → config → default
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("SCREENSTACK_LOG_LEVEL").ok())
        .or_else(|| config.general.log_level.clone())
        .map(|level| parse_level(&level))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    // Log file: env → config → default
    let log_file = std::env::var("SCREENSTACK_LOG_FILE")
        .ok()
        .or_else(|| config.general.log_file.clone())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    let animate = !cli.no_animate && config.general.animate.unwrap_or(true);

    let para_layers = config
        .layout
        .para_layers
        .clone()
        .unwrap_or_else(|| ALL_PRIORITIES.to_vec());

    let windows = if config.windows.is_empty() {
        default_windows()
    } else {
        config.windows.clone()
    };
    let panels = if config.panels.is_empty() {
        default_panels()
    } else {
        config.panels.clone()
    };

    ResolvedConfig {
        transition_timeout,
        log_level,
        log_file,
        animate,
        para_layers,
        windows,
        panels,
    }
}

fn env_parse(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or_else(|_| {
        warn!("Unknown log level {:?}, using {}", level, DEFAULT_LOG_LEVEL);
        DEFAULT_LOG_LEVEL
    })
}
