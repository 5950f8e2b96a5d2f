//! Application configuration

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub viewer: ViewerConfig,
    pub filer: FilerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub start_mode: ViewerMode,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            start_mode: ViewerMode::Full,
        }
    }
}

/// How the viewer was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewerMode {
    /// Opened from the library browser; closing returns to it
    #[serde(rename = "full")]
    Full,
    /// Opened directly on a file; the folder is scanned for siblings
    #[serde(rename = "single")]
    Single,
}

/// Picture viewer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub max_scale: f64,
    pub min_scale_floor: f64,
    /// Relative scale change per zoom step
    pub scale_step: f64,
    /// Pan distance of one arrow key press
    pub move_step: f64,
    /// Margin subtracted from each viewport axis when fitting a picture
    pub fit_margin: f64,
    /// Smallest fitting extent per axis
    pub fit_min_extent: f64,
    pub slide_duration_ms: u64,
    pub slide_start_delay_ms: u64,
    pub slide_tick_ms: u64,
    pub loading_tip_delay_ms: u64,
    /// Poll interval of the loader while it waits for a decode
    pub load_poll_ms: u64,
    pub swipe_min_distance: f64,
    pub swipe_max_idle_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_scale: 5.0,
            min_scale_floor: 0.05,
            scale_step: 0.333,
            move_step: 50.0,
            fit_margin: 120.0,
            fit_min_extent: 200.0,
            slide_duration_ms: 200,
            slide_start_delay_ms: 20,
            slide_tick_ms: 10,
            loading_tip_delay_ms: 300,
            load_poll_ms: 1000,
            swipe_min_distance: 80.0,
            swipe_max_idle_ms: 100,
        }
    }
}

impl ViewerConfig {
    pub fn slide_duration(&self) -> Duration {
        Duration::from_millis(self.slide_duration_ms)
    }

    pub fn slide_start_delay(&self) -> Duration {
        Duration::from_millis(self.slide_start_delay_ms)
    }

    pub fn slide_tick(&self) -> Duration {
        Duration::from_millis(self.slide_tick_ms)
    }

    pub fn loading_tip_delay(&self) -> Duration {
        Duration::from_millis(self.loading_tip_delay_ms)
    }

    pub fn load_poll(&self) -> Duration {
        Duration::from_millis(self.load_poll_ms)
    }

    pub fn swipe_max_idle(&self) -> Duration {
        Duration::from_millis(self.swipe_max_idle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilerConfig {
    pub confirm_delete: bool,
    pub use_recycle_bin: bool,
}

impl Default for FilerConfig {
    fn default() -> Self {
        Self {
            confirm_delete: true,
            use_recycle_bin: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file; a missing file yields the defaults
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("org", "lc-soft", "LC-Finder")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}
