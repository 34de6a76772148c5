//! Configuration types.
//!
//! Loads settings from config.json at startup. Provides recognition engine
//! lookup paths, segmentation tuning, the classification endpoint and
//! output switches.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::pipeline::RecognitionMode;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Settings for the Tesseract recognizer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Explicit path to the tesseract executable. Searched on PATH when unset.
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory. Tesseract's own default is used when unset.
    pub tessdata_dir: Option<PathBuf>,
    /// Language used when the caller gives no hint
    pub language: String,
    /// Tesseract `--psm` value (3 = fully automatic page segmentation)
    pub page_segmentation_mode: u8,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            language: "eng".to_string(),
            page_segmentation_mode: 3,
        }
    }
}

/// Settings for thresholding and region handling.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Whether regions or the whole binarized frame are sent to recognition
    pub mode: RecognitionMode,
    /// Regions narrower than this are dropped before recognition (1 keeps all)
    pub min_region_width: u32,
    /// Maximum number of regions recognized concurrently
    pub workers: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            mode: RecognitionMode::Regions,
            min_region_width: 1,
            workers: 4,
        }
    }
}

/// Settings for the remote classification service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Endpoint accepting `{"text": ...}`. Classification is skipped when unset.
    pub api_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Save every binarized frame as a PNG in the output directory
    pub save_binarized: bool,
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub recognition: RecognitionConfig,
    pub segmentation: SegmentationConfig,
    pub classification: ClassificationConfig,
    pub output: OutputConfig,
}

/// Returns the default config location: `config.json` next to the executable.
pub fn default_config_path() -> PathBuf {
    crate::paths::get_exe_dir().join("config.json")
}

/// Reads and parses a config file. Fails if the file is missing or invalid.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Loads configuration from `path`, or returns defaults when it can't be used.
fn load_config(path: &Path) -> AppConfig {
    log::info!("Looking for config at: {}", path.display());

    if !path.exists() {
        log::info!("{} not found. Using default config.", path.display());
        return AppConfig::default();
    }

    match load_config_from(path) {
        Ok(config) => {
            log::info!("Config loaded from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("{:#}. Using defaults.", e);
            AppConfig::default()
        }
    }
}

/// Initializes the global configuration. Call once at startup.
///
/// Uses `path` when given, otherwise `config.json` next to the executable.
pub fn init_config(path: Option<&Path>) {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let _ = CONFIG.set(load_config(&path));
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}
