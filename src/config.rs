// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::{EnrichMode, Verdict};
use crate::storage::LocalStorage;
use anyhow::Result;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;

fn default_marker_file() -> String {
    "good_bad_time.ics".to_string()
}
fn default_taboo_file() -> String {
    "pengzu_100_taboos.ics".to_string()
}
fn default_target_file() -> String {
    "cal_trunkBranch.ics".to_string()
}
fn default_enhanced_file() -> String {
    "cal_trunkBranch_enhanced.ics".to_string()
}
fn default_auspicious_file() -> String {
    "cal_trunkBranch_auspicious.ics".to_string()
}
fn default_inauspicious_file() -> String {
    "cal_trunkBranch_inauspicious.ics".to_string()
}

fn default_auspicious_name() -> String {
    "Auspicious Times".to_string()
}
fn default_inauspicious_name() -> String {
    "Inauspicious Times".to_string()
}

fn default_log_file() -> String {
    "enhancement_log.txt".to_string()
}

fn default_max_samples() -> usize {
    5
}
fn default_max_warnings_shown() -> usize {
    5
}
fn default_max_warnings_logged() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default = "default_marker_file")]
    pub marker_file: String,
    #[serde(default = "default_taboo_file")]
    pub taboo_file: String,
    #[serde(default = "default_target_file")]
    pub target_file: String,
    #[serde(default = "default_enhanced_file")]
    pub enhanced_file: String,
    #[serde(default = "default_auspicious_file")]
    pub auspicious_file: String,
    #[serde(default = "default_inauspicious_file")]
    pub inauspicious_file: String,

    #[serde(default = "default_auspicious_name")]
    pub auspicious_name: String,
    #[serde(default = "default_inauspicious_name")]
    pub inauspicious_name: String,

    /// Plain-text copy of the run report. Empty disables it.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default)]
    pub mode: EnrichMode,

    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    #[serde(default = "default_max_warnings_shown")]
    pub max_warnings_shown: usize,
    #[serde(default = "default_max_warnings_logged")]
    pub max_warnings_logged: usize,

    #[serde(default = "default_log_level")]
    pub log_level: String, // off, error, warn, info, debug, trace
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker_file: default_marker_file(),
            taboo_file: default_taboo_file(),
            target_file: default_target_file(),
            enhanced_file: default_enhanced_file(),
            auspicious_file: default_auspicious_file(),
            inauspicious_file: default_inauspicious_file(),
            auspicious_name: default_auspicious_name(),
            inauspicious_name: default_inauspicious_name(),
            log_file: default_log_file(),
            mode: EnrichMode::default(),
            max_samples: default_max_samples(),
            max_warnings_shown: default_max_warnings_shown(),
            max_warnings_logged: default_max_warnings_logged(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration using an explicit context.
    ///
    /// A missing file is not an error: every field has a default. Read and
    /// parse failures are reported with the file path.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration to `shichen.toml` in the working directory.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_local_config_path()?;
        let toml_str = toml::to_string_pretty(self)?;
        LocalStorage::atomic_write(&path, toml_str)?;
        Ok(())
    }

    pub fn log_file(&self) -> Option<&str> {
        let name = self.log_file.trim();
        (!name.is_empty()).then_some(name)
    }

    /// Unknown level names fall back to `Info`.
    pub fn log_level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn output_file(&self, verdict: Verdict) -> &str {
        match verdict {
            Verdict::Auspicious => &self.auspicious_file,
            Verdict::Inauspicious => &self.inauspicious_file,
        }
    }

    pub fn calendar_name(&self, verdict: Verdict) -> &str {
        match verdict {
            Verdict::Auspicious => &self.auspicious_name,
            Verdict::Inauspicious => &self.inauspicious_name,
        }
    }
}
