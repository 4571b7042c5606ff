//! Engine and API configuration
//!
//! Business thresholds (risk age band, withdrawal size, CLV multipliers, ...)
//! are illustrative constants rather than calibrated figures, so they live in
//! a TOML file instead of the code.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/churninsight/config/insight.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Every section is optional and every key inside a section is optional;
//! missing values keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Country;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/insight.toml");

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "CHURNINSIGHT_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub predict_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            predict_timeout_secs: 30,
            read_timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn predict_timeout(&self) -> Duration {
        Duration::from_secs(self.predict_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Thresholds shared by the insight selector and the risk factor table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    pub risk_age_min: u32,
    pub risk_age_max: u32,
    pub product_overload_min: u32,
    pub high_risk_country: Country,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            risk_age_min: 40,
            risk_age_max: 70,
            product_overload_min: 3,
            high_risk_country: Country::Germany,
        }
    }
}

impl InsightThresholds {
    pub fn in_risk_age(&self, age: u32) -> bool {
        (self.risk_age_min..=self.risk_age_max).contains(&age)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFactorThresholds {
    pub withdrawal_threshold: f64,
}

impl Default for RiskFactorThresholds {
    fn default() -> Self {
        Self {
            withdrawal_threshold: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentThresholds {
    pub premium_balance: f64,
    pub premium_salary: f64,
    pub young_age_below: u32,
    pub young_products_max: u32,
    pub senior_age_above: u32,
    pub senior_products_min: u32,
}

impl Default for SegmentThresholds {
    fn default() -> Self {
        Self {
            premium_balance: 100_000.0,
            premium_salary: 150_000.0,
            young_age_below: 35,
            young_products_max: 2,
            senior_age_above: 55,
            senior_products_min: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyWeights {
    pub high_probability: f64,
    pub high_probability_points: u32,
    pub recent_inactive_points: u32,
    pub withdrawal_points: u32,
    pub complaint_points: u32,
    pub product_cancellation_points: u32,
    pub immediate_above: u32,
    pub short_term_above: u32,
}

impl Default for UrgencyWeights {
    fn default() -> Self {
        Self {
            high_probability: 0.8,
            high_probability_points: 40,
            recent_inactive_points: 20,
            withdrawal_points: 15,
            complaint_points: 15,
            product_cancellation_points: 10,
            immediate_above: 70,
            short_term_above: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueModel {
    pub balance_rate: f64,
    pub salary_rate: f64,
    pub months_per_year: f64,
    pub recovery_rate: f64,
}

impl Default for ValueModel {
    fn default() -> Self {
        Self {
            balance_rate: 0.03,
            salary_rate: 0.05,
            months_per_year: 12.0,
            recovery_rate: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLevelCuts {
    pub high_above: f64,
    pub moderate_above: f64,
}

impl Default for RiskLevelCuts {
    fn default() -> Self {
        Self {
            high_above: 0.7,
            moderate_above: 0.4,
        }
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub api: ApiConfig,
    pub insight: InsightThresholds,
    pub risk_factors: RiskFactorThresholds,
    pub segments: SegmentThresholds,
    pub urgency: UrgencyWeights,
    pub value: ValueModel,
    pub risk_levels: RiskLevelCuts,
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Embedded,
    File(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Embedded => write!(f, "embedded defaults"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl EngineConfig {
    /// Load from an explicit path if given, else from the override location,
    /// falling back to embedded defaults
    ///
    /// An explicit path must exist; only the override location is optional.
    pub fn load_from(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let candidate = match path {
            Some(p) if !p.exists() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let (mut config, source) = match candidate {
            Some(p) => {
                let content = fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", p.display(), e))
                })?;
                (parse_config(&content)?, ConfigSource::File(p))
            }
            None => (parse_config(DEFAULT_CONFIG)?, ConfigSource::Embedded),
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api.base_url = url;
            }
        }

        tracing::debug!(source = %source, "Loaded engine config");
        Ok((config, source))
    }

    /// Embedded defaults only (for tests and offline use)
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("churninsight").join("config").join("insight.toml"))
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let config: EngineConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let insight = &config.insight;
    if insight.risk_age_min > insight.risk_age_max {
        return Err(Error::Config(format!(
            "insight.risk_age_min ({}) is above risk_age_max ({})",
            insight.risk_age_min, insight.risk_age_max
        )));
    }
    if config.value.months_per_year <= 0.0 {
        return Err(Error::Config("value.months_per_year must be positive".into()));
    }
    if config.urgency.short_term_above > config.urgency.immediate_above {
        return Err(Error::Config(
            "urgency.short_term_above must not exceed immediate_above".into(),
        ));
    }

    Ok(config)
}
