use crate::calendar::HolidayRegion;
use crate::schedule::BUSINESS_DAYS_PER_MONTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs};
use thiserror::Error;

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV_VAR: &str = "NAF_PLANNER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Years of holidays fetched beyond the start year, so chains that run
    /// into later years still skip them.
    pub holiday_lookahead_years: u32,
    pub business_days_per_month: f64,
    pub default_region: HolidayRegion,
    /// Milestone lines listed in the markdown report.
    pub report_item_limit: usize,
    /// Rows drawn on the Gantt chart.
    pub gantt_row_limit: usize,
    pub logging: LoggingConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            holiday_lookahead_years: 3,
            business_days_per_month: BUSINESS_DAYS_PER_MONTH,
            default_region: HolidayRegion::None,
            report_item_limit: 15,
            gantt_row_limit: 100,
            logging: LoggingConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Loads from `$NAF_PLANNER_CONFIG` when set, otherwise returns defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load_from_path(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let s = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;
        let config: PlannerConfig = toml::from_str(&s)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig =
            toml::from_str(s).map_err(|e| ConfigError::ParseError("<inline>".to_string(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.business_days_per_month.is_finite() || self.business_days_per_month <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "business_days_per_month must be positive (got {})",
                self.business_days_per_month
            )));
        }
        if self.gantt_row_limit == 0 {
            return Err(ConfigError::Invalid(
                "gantt_row_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
