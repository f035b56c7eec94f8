use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::scoring::{ScoringTables, TablesError};

/// Distinguishes runtime behavior for different stages of the scorer's host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for embedding the form scorer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub scoring: ScoringConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let tables_path = match env::var("FORM_SCORER_TABLES") {
            Ok(raw) if raw.trim().is_empty() => return Err(ConfigError::EmptyTablesPath),
            Ok(raw) => Some(PathBuf::from(raw.trim())),
            Err(_) => None,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            scoring: ScoringConfig { tables_path },
            telemetry: TelemetryConfig { log_level },
        })
    }

    /// Resolve the scoring tables: the configured JSON override, or the standard set.
    pub fn scoring_tables(&self) -> Result<ScoringTables, TablesError> {
        match &self.scoring.tables_path {
            Some(path) => ScoringTables::from_path(path),
            None => Ok(ScoringTables::standard()),
        }
    }
}

/// Where the skill templates and thresholds come from.
#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    pub tables_path: Option<PathBuf>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyTablesPath,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyTablesPath => {
                write!(f, "FORM_SCORER_TABLES must name a JSON file when set")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
