use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_SEED: u64 = 20_252_026;

/// Distinguishes runtime behavior for different stages of the tool.
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

/// Top-level configuration for a generation run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub paths: PathConfig,
    pub generation: GenerationConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_dir = env::var("BULLETINS_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let output_dir =
            env::var("BULLETINS_OUTPUT_DIR").unwrap_or_else(|_| "output".to_string());
        let template_dir = env::var("BULLETINS_TEMPLATE_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let seed = match env::var("BULLETINS_SEED") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed(raw))?,
            Err(_) => DEFAULT_SEED,
        };

        let pdf_enabled = match env::var("BULLETINS_PDF") {
            Ok(raw) => parse_toggle(&raw).ok_or(ConfigError::InvalidToggle {
                name: "BULLETINS_PDF",
                value: raw,
            })?,
            Err(_) => true,
        };
        let pdf_command =
            env::var("BULLETINS_PDF_COMMAND").unwrap_or_else(|_| "weasyprint".to_string());

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            paths: PathConfig {
                data_dir: PathBuf::from(data_dir),
                output_dir: PathBuf::from(output_dir),
                template_dir,
            },
            generation: GenerationConfig {
                seed,
                pdf_enabled,
                pdf_command,
                reset: false,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where inputs are read from and documents are written to.
#[derive(Debug, Clone)]
pub struct PathConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub template_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Seed of the single random stream drawn during score pre-computation.
    pub seed: u64,
    pub pdf_enabled: bool,
    pub pdf_command: String,
    /// Discard every previously generated document before the run.
    pub reset: bool,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSeed(String),
    InvalidToggle { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSeed(raw) => {
                write!(f, "BULLETINS_SEED must be an unsigned 64-bit integer, got '{raw}'")
            }
            ConfigError::InvalidToggle { name, value } => {
                write!(f, "{name} must be one of on/off/true/false/1/0, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
