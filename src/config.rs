use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub hkjc: HkjcConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port the API server listens on (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path of the JSON snapshot holding historical draws
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

fn default_snapshot_path() -> String {
    "data/marksix-historical-data.json".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HkjcConfig {
    /// HKJC GraphQL endpoint
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    /// First draw date to request (the lottery's records begin in 1993)
    #[serde(default = "default_start_date")]
    pub start_date: String,
    /// Delay between 3-month window requests in milliseconds
    #[serde(default = "default_window_delay_ms")]
    pub window_delay_ms: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_graphql_url() -> String {
    "https://info.cld.hkjc.com/graphql/base/".to_string()
}

fn default_start_date() -> String {
    "1993-01-01".to_string()
}

fn default_window_delay_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for HkjcConfig {
    fn default() -> Self {
        Self {
            graphql_url: default_graphql_url(),
            start_date: default_start_date(),
            window_delay_ms: default_window_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacktestConfig {
    /// Default number of tail cases surfaced by the detailed report
    #[serde(default = "default_case_limit")]
    pub default_case_limit: usize,
    /// Hard cap on the requested case limit
    #[serde(default = "default_max_case_limit")]
    pub max_case_limit: usize,
}

fn default_case_limit() -> usize {
    50
}

fn default_max_case_limit() -> usize {
    500
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            default_case_limit: default_case_limit(),
            max_case_limit: default_max_case_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("server.port", 3000)?
            .set_default("backtest.default_case_limit", 50)?
            .set_default("backtest.max_case_limit", 500)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("MARKSIX_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (MARKSIX_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("MARKSIX")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.data.snapshot_path.trim().is_empty() {
            errors.push("data.snapshot_path must not be empty".to_string());
        }

        if self.hkjc.graphql_url.trim().is_empty() {
            errors.push("hkjc.graphql_url must not be empty".to_string());
        }

        if chrono::NaiveDate::parse_from_str(&self.hkjc.start_date, "%Y-%m-%d").is_err() {
            errors.push(format!(
                "hkjc.start_date is not a YYYY-MM-DD date: {}",
                self.hkjc.start_date
            ));
        }

        if self.backtest.default_case_limit == 0 {
            errors.push("backtest.default_case_limit must be positive".to_string());
        }

        if self.backtest.max_case_limit < self.backtest.default_case_limit {
            errors.push(format!(
                "backtest.max_case_limit ({}) is below default_case_limit ({})",
                self.backtest.max_case_limit, self.backtest.default_case_limit
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data: DataConfig::default(),
            hkjc: HkjcConfig::default(),
            backtest: BacktestConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
