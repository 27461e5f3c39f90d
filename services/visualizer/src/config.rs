//! Configuration for the visualizer API

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Visualizer API configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Dataset location and load options
    pub dataset: DatasetConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Monitoring configuration
    pub monitoring: MonitoringConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Enable response compression
    pub compression: bool,
}

/// Dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the CSV file, read on every request
    pub path: String,
    /// Field delimiter
    pub delimiter: char,
    /// Columns that must hold datetimes
    pub datetime_columns: Vec<String>,
    /// Convert any text column that parses entirely as datetimes
    pub detect_datetimes: bool,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins, `*` for any
    pub allowed_origins: Vec<String>,
    /// Allowed methods, `*` for any
    pub allowed_methods: Vec<String>,
    /// Allowed headers, `*` for any
    pub allowed_headers: Vec<String>,
    /// Allow credentials
    pub allow_credentials: bool,
    /// Max age for preflight requests
    pub max_age_seconds: u64,
}

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Health check endpoint path
    pub health_path: String,
    /// Enable HTTP request tracing
    pub tracing_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            timeout_seconds: 30,
            compression: true,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "data/iris.csv".to_string(),
            delimiter: ',',
            datetime_columns: Vec::new(),
            detect_datetimes: true,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string()],
            allowed_headers: vec!["*".to_string()],
            allow_credentials: true,
            max_age_seconds: 600,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            health_path: "/health".to_string(),
            tracing_enabled: true,
        }
    }
}

impl VisualizerConfig {
    /// Load configuration from file, overlaid with `VISUALIZER_*` environment variables
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("VISUALIZER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Get server address
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_front_end() {
        let config = VisualizerConfig::default();
        assert_eq!(config.server_address(), "127.0.0.1:5000");
        assert_eq!(config.cors.allowed_methods, vec!["GET", "POST"]);
        assert_eq!(config.monitoring.health_path, "/health");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 8088\n\n[dataset]\npath = \"flowers.csv\"\ndatetime_columns = [\"seen_at\"]"
        )
        .unwrap();

        let config = VisualizerConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.dataset.path, "flowers.csv");
        assert_eq!(config.dataset.datetime_columns, vec!["seen_at"]);
        assert!(config.dataset.detect_datetimes);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(VisualizerConfig::from_file("/no/such/visualizer.toml").is_err());
    }
}
