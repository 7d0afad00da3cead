use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub stability: StabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Vendor settings. `api_key` stays `None` until configured; `/render`
/// refuses to run without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            results_dir: default_results_dir(),
            uploads_dir: default_uploads_dir(),
            public_dir: default_public_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine: default_engine(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_results_dir() -> String {
    "results".to_string()
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_max_upload_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_engine() -> String {
    "core".to_string()
}

fn default_base_url() -> String {
    "https://api.stability.ai".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}
