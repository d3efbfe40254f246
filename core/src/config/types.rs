use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub http_server: HttpServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub suite: SuiteConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Empty disables authentication.
    #[serde(default)]
    pub required_token: String,
}

impl AuthConfig {
    pub fn token(&self) -> Option<&str> {
        let t = self.required_token.trim();
        (!t.is_empty()).then_some(t)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default = "default_results_retention_seconds")]
    pub results_retention_seconds: u64,

    #[serde(default = "default_max_parallel_tests")]
    pub max_parallel_tests: usize,

    #[serde(default = "default_retry_after_secs")]
    pub retry_after_secs: u64,
}

fn default_results_retention_seconds() -> u64 {
    600
}

fn default_max_parallel_tests() -> usize {
    8
}

fn default_retry_after_secs() -> u64 {
    10
}

impl SuiteConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.results_retention_seconds)
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            results_retention_seconds: default_results_retention_seconds(),
            max_parallel_tests: default_max_parallel_tests(),
            retry_after_secs: default_retry_after_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum ExecutorConfig {
    #[serde(rename = "directline")]
    DirectLine(DirectLineConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectLineConfig {
    #[serde(default = "default_directline_url")]
    pub base_url: String,

    #[serde(default)]
    pub secret: String,

    /// Named secrets, selected by a test's `bot` field.
    #[serde(default)]
    pub bots: HashMap<String, String>,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_test_timeout_ms")]
    pub default_timeout_ms: u64,
}

fn default_directline_url() -> String {
    "https://directline.botframework.com".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_test_timeout_ms() -> u64 {
    30_000
}

impl Default for DirectLineConfig {
    fn default() -> Self {
        Self {
            base_url: default_directline_url(),
            secret: String::new(),
            bots: HashMap::new(),
            poll_interval_ms: default_poll_interval_ms(),
            default_timeout_ms: default_test_timeout_ms(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig::DirectLine(DirectLineConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Non-empty also writes daily rolling log files here.
    #[serde(default)]
    pub directory: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
        }
    }
}
