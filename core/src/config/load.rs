use std::path::Path;
use std::str::FromStr;

use crate::errors::ConfigError;

use super::types::{AppConfig, ExecutorConfig};

/// Loads `config.toml` from the working directory if present, then applies
/// environment overrides.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    let path = Path::new("config.toml");
    load(path.exists().then_some(path))
}

/// Defaults, then the file at `path` (which must exist when given), then
/// environment overrides.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut cfg = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.display().to_string()));
            }
            let s = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                path: p.display().to_string(),
                source,
            })?;
            toml::from_str::<AppConfig>(&s).map_err(|e| ConfigError::Parse(e.into()))?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Applies `PORT`, `HOST`, `REQUIRED_AUTH_TOKEN`, `DIRECTLINE_SECRET`,
/// `DIRECTLINE_BASE_URL` and `RESULTS_RETENTION_SECONDS`. Blank values are
/// ignored.
pub fn apply_env_overrides(
    cfg: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("PORT") {
        cfg.http_server.port = parse_env("PORT", &v)?;
    }
    if let Some(v) = get("HOST") {
        cfg.http_server.host = v;
    }
    if let Some(v) = get("REQUIRED_AUTH_TOKEN") {
        cfg.auth.required_token = v;
    }
    if let Some(v) = get("RESULTS_RETENTION_SECONDS") {
        cfg.suite.results_retention_seconds = parse_env("RESULTS_RETENTION_SECONDS", &v)?;
    }

    let ExecutorConfig::DirectLine(ref mut dl) = cfg.executor;
    if let Some(v) = get("DIRECTLINE_SECRET") {
        dl.secret = v;
    }
    if let Some(v) = get("DIRECTLINE_BASE_URL") {
        dl.base_url = v;
    }

    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::EnvInvalid {
            key: key.to_string(),
            source: e.into(),
        })
}

fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    if cfg.suite.max_parallel_tests == 0 {
        return Err(ConfigError::Validation(
            "suite.max_parallel_tests must be at least 1".into(),
        ));
    }
    let ExecutorConfig::DirectLine(ref dl) = cfg.executor;
    if dl.poll_interval_ms == 0 || dl.default_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "executor poll_interval_ms and default_timeout_ms must be positive".into(),
        ));
    }
    Ok(())
}
