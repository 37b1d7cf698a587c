use std::path::PathBuf;
use std::time::Duration;

use crate::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    pub log_format: LogFormat,
    pub python_bin: String,
    pub forecast_script: PathBuf,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub analysis_timeout: Duration,
    pub max_concurrent_analyses: usize,
    pub token_ttl: chrono::Duration,
    pub refresh_token_ttl: chrono::Duration,
    pub page_size: usize,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_origin: "http://localhost:5173".to_string(),
            log_format: LogFormat::Pretty,
            python_bin: "python".to_string(),
            forecast_script: PathBuf::from("ml_backend/model/spike_forecast.py"),
            upload_dir: PathBuf::from("ml_backend/uploads"),
            output_dir: PathBuf::from("ml_backend/outputs"),
            analysis_timeout: Duration::from_secs(300),
            max_concurrent_analyses: 1,
            token_ttl: chrono::Duration::hours(24),
            refresh_token_ttl: chrono::Duration::hours(48),
            page_size: 10,
            max_body_bytes: 50 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparsable or zero values
    /// fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let positive = |key: &str| parsed(key).filter(|v| *v > 0);

        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
            python_bin: lookup("PYTHON_BIN").unwrap_or(defaults.python_bin),
            forecast_script: lookup("FORECAST_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or(defaults.forecast_script),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            analysis_timeout: positive("ANALYSIS_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.analysis_timeout),
            max_concurrent_analyses: positive("MAX_CONCURRENT_ANALYSES")
                .map(|v| v as usize)
                .unwrap_or(defaults.max_concurrent_analyses),
            token_ttl: positive("TOKEN_TTL_HOURS")
                .map(|h| chrono::Duration::hours(h as i64))
                .unwrap_or(defaults.token_ttl),
            refresh_token_ttl: positive("REFRESH_TOKEN_TTL_HOURS")
                .map(|h| chrono::Duration::hours(h as i64))
                .unwrap_or(defaults.refresh_token_ttl),
            page_size: positive("PAGE_SIZE")
                .map(|v| v as usize)
                .unwrap_or(defaults.page_size),
            max_body_bytes: positive("MAX_BODY_BYTES")
                .map(|v| v as usize)
                .unwrap_or(defaults.max_body_bytes),
        }
    }
}
