use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub course_api_url: String,
    pub course_api_token: Option<String>,
    pub course_api_timeout: Duration,
    pub view_idle_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            course_api_url: require_env("COURSE_API_URL")?,
            course_api_token: std::env::var("COURSE_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            course_api_timeout: Duration::from_secs(
                std::env::var("COURSE_API_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse::<u64>()
                    .context("COURSE_API_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            view_idle_ttl: Duration::from_secs(
                std::env::var("VIEW_IDLE_TTL_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse::<u64>()
                    .context("VIEW_IDLE_TTL_SECS must be a whole number of seconds")?,
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
