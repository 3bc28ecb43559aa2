use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::ProviderEndpoints;
use crate::models::settings::ProviderKind;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://resume-architect.db?mode=rwc";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub notification_ttl: Duration,
    pub provider_timeout: Duration,
    /// Sent as `HTTP-Referer` to OpenRouter and allowed by CORS.
    pub app_origin: String,
    pub endpoints: ProviderEndpoints,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let mut endpoints = ProviderEndpoints::default();
        for kind in ProviderKind::ALL {
            let key = format!("{}_BASE_URL", kind.as_str().to_uppercase());
            if let Some(url) = get(&key).filter(|u| !u.is_empty()) {
                endpoints = endpoints.with_override(kind, url);
            }
        }

        Ok(Config {
            database_url: var("DATABASE_URL", DEFAULT_DATABASE_URL),
            port: parse_var(&var("PORT", "8080"), "PORT")?,
            rust_log: var("RUST_LOG", "info"),
            notification_ttl: Duration::from_millis(parse_var(
                &var("NOTIFICATION_TTL_MS", "3000"),
                "NOTIFICATION_TTL_MS",
            )?),
            provider_timeout: Duration::from_secs(parse_var(
                &var("PROVIDER_TIMEOUT_SECS", "120"),
                "PROVIDER_TIMEOUT_SECS",
            )?),
            app_origin: var("APP_ORIGIN", "http://localhost:5173"),
            endpoints,
        })
    }
}

fn parse_var<T: std::str::FromStr>(value: &str, key: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.port, 8080);
        assert_eq!(config.notification_ttl, Duration::from_millis(3000));
        assert_eq!(config.provider_timeout, Duration::from_secs(120));
        assert_eq!(
            config.endpoints.base_url(ProviderKind::OpenRouter),
            "https://openrouter.ai/api/v1"
        );
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("OPENROUTER_BASE_URL", "http://localhost:1234/v1"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.endpoints.base_url(ProviderKind::OpenRouter),
            "http://localhost:1234/v1"
        );
    }

    #[test]
    fn test_bad_port_fails() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
