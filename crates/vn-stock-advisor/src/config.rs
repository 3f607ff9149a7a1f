//! Configuration for price fetching and reporting

use crate::error::{Result, StockError};
use crate::report::Language;
use agent_utils::{env_or, env_parse};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Calendar days of history fetched per analysis
pub const ENV_HISTORY_DAYS: &str = "VN_STOCK_HISTORY_DAYS";
/// Report language code (`vi`, `en`)
pub const ENV_LANGUAGE: &str = "VN_STOCK_LANGUAGE";
/// Exchange suffix appended to bare tickers; empty disables it
pub const ENV_SYMBOL_SUFFIX: &str = "VN_STOCK_SYMBOL_SUFFIX";
/// Lifetime of cached price histories, in seconds
pub const ENV_CACHE_TTL_SECS: &str = "VN_STOCK_CACHE_TTL_SECS";

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Calendar days of history requested from the provider
    pub history_days: u32,

    /// Suffix appended to bare tickers before querying Yahoo Finance
    pub symbol_suffix: Option<String>,

    /// Report language
    pub language: Language,

    /// Cache TTL for price histories
    pub cache_ttl: Duration,

    /// Maximum number of retries for API calls
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Requests per minute allowed towards the price provider
    pub rate_limit_per_minute: u32,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            history_days: 200,
            symbol_suffix: Some(".VN".to_string()),
            language: Language::default(),
            cache_ttl: Duration::from_secs(300), // 5 minutes
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            rate_limit_per_minute: 60,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Defaults overridden by `VN_STOCK_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.history_days == 0 {
            return Err(StockError::ConfigError(
                "history_days must be greater than 0".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(StockError::ConfigError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(StockError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get retry backoff duration for attempt number
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2_u32.pow(attempt)
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    history_days: Option<u32>,
    symbol_suffix: Option<Option<String>>,
    language: Option<Language>,
    cache_ttl: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
}

impl StockConfigBuilder {
    pub fn history_days(mut self, days: u32) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Set the exchange suffix; `None` sends tickers unchanged
    pub fn symbol_suffix(mut self, suffix: Option<String>) -> Self {
        self.symbol_suffix = Some(suffix);
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Set cache TTL for price histories
    pub fn cache_ttl(mut self, duration: Duration) -> Self {
        self.cache_ttl = Some(duration);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Apply `VN_STOCK_*` environment overrides
    ///
    /// Unset variables leave the builder untouched; a set but malformed
    /// variable is a configuration error.
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(days) = env_parse::<u32>(ENV_HISTORY_DAYS).map_err(StockError::ConfigError)? {
            self.history_days = Some(days);
        }

        let language = env_or(ENV_LANGUAGE, "");
        if !language.is_empty() {
            let parsed = Language::from_code(&language).ok_or_else(|| {
                StockError::ConfigError(format!("{ENV_LANGUAGE}: unsupported language '{language}'"))
            })?;
            self.language = Some(parsed);
        }

        if let Ok(suffix) = std::env::var(ENV_SYMBOL_SUFFIX) {
            let suffix = suffix.trim();
            self.symbol_suffix = Some((!suffix.is_empty()).then(|| suffix.to_string()));
        }

        if let Some(secs) = env_parse::<u64>(ENV_CACHE_TTL_SECS).map_err(StockError::ConfigError)? {
            self.cache_ttl = Some(Duration::from_secs(secs));
        }

        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            history_days: self.history_days.unwrap_or(defaults.history_days),
            symbol_suffix: self.symbol_suffix.unwrap_or(defaults.symbol_suffix),
            language: self.language.unwrap_or(defaults.language),
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.history_days, 200);
        assert_eq!(config.symbol_suffix.as_deref(), Some(".VN"));
        assert_eq!(config.language, Language::Vietnamese);
        assert_eq!(config.max_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .history_days(400)
            .symbol_suffix(None)
            .language(Language::English)
            .max_retries(5)
            .request_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.history_days, 400);
        assert!(config.symbol_suffix.is_none());
        assert_eq!(config.language, Language::English);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_validation() {
        assert!(StockConfig::builder().history_days(0).build().is_err());
        assert!(StockConfig::builder().max_retries(0).build().is_err());
        assert!(StockConfig::builder().rate_limit_per_minute(0).build().is_err());
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: these variables are only touched by this test.
        unsafe {
            std::env::set_var(ENV_HISTORY_DAYS, "365");
            std::env::set_var(ENV_LANGUAGE, "en");
            std::env::set_var(ENV_SYMBOL_SUFFIX, "");
            std::env::set_var(ENV_CACHE_TTL_SECS, "10");
        }

        let config = StockConfig::from_env().unwrap();
        assert_eq!(config.history_days, 365);
        assert_eq!(config.language, Language::English);
        assert!(config.symbol_suffix.is_none());
        assert_eq!(config.cache_ttl, Duration::from_secs(10));

        unsafe {
            std::env::set_var(ENV_HISTORY_DAYS, "many");
        }
        assert!(matches!(
            StockConfig::from_env(),
            Err(StockError::ConfigError(_))
        ));

        unsafe {
            std::env::remove_var(ENV_HISTORY_DAYS);
            std::env::remove_var(ENV_LANGUAGE);
            std::env::remove_var(ENV_SYMBOL_SUFFIX);
            std::env::remove_var(ENV_CACHE_TTL_SECS);
        }
    }

    #[test]
    fn test_retry_backoff() {
        let config = StockConfig::default();
        assert_eq!(config.retry_backoff(0), Duration::from_secs(1));
        assert_eq!(config.retry_backoff(1), Duration::from_secs(2));
        assert_eq!(config.retry_backoff(2), Duration::from_secs(4));
    }
}
