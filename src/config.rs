//! Client configuration.
//!
//! Every knob the resilient-request layer uses lives in [`ClientConfig`].
//! The retry constants default to values tuned against one free-tier host's
//! cold-start latency; deployments with a different host should override them
//! in code or through the environment variables below.
//!
//! | Variable | Field |
//! |---|---|
//! | `PFOLIO_API_URL` | [`ClientConfig::base_url`] |
//! | `PFOLIO_BACKEND_HOSTING` | [`ClientConfig::hosting`] (`auto`, `hosted`, `local`) |
//! | `PFOLIO_WAKEUP_GRACE_MS` | [`WakeupConfig::grace_period`] |
//! | `PFOLIO_WAKEUP_RETRIES` | [`WakeupConfig::max_retries`] |
//! | `PFOLIO_REPLY_MAX_ATTEMPTS` | [`ConfirmedRetryConfig::max_attempts`] |
//! | `PFOLIO_REPLY_BACKOFF_MS` | [`ConfirmedRetryConfig::backoff_step`] |

use crate::errors::PfolioError;
use std::str::FromStr;
use std::time::Duration;

pub const BASE_URL_ENV: &str = "PFOLIO_API_URL";
pub const HOSTING_ENV: &str = "PFOLIO_BACKEND_HOSTING";
pub const WAKEUP_GRACE_ENV: &str = "PFOLIO_WAKEUP_GRACE_MS";
pub const WAKEUP_RETRIES_ENV: &str = "PFOLIO_WAKEUP_RETRIES";
pub const REPLY_MAX_ATTEMPTS_ENV: &str = "PFOLIO_REPLY_MAX_ATTEMPTS";
pub const REPLY_BACKOFF_ENV: &str = "PFOLIO_REPLY_BACKOFF_MS";

/// Backend used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Per-call timeout presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Public read paths that should fail fast (skill category lists).
    pub quick: Duration,
    /// Default for reads and small writes.
    pub standard: Duration,
    /// Calls expected to be slow on a cold hosted backend (dashboard counts,
    /// login, multipart uploads).
    pub extended: Duration,
    /// User-initiated actions with long acceptable latency (reply e-mails).
    pub long_running: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            quick: Duration::from_secs(5),
            standard: Duration::from_secs(10),
            extended: Duration::from_secs(30),
            long_running: Duration::from_secs(60),
        }
    }
}

/// Settings for the wake-up retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeupConfig {
    /// Lightweight path used as a liveness probe.
    pub health_path: String,
    pub probe_timeout: Duration,
    /// Wait after the probe before retrying the original request.
    pub grace_period: Duration,
    pub max_retries: u32,
}

impl Default for WakeupConfig {
    fn default() -> Self {
        Self {
            health_path: "/health".to_string(),
            probe_timeout: Duration::from_secs(30),
            grace_period: Duration::from_secs(3),
            max_retries: 1,
        }
    }
}

/// Settings for the user-confirmed retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedRetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_attempts: u32,
    /// Retry `n` waits `backoff_step * n`.
    pub backoff_step: Duration,
}

impl Default for ConfirmedRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_step: Duration::from_secs(2),
        }
    }
}

/// How the client decides whether the backend is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hosting {
    /// Derive it from the base URL host.
    #[default]
    Auto,
    Hosted,
    Local,
}

impl FromStr for Hosting {
    type Err = PfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "hosted" | "remote" => Ok(Self::Hosted),
            "local" => Ok(Self::Local),
            other => Err(PfolioError::InvalidInput(format!(
                "{HOSTING_ENV} must be one of auto, hosted, local (got '{other}')"
            ))),
        }
    }
}

/// Complete configuration injected into [`crate::Client`] at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin every request path is appended to.
    pub base_url: String,
    /// Headers sent with every request, in addition to `Accept: application/json`.
    pub default_headers: Vec<(String, String)>,
    pub connect_timeout: Option<Duration>,
    pub timeouts: Timeouts,
    pub wakeup: WakeupConfig,
    pub confirmed_retry: ConfirmedRetryConfig,
    pub hosting: Hosting,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_headers: Vec::new(),
            connect_timeout: None,
            timeouts: Timeouts::default(),
            wakeup: WakeupConfig::default(),
            confirmed_retry: ConfirmedRetryConfig::default(),
            hosting: Hosting::Auto,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] if a variable is set to a
    /// malformed value.
    pub fn from_env() -> Result<Self, PfolioError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] if a value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PfolioError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(hosting) = lookup(HOSTING_ENV) {
            config.hosting = hosting.parse()?;
        }
        if let Some(ms) = lookup(WAKEUP_GRACE_ENV) {
            config.wakeup.grace_period =
                Duration::from_millis(parse_number(WAKEUP_GRACE_ENV, &ms)?);
        }
        if let Some(retries) = lookup(WAKEUP_RETRIES_ENV) {
            config.wakeup.max_retries = parse_number(WAKEUP_RETRIES_ENV, &retries)?;
        }
        if let Some(attempts) = lookup(REPLY_MAX_ATTEMPTS_ENV) {
            config.confirmed_retry.max_attempts = parse_number(REPLY_MAX_ATTEMPTS_ENV, &attempts)?;
        }
        if let Some(ms) = lookup(REPLY_BACKOFF_ENV) {
            config.confirmed_retry.backoff_step =
                Duration::from_millis(parse_number(REPLY_BACKOFF_ENV, &ms)?);
        }

        Ok(config)
    }

    /// Checks the base URL and returns it without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for an empty, unparseable or
    /// non-HTTP base URL.
    pub fn normalized_base_url(&self) -> Result<String, PfolioError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(PfolioError::InvalidInput(
                "Backend base URL must not be empty".to_string(),
            ));
        }

        let parsed = reqwest::Url::parse(trimmed).map_err(|e| {
            PfolioError::InvalidInput(format!("Invalid backend base URL '{trimmed}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PfolioError::InvalidInput(format!(
                "Backend base URL must use http or https (got '{}')",
                parsed.scheme()
            )));
        }

        Ok(trimmed.to_string())
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, PfolioError> {
    value.trim().parse().map_err(|_| {
        PfolioError::InvalidInput(format!("{name} must be a non-negative integer (got '{value}')"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_match_observed_constants() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.wakeup.grace_period, Duration::from_secs(3));
        assert_eq!(config.wakeup.max_retries, 1);
        assert_eq!(config.wakeup.health_path, "/health");
        assert_eq!(config.confirmed_retry.max_attempts, 2);
        assert_eq!(config.confirmed_retry.backoff_step, Duration::from_secs(2));
        assert_eq!(config.timeouts.long_running, Duration::from_secs(60));
        assert_eq!(config.hosting, Hosting::Auto);
    }

    #[test]
    fn test_from_lookup_empty_is_default() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (BASE_URL_ENV, " https://pfolio.onrender.com/ "),
            (HOSTING_ENV, "Hosted"),
            (WAKEUP_GRACE_ENV, "5000"),
            (WAKEUP_RETRIES_ENV, "2"),
            (REPLY_MAX_ATTEMPTS_ENV, "3"),
            (REPLY_BACKOFF_ENV, "1500"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://pfolio.onrender.com/");
        assert_eq!(config.hosting, Hosting::Hosted);
        assert_eq!(config.wakeup.grace_period, Duration::from_millis(5000));
        assert_eq!(config.wakeup.max_retries, 2);
        assert_eq!(config.confirmed_retry.max_attempts, 3);
        assert_eq!(config.confirmed_retry.backoff_step, Duration::from_millis(1500));
    }

    #[test]
    fn test_from_lookup_rejects_malformed_numbers() {
        let result = ClientConfig::from_lookup(lookup_from(&[(WAKEUP_RETRIES_ENV, "-1")]));
        match result {
            Err(PfolioError::InvalidInput(msg)) => assert!(msg.contains(WAKEUP_RETRIES_ENV)),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_hosting_from_str() {
        assert_eq!("auto".parse::<Hosting>().unwrap(), Hosting::Auto);
        assert_eq!("LOCAL".parse::<Hosting>().unwrap(), Hosting::Local);
        assert_eq!("remote".parse::<Hosting>().unwrap(), Hosting::Hosted);
        assert!("cloud".parse::<Hosting>().is_err());
    }

    #[test]
    fn test_normalized_base_url_strips_trailing_slash() {
        let config = ClientConfig::new("https://api.example.com/");
        assert_eq!(config.normalized_base_url().unwrap(), "https://api.example.com");
    }

    #[test]
    fn test_normalized_base_url_rejects_bad_values() {
        assert!(ClientConfig::new("").normalized_base_url().is_err());
        assert!(ClientConfig::new("   ").normalized_base_url().is_err());
        assert!(ClientConfig::new("not a url").normalized_base_url().is_err());
        assert!(ClientConfig::new("ftp://files.example.com").normalized_base_url().is_err());
    }
}
