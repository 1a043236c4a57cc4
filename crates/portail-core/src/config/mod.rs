//! Client configuration for portal API access and notification polling.

use std::time::Duration;

use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

/// Default delay between two notification poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// Default capacity of the in-memory notification feed.
pub const DEFAULT_FEED_CAPACITY: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid portal configuration: {0}")]
    Invalid(&'static str),
}

/// Validated portal backend configuration shared by the auth and API clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    api_base_url: String,
}

impl PortalConfig {
    /// Build a config from a raw base URL such as `http://host:5000/api`.
    ///
    /// The URL is trimmed, must carry an `http(s)://` scheme, and loses any
    /// trailing slashes so endpoint paths can be appended directly.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let api_base_url = normalize_text_option(Some(api_base_url.into()))
            .ok_or(ConfigError::Invalid("API base URL must not be empty"))?;
        if !is_http_url(&api_base_url) {
            return Err(ConfigError::Invalid(
                "API base URL must include http:// or https://",
            ));
        }
        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

/// Tuning knobs for the delta-tracking notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierOptions {
    /// Delay between two scheduled poll cycles.
    pub poll_interval: Duration,
    /// Maximum number of retained notifications (oldest dropped beyond it).
    pub capacity: usize,
}

impl Default for NotifierOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            capacity: DEFAULT_FEED_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_config_rejects_empty_and_schemeless_urls() {
        assert!(PortalConfig::new("").is_err());
        assert!(PortalConfig::new("   ").is_err());
        assert!(PortalConfig::new("portal.example.com/api").is_err());
    }

    #[test]
    fn portal_config_trims_trailing_slashes() {
        let config = PortalConfig::new(" http://localhost:5000/api/ ").unwrap();
        assert_eq!(config.api_base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn notifier_options_default_to_twenty_seconds_and_hundred_entries() {
        let options = NotifierOptions::default();
        assert_eq!(options.poll_interval, Duration::from_secs(20));
        assert_eq!(options.capacity, 100);
    }
}
