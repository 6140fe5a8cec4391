//! Storefront configuration loading from config.toml
//!
//! This module provides functionality to load the storefront settings from a
//! TOML configuration file: where the catalog feed lives, where checkout sends
//! the visitor, and how prices are displayed.

use crate::core::catalog::FeedDialect;
use crate::core::checkout::HandoffMode;
use crate::core::feed::DEFAULT_FETCH_TIMEOUT;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Feed, checkout and display settings
    pub storefront: StorefrontSettings,
    /// How the total reaches the payment page
    #[serde(default)]
    pub checkout: HandoffMode,
}

/// The `[storefront]` table
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontSettings {
    /// Published CSV feed of the product catalog
    pub feed_url: String,
    /// Externally hosted payment page
    pub checkout_url: String,
    /// Symbol prefixed to displayed prices
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Bound on one feed request, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Row splitting rules for the feed
    #[serde(default)]
    pub dialect: FeedDialect,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

const fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

impl StorefrontSettings {
    /// Retrieval timeout as a [`Duration`].
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Config {
    /// Checks values that parse fine but cannot work.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.storefront.feed_url.trim().is_empty() {
            return Err(Error::Config {
                message: "storefront.feed_url cannot be empty".to_string(),
            });
        }
        if self.storefront.checkout_url.trim().is_empty() {
            return Err(Error::Config {
                message: "storefront.checkout_url cannot be empty".to_string(),
            });
        }
        if self.storefront.fetch_timeout_secs == 0 {
            return Err(Error::Config {
                message: "storefront.fetch_timeout_secs must be at least 1".to_string(),
            });
        }
        if let HandoffMode::WithTotal { param } = &self.checkout {
            if param.trim().is_empty() {
                return Err(Error::Config {
                    message: "checkout.param cannot be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Parses configuration text without touching the filesystem.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or required fields are missing.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads storefront configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const FULL_CONFIG: &str = r#"
        [storefront]
        feed_url = "https://docs.google.com/spreadsheets/d/e/feed/pub?output=csv"
        checkout_url = "https://rzp.io/l/demo-payment"
        currency_symbol = "$"
        fetch_timeout_secs = 3
        dialect = "quoted"

        [checkout]
        mode = "with_total"
        param = "amount"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL_CONFIG).unwrap();
        assert_eq!(config.storefront.currency_symbol, "$");
        assert_eq!(config.storefront.fetch_timeout(), Duration::from_secs(3));
        assert_eq!(config.storefront.dialect, FeedDialect::Quoted);
        assert_eq!(
            config.checkout,
            HandoffMode::WithTotal {
                param: "amount".to_string()
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = parse_config(
            r#"
            [storefront]
            feed_url = "https://feed.example.com/catalog.csv"
            checkout_url = "https://pay.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.storefront.currency_symbol, "₹");
        assert_eq!(config.storefront.fetch_timeout(), DEFAULT_FETCH_TIMEOUT);
        assert_eq!(config.storefront.dialect, FeedDialect::Simple);
        assert_eq!(config.checkout, HandoffMode::Static);
    }

    #[test]
    fn test_missing_feed_url_is_config_error() {
        let result = parse_config("[storefront]\ncheckout_url = \"https://pay.example.com\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_blank_param() {
        let mut config = parse_config(FULL_CONFIG).unwrap();
        config.storefront.fetch_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let mut config = parse_config(FULL_CONFIG).unwrap();
        config.checkout = HandoffMode::WithTotal {
            param: " ".to_string(),
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/definitely/not/here/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
