//! Environment overrides for the storefront configuration.
//!
//! Deployments usually point the same config.toml at a different sheet or
//! payment page through the environment (or a `.env` file loaded at startup).

use super::storefront::{Config, load_config};
use crate::errors::Result;
use tracing::info;

/// Path of the configuration file, overridable with `STOREFRONT_CONFIG`.
pub const CONFIG_PATH_VAR: &str = "STOREFRONT_CONFIG";
/// Replaces `storefront.feed_url`.
pub const FEED_URL_VAR: &str = "STOREFRONT_FEED_URL";
/// Replaces `storefront.checkout_url`.
pub const CHECKOUT_URL_VAR: &str = "STOREFRONT_CHECKOUT_URL";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Gets the config file path from the environment or returns the default.
#[must_use]
pub fn get_config_path() -> String {
    std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Applies overrides found through `lookup` to `config`.
///
/// Empty values are ignored so a blank line in `.env` does not wipe a setting.
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(feed_url) = non_empty(FEED_URL_VAR) {
        info!("Using feed URL from {}", FEED_URL_VAR);
        config.storefront.feed_url = feed_url;
    }
    if let Some(checkout_url) = non_empty(CHECKOUT_URL_VAR) {
        info!("Using checkout URL from {}", CHECKOUT_URL_VAR);
        config.storefront.checkout_url = checkout_url;
    }
}

/// Loads config.toml (or `STOREFRONT_CONFIG`), applies process environment
/// overrides and validates the result.
///
/// # Errors
/// Returns an error if the file cannot be loaded or the final values are invalid.
pub fn load_app_configuration() -> Result<Config> {
    let path = get_config_path();
    let mut config = load_config(&path)?;
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    info!("Loaded storefront configuration from {}", path);
    Ok(config)
}
