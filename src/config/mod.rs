/// Environment variable overrides and the startup loading sequence
pub mod environment;

/// Storefront settings loading from config.toml
pub mod storefront;

pub use environment::load_app_configuration;
pub use storefront::{Config, StorefrontSettings};
