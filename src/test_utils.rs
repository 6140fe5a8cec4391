//! Shared test utilities for the storefront core.
//!
//! This module provides sample feeds, product builders, and in-memory feed
//! sources with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::config::storefront::{Config, parse_config};
use crate::core::feed::FeedSource;
use crate::errors::{Error, Result};
use crate::models::Product;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// The two-row feed used throughout the tests.
pub const SAMPLE_FEED: &str = "name,description,price,imageUrl\n\
Jacket,Winter wear,2499.00,http://a/jacket.png\n\
Scarf,Silk scarf,799.50,\n";

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Builds a product with no description or image.
pub fn product(id: u32, name: &str, price: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: String::new(),
        price: Decimal::from_str(price).unwrap(),
        image_url: None,
    }
}

/// Product 1 of [`SAMPLE_FEED`].
pub fn jacket() -> Product {
    Product {
        description: "Winter wear".to_string(),
        image_url: Some("http://a/jacket.png".to_string()),
        ..product(1, "Jacket", "2499.00")
    }
}

/// Product 2 of [`SAMPLE_FEED`].
pub fn scarf() -> Product {
    Product {
        description: "Silk scarf".to_string(),
        ..product(2, "Scarf", "799.50")
    }
}

/// A static-handoff configuration pointing at example hosts.
pub fn test_config() -> Config {
    parse_config(
        r#"
        [storefront]
        feed_url = "https://feed.example.com/catalog.csv"
        checkout_url = "https://rzp.io/l/demo-payment"
        "#,
    )
    .unwrap()
}

/// Serves a fixed body after a delay.
pub struct DelayedFeedSource {
    body: String,
    delay: Duration,
}

impl DelayedFeedSource {
    pub fn new(body: &str, delay: Duration) -> Self {
        Self {
            body: body.to_string(),
            delay,
        }
    }
}

#[async_trait]
impl FeedSource for DelayedFeedSource {
    fn location(&self) -> &str {
        "delayed"
    }

    async fn fetch(&self) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok(self.body.clone())
    }
}

/// A source whose body and availability can change between fetches.
pub struct SwitchableFeedSource {
    body: Mutex<String>,
    available: Mutex<bool>,
}

impl SwitchableFeedSource {
    pub fn new(body: &str) -> Self {
        Self {
            body: Mutex::new(body.to_string()),
            available: Mutex::new(true),
        }
    }

    pub fn set_body(&self, body: &str) {
        *self.body.lock().unwrap() = body.to_string();
    }

    pub fn set_available(&self, available: bool) {
        *self.available.lock().unwrap() = available;
    }
}

#[async_trait]
impl FeedSource for SwitchableFeedSource {
    fn location(&self) -> &str {
        "switchable"
    }

    async fn fetch(&self) -> Result<String> {
        if *self.available.lock().unwrap() {
            Ok(self.body.lock().unwrap().clone())
        } else {
            Err(Error::Retrieval {
                url: "switchable".to_string(),
                message: "feed switched off".to_string(),
            })
        }
    }
}
