//! Checkout handoff - where the visitor is sent to pay.
//!
//! The payment page is hosted elsewhere. By default the visitor is sent to a
//! fixed link and the payment page is not told the cart total; the
//! `with_total` mode carries the total as a query parameter instead.

use crate::core::money;
use crate::errors::{Error, Result};
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

/// How the cart total reaches the payment page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HandoffMode {
    /// Fixed link, no parameters
    #[default]
    Static,
    /// Append the total, rounded to two places, as `?{param}=`
    WithTotal {
        /// Query parameter name
        param: String,
    },
}

/// Produces the payment destination for a cart.
#[derive(Debug, Clone)]
pub struct CheckoutHandoff {
    destination: Url,
    mode: HandoffMode,
}

impl CheckoutHandoff {
    /// # Errors
    /// Returns [`Error::InvalidCheckoutUrl`] if `url` is not an absolute URL.
    pub fn new(url: &str, mode: HandoffMode) -> Result<Self> {
        let destination = Url::parse(url).map_err(|e| Error::InvalidCheckoutUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { destination, mode })
    }

    /// The configured page, before any parameters are added.
    #[must_use]
    pub const fn destination(&self) -> &Url {
        &self.destination
    }

    /// Navigation target for a cart whose total is `total`.
    #[must_use]
    pub fn target(&self, total: Decimal) -> Url {
        let mut target = self.destination.clone();
        if let HandoffMode::WithTotal { param } = &self.mode {
            let amount = format!("{:.2}", money::round_for_display(total));
            target.query_pairs_mut().append_pair(param, &amount);
        }
        info!(%total, "Handing off to checkout at {}", target);
        target
    }
}
