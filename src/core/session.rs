//! Storefront session - everything one visitor's browsing session owns.
//!
//! A session ties the shared [`CatalogStore`] to a cart that belongs to this
//! session alone, plus the checkout handoff and display settings. It has an
//! explicit lifecycle: [`StorefrontSession::init_session`] runs the first
//! ingestion pass and [`StorefrontSession::teardown_session`] discards the
//! state.

use crate::cache::{Catalog, CatalogStore};
use crate::config::Config;
use crate::core::cart::CartLedger;
use crate::core::catalog::FeedDialect;
use crate::core::checkout::CheckoutHandoff;
use crate::core::feed::{FeedSource, HttpFeedSource};
use crate::core::money;
use crate::errors::Result;
use crate::models::Product;
use reqwest::Url;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Shown to the visitor when the catalog could not be refreshed.
pub const CATALOG_UNAVAILABLE_NOTICE: &str =
    "We couldn't load the latest collection. Please try again shortly.";

/// One browsing session.
pub struct StorefrontSession {
    source: Arc<dyn FeedSource>,
    dialect: FeedDialect,
    store: CatalogStore,
    cart: CartLedger,
    handoff: CheckoutHandoff,
    currency_symbol: String,
    notice: Option<String>,
}

impl StorefrontSession {
    /// Starts a session that reads the feed over HTTP as configured.
    ///
    /// # Errors
    /// Returns an error only for unusable configuration; an unreachable feed
    /// is reported through [`Self::notice`].
    pub async fn connect(config: &Config) -> Result<Self> {
        let source = HttpFeedSource::new(
            config.storefront.feed_url.clone(),
            config.storefront.fetch_timeout(),
        )?;
        Self::init_session(config, Arc::new(source), CatalogStore::new()).await
    }

    /// Builds a session around `source` and runs the first ingestion pass.
    ///
    /// `store` may be shared with other sessions; the cart never is.
    ///
    /// # Errors
    /// Returns an error if the checkout URL is invalid.
    pub async fn init_session(
        config: &Config,
        source: Arc<dyn FeedSource>,
        store: CatalogStore,
    ) -> Result<Self> {
        let handoff =
            CheckoutHandoff::new(&config.storefront.checkout_url, config.checkout.clone())?;

        let mut session = Self {
            source,
            dialect: config.storefront.dialect,
            store,
            cart: CartLedger::new(),
            handoff,
            currency_symbol: config.storefront.currency_symbol.clone(),
            notice: None,
        };

        // A failed first load is not fatal; the notice tells the visitor.
        if let Err(e) = session.refresh_catalog().await {
            warn!("First catalog load failed: {}", e);
        }
        info!("Storefront session initialized");
        Ok(session)
    }

    /// Runs another ingestion pass.
    ///
    /// On success the new catalog replaces the old one and any notice is
    /// cleared. On failure the previous catalog stays in place.
    ///
    /// # Errors
    /// Returns the retrieval error after recording the notice.
    pub async fn refresh_catalog(&mut self) -> Result<Arc<Catalog>> {
        match self.store.refresh(self.source.as_ref(), self.dialect).await {
            Ok(catalog) => {
                self.notice = None;
                Ok(catalog)
            }
            Err(e) => {
                warn!("Serving last known catalog: {}", e);
                self.notice = Some(CATALOG_UNAVAILABLE_NOTICE.to_string());
                Err(e)
            }
        }
    }

    /// The catalog currently on display, if one has ever loaded.
    pub async fn catalog(&self) -> Option<Arc<Catalog>> {
        self.store.current().await
    }

    /// Products currently on display; empty before the first successful load.
    pub async fn products(&self) -> Vec<Product> {
        self.catalog()
            .await
            .map(|catalog| catalog.products().to_vec())
            .unwrap_or_default()
    }

    /// This session's cart.
    #[must_use]
    pub const fn cart(&self) -> &CartLedger {
        &self.cart
    }

    /// Mutable access to this session's cart.
    pub const fn cart_mut(&mut self) -> &mut CartLedger {
        &mut self.cart
    }

    /// Current cart total.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Where the checkout button should send the visitor.
    #[must_use]
    pub fn checkout_target(&self) -> Url {
        self.handoff.target(self.cart.total())
    }

    /// Formats an amount for display with the configured currency.
    #[must_use]
    pub fn format_price(&self, amount: Decimal) -> String {
        money::format_price(amount, &self.currency_symbol)
    }

    /// User-visible notice about the catalog, if the last refresh failed.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Ends the session, discarding the cart and this session's view of the catalog.
    pub fn teardown_session(mut self) {
        let entries = self.cart.len();
        self.cart.clear();
        info!(entries, "Storefront session torn down");
    }
}
