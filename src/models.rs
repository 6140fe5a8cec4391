//! Plain data records shared between the catalog and the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One catalog item produced by an ingestion pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// 1-based position among the successfully parsed rows of its batch
    pub id: u32,
    /// Trimmed, never empty
    pub name: String,
    /// May be empty
    pub description: String,
    /// Non-negative price in the storefront's display currency
    pub price: Decimal,
    /// `None` means the presentation layer should show a placeholder
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Returns the image to show, if the feed supplied one.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

/// A product copy held in the cart with its price locked at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartEntry {
    /// Id of the product in the batch it was added from
    pub product_id: u32,
    /// Product name at add time
    pub name: String,
    /// Product description at add time
    pub description: String,
    /// Product image at add time, if any
    pub image_url: Option<String>,
    /// Price captured when the entry was added; never repriced
    pub price: Decimal,
}

impl From<&Product> for CartEntry {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
        }
    }
}
