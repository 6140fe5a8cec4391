//! Unified error type for the storefront core.
//!
//! Row-level feed problems are not errors; they are reported as
//! [`crate::core::catalog::SkippedRow`] diagnostics and never abort an ingestion pass.

use thiserror::Error;

/// All failures surfaced by the storefront core.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read, parsed or validated.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The catalog feed could not be fetched.
    #[error("Failed to retrieve catalog feed from {url}: {message}")]
    Retrieval {
        /// Feed location that was requested
        url: String,
        /// Transport, status or body problem
        message: String,
    },

    /// A cart removal named a position past the end of the cart.
    #[error("Cart index {index} is out of range (cart has {len} entries)")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Number of entries at the time of the request
        len: usize,
    },

    /// The configured checkout destination is not a usable URL.
    #[error("Invalid checkout URL {url:?}: {message}")]
    InvalidCheckoutUrl {
        /// The rejected URL text
        url: String,
        /// Parser message
        message: String,
    },
}

impl Error {
    /// Returns true for failures the session recovers from by keeping its last good catalog.
    #[must_use]
    pub const fn is_retrieval(&self) -> bool {
        matches!(self, Self::Retrieval { .. })
    }
}

/// Crate-wide `Result` alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
