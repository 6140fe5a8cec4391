//! Framework-agnostic storefront logic.

/// Cart ledger with change notifications
pub mod cart;
/// Feed parsing into products and skipped-row diagnostics
pub mod catalog;
/// Payment page handoff
pub mod checkout;
/// Feed retrieval over HTTP or from memory
pub mod feed;
/// Decimal price parsing and display formatting
pub mod money;
/// Session lifecycle around the catalog and cart
pub mod session;
