//! Catalog ingestion - turns the raw tabular feed into validated products.
//!
//! The feed is a header line followed by comma-separated rows in the fixed
//! column order `name, description, price, imageUrl`. Rows that cannot be turned
//! into a valid [`Product`] are excluded and reported as [`SkippedRow`]
//! diagnostics; a bad row never aborts the pass. Ids are assigned densely to the
//! rows that survive, in feed order.

use crate::core::money::{self, PriceError};
use crate::models::Product;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Column delimiter of the feed.
pub const DELIMITER: u8 = b',';

/// How rows are split into fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedDialect {
    /// Positional split on every comma. Fields cannot contain the delimiter.
    #[default]
    Simple,
    /// RFC 4180 style quoting, for feeds whose text may contain commas.
    Quoted,
}

/// Why a row was excluded from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Price field empty or not a number
    InvalidPrice,
    /// Price parsed but below zero
    NegativePrice,
    /// Price parsed but above the largest accepted price
    PriceOutOfRange,
    /// Name field empty
    MissingName,
    /// Row did not have 3 or 4 fields
    ColumnCount {
        /// Number of fields found
        found: usize,
    },
    /// The quoted reader could not make sense of the remaining text
    Malformed {
        /// Reader message
        message: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrice => write!(f, "price is not a number"),
            Self::NegativePrice => write!(f, "price is negative"),
            Self::PriceOutOfRange => {
                write!(f, "price is above the maximum of {}", money::MAX_PRICE)
            }
            Self::MissingName => write!(f, "name is empty"),
            Self::ColumnCount { found } => write!(f, "expected 4 columns, found {found}"),
            Self::Malformed { message } => write!(f, "malformed row: {message}"),
        }
    }
}

/// Diagnostic for one excluded row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Line position in the feed; the header is 0, so the first data row is 1
    pub index: usize,
    /// The row exactly as it appeared in the feed
    pub raw_line: String,
    /// Why the row was excluded
    pub reason: SkipReason,
}

/// Everything one ingestion pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestResult {
    /// Valid rows, ids assigned in feed order
    pub products: Vec<Product>,
    /// Rows that were excluded, in feed order
    pub skipped_rows: Vec<SkippedRow>,
}

/// Summary classification of a successful pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Every data row became a product
    Complete {
        /// Products loaded
        products: usize,
    },
    /// Some rows were skipped
    Partial {
        /// Products loaded
        products: usize,
        /// Rows excluded
        skipped: usize,
    },
}

impl IngestResult {
    /// Classifies this pass for reporting.
    #[must_use]
    pub fn outcome(&self) -> IngestOutcome {
        if self.skipped_rows.is_empty() {
            IngestOutcome::Complete {
                products: self.products.len(),
            }
        } else {
            IngestOutcome::Partial {
                products: self.products.len(),
                skipped: self.skipped_rows.len(),
            }
        }
    }
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete { products } => write!(f, "loaded {products} products"),
            Self::Partial { products, skipped } => {
                write!(f, "loaded {products} products, skipped {skipped} rows")
            }
        }
    }
}

/// Parses a feed using the default positional dialect.
#[must_use]
pub fn ingest(raw_text: &str) -> IngestResult {
    ingest_with(raw_text, FeedDialect::Simple)
}

/// Parses a feed with an explicit dialect.
///
/// Line 0 is always treated as the header and discarded. Whitespace-only lines
/// are not records and are passed over without a diagnostic.
#[must_use]
pub fn ingest_with(raw_text: &str, dialect: FeedDialect) -> IngestResult {
    let mut builder = CatalogBuilder::default();

    match dialect {
        FeedDialect::Simple => {
            for (index, line) in raw_text.lines().enumerate().skip(1) {
                if line.trim().is_empty() {
                    continue;
                }
                let fields: Vec<&str> = line.split(char::from(DELIMITER)).collect();
                builder.push_row(index, line, &fields);
            }
        }
        FeedDialect::Quoted => read_quoted(raw_text, &mut builder),
    }

    let result = builder.finish();
    info!("Catalog ingestion {}", result.outcome());
    result
}

fn read_quoted(raw_text: &str, builder: &mut CatalogBuilder) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(DELIMITER)
        .from_reader(raw_text.as_bytes());
    let mut record = csv::StringRecord::new();

    loop {
        let before = reader.position().clone();
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let start = record.position().unwrap_or(&before);
                let index = line_index(start);
                if index == 0 {
                    continue;
                }
                let raw_line = slice_bytes(raw_text, start.byte(), reader.position().byte())
                    .trim_end_matches(['\r', '\n']);
                let fields: Vec<&str> = record.iter().collect();
                if fields.iter().all(|field| field.trim().is_empty()) {
                    continue;
                }
                builder.push_row(index, raw_line, &fields);
            }
            Err(e) => {
                let raw_line = slice_bytes(raw_text, before.byte(), u64::MAX);
                builder.skip(
                    line_index(&before),
                    raw_line.trim_end_matches(['\r', '\n']),
                    SkipReason::Malformed {
                        message: e.to_string(),
                    },
                );
                break;
            }
        }
    }
}

// csv positions count lines from 1
fn line_index(position: &csv::Position) -> usize {
    usize::try_from(position.line().saturating_sub(1)).unwrap_or(usize::MAX)
}

fn slice_bytes(text: &str, start: u64, end: u64) -> &str {
    let start = usize::try_from(start).unwrap_or(text.len());
    let end = usize::try_from(end).unwrap_or(text.len()).min(text.len());
    text.get(start..end).unwrap_or_default()
}

/// Accumulates products and diagnostics while rows stream in.
#[derive(Default)]
struct CatalogBuilder {
    result: IngestResult,
}

impl CatalogBuilder {
    fn push_row(&mut self, index: usize, raw_line: &str, fields: &[&str]) {
        match parse_row(fields) {
            Ok(row) => {
                let id = u32::try_from(self.result.products.len() + 1).unwrap_or(u32::MAX);
                debug!(id, name = %row.name, price = %row.price, "Parsed catalog row");
                self.result.products.push(Product {
                    id,
                    name: row.name,
                    description: row.description,
                    price: row.price,
                    image_url: row.image_url,
                });
            }
            Err(reason) => self.skip(index, raw_line, reason),
        }
    }

    fn skip(&mut self, index: usize, raw_line: &str, reason: SkipReason) {
        warn!(row = index, %reason, raw = raw_line, "Skipping catalog row");
        self.result.skipped_rows.push(SkippedRow {
            index,
            raw_line: raw_line.to_string(),
            reason,
        });
    }

    fn finish(self) -> IngestResult {
        self.result
    }
}

struct ParsedRow {
    name: String,
    description: String,
    price: rust_decimal::Decimal,
    image_url: Option<String>,
}

fn parse_row(fields: &[&str]) -> Result<ParsedRow, SkipReason> {
    let (name, description, price, image) = match *fields {
        [name, description, price] => (name, description, price, None),
        [name, description, price, image] => (name, description, price, Some(image)),
        _ => {
            return Err(SkipReason::ColumnCount {
                found: fields.len(),
            });
        }
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(SkipReason::MissingName);
    }

    let price = money::parse_price(price).map_err(|e| match e {
        PriceError::Negative => SkipReason::NegativePrice,
        PriceError::OutOfRange => SkipReason::PriceOutOfRange,
        PriceError::Empty | PriceError::NotANumber => SkipReason::InvalidPrice,
    })?;

    let image_url = image
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    Ok(ParsedRow {
        name: name.to_string(),
        description: description.trim().to_string(),
        price,
        image_url,
    })
}
