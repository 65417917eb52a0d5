pub mod client;
pub mod query;
pub mod response;

pub use client::*;
pub use query::*;
pub use response::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::BackendError;

/// Facet value (as integer) -> document count
pub type FacetCounts = BTreeMap<i64, u64>;

/// Publication year -> citations received by that year's documents
pub type CitationCounts = BTreeMap<i64, u64>;

/// Capabilities the aggregators need from the search backend
pub trait SearchBackend {
    /// Counts per facet value, restricted to buckets with at least one document
    fn facet_counts(&self, query: &str, field: &str) -> Result<FacetCounts, BackendError>;

    /// Citations of the matching documents per year: sum of value x frequency
    /// over each group of the year/citation_count pivot
    fn citation_counts(&self, query: &str) -> Result<CitationCounts, BackendError>;

    /// All matching documents, fetched page by page
    fn records(&self, query: &str, fields: &[&str]) -> Result<Vec<Document>, BackendError>;
}

/// One search result. Every field is optional because the backend omits
/// fields a record does not carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub bibcode: Option<String>,
    pub doi: Option<Vec<String>>,
    pub title: Option<Vec<String>>,
    pub first_author: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
}

/// Sum of all bucket counts
pub fn facet_total(counts: &FacetCounts) -> u64 {
    counts.values().sum()
}
