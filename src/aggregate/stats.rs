use std::collections::BTreeMap;
use std::fmt;

use crate::search::Document;

/// Coverage percentages keyed by reported volume number
pub type CoverageMap = BTreeMap<i64, f64>;

/// Origin a coverage column is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CoverageSource {
    General,
    Arxiv,
    Publisher,
    Crossref,
    Metadata,
}

impl CoverageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageSource::General => "general",
            CoverageSource::Arxiv => "arxiv",
            CoverageSource::Publisher => "publisher",
            CoverageSource::Crossref => "crossref",
            CoverageSource::Metadata => "metadata",
        }
    }
}

impl fmt::Display for CoverageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to one decimal, ties to even on the exact decimal value
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// 100 x covered / total rounded to one decimal; 0.0 when there is nothing to cover
pub fn coverage_fraction(covered: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(100.0 * covered as f64 / total as f64)
}

/// A publication without full text, kept for the missing-publications listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingRecord {
    pub bibcode: String,
    pub doi: String,
    pub title: String,
    pub first_author: String,
    pub volume: String,
    pub issue: String,
}

impl From<Document> for MissingRecord {
    fn from(doc: Document) -> Self {
        let first =
            |v: Option<Vec<String>>| v.and_then(|v| v.into_iter().next()).unwrap_or_default();
        Self {
            bibcode: doc.bibcode.unwrap_or_default(),
            doi: first(doc.doi),
            title: first(doc.title),
            first_author: doc.first_author.unwrap_or_default(),
            volume: doc.volume.unwrap_or_default(),
            issue: doc.issue.unwrap_or_default(),
        }
    }
}

/// Everything gathered for one journal during a report run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalStats {
    /// Publications per volume, keyed by the backend's volume value
    /// (the year for year-as-volume journals)
    pub publications: BTreeMap<i64, u64>,
    pub start_year: i64,
    pub last_year: i64,
    /// Reported (normalized) volume numbers
    pub start_volume: i64,
    pub last_volume: i64,
    pub coverage: BTreeMap<CoverageSource, CoverageMap>,
    pub missing: Vec<MissingRecord>,
}

impl JournalStats {
    pub fn coverage(&self, source: CoverageSource) -> Option<&CoverageMap> {
        self.coverage.get(&source)
    }

    pub fn set_coverage(&mut self, source: CoverageSource, map: CoverageMap) {
        self.coverage.insert(source, map);
    }
}
