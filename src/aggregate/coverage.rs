use super::{coverage_fraction, CoverageMap, JournalStats};
use crate::classic::{FulltextIndex, SourceClass};
use crate::config::Config;
use crate::error::BackendError;
use crate::journal::QuirkTable;
use crate::search::{journal_query, with_predicate, SearchBackend};

/// Per-volume coverage for one journal. `covered` receives the backend volume
/// key; results are keyed by reported volume and skip excluded volumes.
pub fn coverage_by_volume<F>(
    journal: &str,
    stats: &JournalStats,
    quirks: &QuirkTable,
    mut covered: F,
) -> CoverageMap
where
    F: FnMut(i64) -> u64,
{
    let mut map = CoverageMap::new();
    for (&volume, &total) in &stats.publications {
        if total == 0 {
            continue;
        }
        let reported = quirks.reported_volume(journal, volume);
        if quirks.is_excluded(journal, reported) {
            continue;
        }
        map.insert(reported, coverage_fraction(covered(volume), total));
    }
    map
}

/// Facet field holding the volume key for a journal
pub fn volume_field(quirks: &QuirkTable, journal: &str) -> &'static str {
    if quirks.year_is_volume(journal).is_some() {
        "year"
    } else {
        "volume"
    }
}

/// Coverage of records matching `predicate` (full text, metadata, ...)
/// measured with a backend facet query
pub fn facet_coverage(
    backend: &dyn SearchBackend,
    config: &Config,
    journal: &str,
    stats: &JournalStats,
    predicate: &str,
) -> Result<CoverageMap, BackendError> {
    let query = with_predicate(&journal_query(journal, &config.doctype_clause()), predicate);
    let covered = backend.facet_counts(&query, volume_field(&config.quirks, journal))?;

    Ok(coverage_by_volume(journal, stats, &config.quirks, |volume| {
        covered.get(&volume).copied().unwrap_or(0)
    }))
}

/// Full-text coverage according to the backend's full-text timestamps
pub fn general_coverage(
    backend: &dyn SearchBackend,
    config: &Config,
    journal: &str,
    stats: &JournalStats,
) -> Result<CoverageMap, BackendError> {
    facet_coverage(backend, config, journal, stats, &config.fulltext_predicate)
}

/// Full-text coverage per source class according to the classic index
pub fn classic_coverage(
    index: &FulltextIndex,
    quirks: &QuirkTable,
    journal: &str,
    stats: &JournalStats,
    class: SourceClass,
) -> CoverageMap {
    coverage_by_volume(journal, stats, quirks, |volume| {
        index.count(journal, volume, class) as u64
    })
}
