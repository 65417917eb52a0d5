use log::{debug, warn};
use std::collections::BTreeMap;

use super::{JournalStats, ReportContext};
use crate::config::Config;
use crate::error::{BackendError, ReportError, ReportResult};
use crate::search::{journal_query, SearchBackend};

/// Bookkeeping shared by every per-journal report: the collection's
/// journals in configured order and their statistics.
#[derive(Debug, Clone, Default)]
pub struct StatsBase {
    pub journals: Vec<String>,
    pub stats: BTreeMap<String, JournalStats>,
}

fn unknown_journal(journal: &str) -> ReportError {
    ReportError::Configuration(format!("journal not configured: {}", journal))
}

impl StatsBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the statistics for `collection` and fill in publication data.
    /// An unknown collection is fatal; a journal the backend cannot answer
    /// for keeps its default statistics.
    pub fn prepare(&mut self, ctx: &ReportContext, collection: &str) -> ReportResult<()> {
        self.journals = ctx.config.journals(collection)?;
        self.stats = self
            .journals
            .iter()
            .map(|j| (j.clone(), JournalStats::default()))
            .collect();

        let progress = ctx.progress_bar(self.journals.len(), "journals");
        for journal in &self.journals {
            progress.set_message(journal.clone());
            match publication_data(ctx.backend, ctx.config, journal) {
                Ok(stats) => {
                    self.stats.insert(journal.clone(), stats);
                }
                Err(e) => warn!("Publication data for {} unavailable: {}", journal, e),
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(())
    }

    pub fn journal(&self, journal: &str) -> ReportResult<&JournalStats> {
        self.stats
            .get(journal)
            .ok_or_else(|| unknown_journal(journal))
    }

    pub fn journal_mut(&mut self, journal: &str) -> ReportResult<&mut JournalStats> {
        self.stats
            .get_mut(journal)
            .ok_or_else(|| unknown_journal(journal))
    }

    /// Largest reported volume over all journals
    pub fn max_volume(&self) -> i64 {
        self.stats.values().map(|s| s.last_volume).max().unwrap_or(0).max(0)
    }
}

/// Publication counts per volume and per year for one journal, restricted
/// to countable document types. Year-as-volume journals use the year
/// counts as their volume counts.
pub fn publication_data(
    backend: &dyn SearchBackend,
    config: &Config,
    journal: &str,
) -> Result<JournalStats, BackendError> {
    let query = journal_query(journal, &config.doctype_clause());
    let mut years = backend.facet_counts(&query, "year")?;
    years.retain(|_, count| *count > 0);

    let mut volumes = match config.quirks.year_is_volume(journal) {
        Some(_) => years.clone(),
        None => backend.facet_counts(&query, "volume")?,
    };
    volumes.retain(|_, count| *count > 0);

    let mut stats = JournalStats::default();
    if let (Some(first), Some(last)) = (years.keys().next(), years.keys().next_back()) {
        stats.start_year = *first;
        stats.last_year = *last;
    }
    if let (Some(first), Some(last)) = (volumes.keys().next(), volumes.keys().next_back()) {
        stats.start_volume = config.quirks.reported_volume(journal, *first);
        stats.last_volume = config.quirks.reported_volume(journal, *last);
    }
    if volumes.is_empty() {
        debug!("No publications found for {}", journal);
    }
    stats.publications = volumes;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::StaticBackend;

    const APJ: &str = "bibstem:\"ApJ..\" doctype:(article OR inproceedings)";
    const JCAP: &str = "bibstem:\"JCAP.\" doctype:(article OR inproceedings)";

    fn backend() -> StaticBackend {
        StaticBackend::new()
            .with_facet(
                APJ,
                "volume",
                &[(904, 201), (900, 196), (889, 189), (897, 186), (891, 182), (905, 129)],
            )
            .with_facet(
                APJ,
                "year",
                &[
                    (2012, 3118),
                    (2015, 3055),
                    (2016, 3038),
                    (2017, 3104),
                    (2019, 3190),
                    (2020, 3079),
                ],
            )
            .with_facet(JCAP, "volume", &[(1, 400), (12, 380)])
            .with_facet(JCAP, "year", &[(2003, 50), (2010, 300), (2020, 420)])
    }

    #[test]
    fn test_publication_data() {
        let stats = publication_data(&backend(), &Config::default(), "ApJ..").unwrap();
        assert_eq!(stats.start_year, 2012);
        assert_eq!(stats.last_year, 2020);
        assert_eq!(stats.start_volume, 889);
        assert_eq!(stats.last_volume, 905);
        assert_eq!(stats.publications[&900], 196);
        assert_eq!(stats.publications.len(), 6);
    }

    #[test]
    fn test_publication_data_year_is_volume() {
        let stats = publication_data(&backend(), &Config::default(), "JCAP.").unwrap();
        assert_eq!(stats.publications.keys().copied().collect::<Vec<_>>(), vec![2003, 2010, 2020]);
        assert_eq!(stats.start_volume, 1);
        assert_eq!(stats.last_volume, 18);
    }

    #[test]
    fn test_publication_data_empty_backend() {
        let stats = publication_data(&StaticBackend::new(), &Config::default(), "MNRAS").unwrap();
        assert_eq!(stats, JournalStats::default());
    }

    #[test]
    fn test_prepare_unknown_collection() {
        let backend = backend();
        let config = Config::default();
        let ctx = ReportContext::new(&config, &backend);
        let mut base = StatsBase::new();
        assert!(matches!(
            base.prepare(&ctx, "FOO"),
            Err(ReportError::Configuration(_))
        ));
    }

    #[test]
    fn test_prepare_tolerates_backend_failure() {
        let backend = backend().failing_on("MNRAS");
        let mut config = Config::default();
        config.collections.get_mut("AST").unwrap().journals =
            vec!["ApJ..".to_string(), "MNRAS".to_string()];
        let ctx = ReportContext::new(&config, &backend);

        let mut base = StatsBase::new();
        base.prepare(&ctx, "AST").unwrap();
        assert_eq!(base.journals, vec!["ApJ..", "MNRAS"]);
        assert_eq!(base.journal("ApJ..").unwrap().last_volume, 905);
        assert_eq!(base.journal("MNRAS").unwrap(), &JournalStats::default());
        assert_eq!(base.max_volume(), 905);
    }
}
