use log::{info, warn};
use std::path::PathBuf;

use super::{MissingRecord, Report, ReportContext, ReportKind, StatsBase};
use crate::cli::{ReportFormat, ReportSubject};
use crate::config::Config;
use crate::error::{BackendError, ReportResult};
use crate::report::{missing_table, ReportWriter};
use crate::search::{journal_query, without_predicate, SearchBackend, MISSING_FIELDS};

/// Countable publications of a journal that have no full text
pub fn missing_publications(
    backend: &dyn SearchBackend,
    config: &Config,
    journal: &str,
) -> Result<Vec<MissingRecord>, BackendError> {
    let base = journal_query(journal, &config.doctype_clause());
    let query = without_predicate(&base, &config.fulltext_predicate);
    let docs = backend.records(&query, MISSING_FIELDS)?;
    Ok(docs.into_iter().map(MissingRecord::from).collect())
}

/// Listing of publications lacking full text, per journal
pub struct MissingReport<'a> {
    ctx: ReportContext<'a>,
    pub base: StatsBase,
}

impl<'a> MissingReport<'a> {
    pub fn new(ctx: ReportContext<'a>) -> Self {
        Self {
            ctx,
            base: StatsBase::new(),
        }
    }
}

impl<'a> Report for MissingReport<'a> {
    fn kind(&self) -> ReportKind {
        ReportKind::Missing
    }

    fn make_report(&mut self, collection: &str) -> ReportResult<()> {
        self.base.prepare(&self.ctx, collection)?;

        let mut total = 0;
        for journal in &self.base.journals {
            let Some(stats) = self.base.stats.get_mut(journal) else {
                continue;
            };
            match missing_publications(self.ctx.backend, self.ctx.config, journal) {
                Ok(records) => {
                    total += records.len();
                    stats.missing = records;
                }
                Err(e) => warn!("Missing publications for {} unavailable: {}", journal, e),
            }
        }

        info!("{} publications without full text in {}", total, collection);
        Ok(())
    }

    fn save_report(&self, writer: &ReportWriter, collection: &str) -> ReportResult<Vec<PathBuf>> {
        let path = writer
            .paths(ReportFormat::Missing)
            .table(ReportSubject::Fulltext.name(), collection);
        let table = missing_table(&self.base);
        Ok(vec![writer.write_table(&table, &path)?])
    }
}
