use log::{info, warn};
use std::path::PathBuf;

use super::{facet_coverage, CoverageSource, Report, ReportContext, ReportKind, StatsBase};
use crate::cli::{ReportFormat, ReportSubject};
use crate::error::ReportResult;
use crate::report::{coverage_table, ReportWriter};

/// Share of publications per volume carrying the configured metadata
/// (abstracts by default). NASA and CURATORS differ only in where the
/// single table is written.
pub struct MetadataReport<'a> {
    ctx: ReportContext<'a>,
    format: ReportFormat,
    pub base: StatsBase,
}

impl<'a> MetadataReport<'a> {
    pub fn new(ctx: ReportContext<'a>, format: ReportFormat) -> Self {
        Self {
            ctx,
            format,
            base: StatsBase::new(),
        }
    }
}

impl<'a> Report for MetadataReport<'a> {
    fn kind(&self) -> ReportKind {
        ReportKind::Metadata
    }

    fn make_report(&mut self, collection: &str) -> ReportResult<()> {
        self.base.prepare(&self.ctx, collection)?;

        let config = self.ctx.config;
        for journal in &self.base.journals {
            let Some(stats) = self.base.stats.get_mut(journal) else {
                continue;
            };
            let predicate = &config.metadata_predicate;
            match facet_coverage(self.ctx.backend, config, journal, stats, predicate) {
                Ok(map) => stats.set_coverage(CoverageSource::Metadata, map),
                Err(e) => warn!("Metadata coverage for {} unavailable: {}", journal, e),
            }
        }

        info!(
            "Metadata statistics ready for {} journals in {}",
            self.base.journals.len(),
            collection
        );
        Ok(())
    }

    fn save_report(&self, writer: &ReportWriter, collection: &str) -> ReportResult<Vec<PathBuf>> {
        let paths = writer.paths(self.format);
        let subject = ReportSubject::Metadata.name();
        let path = match self.format {
            ReportFormat::Curators => {
                paths.source_table(subject, CoverageSource::Metadata.as_str(), collection)
            }
            _ => paths.table(subject, collection),
        };
        let table = coverage_table(&self.base, CoverageSource::Metadata);
        Ok(vec![writer.write_table(&table, &path)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::search::testing::StaticBackend;
    use tempfile::tempdir;

    const AJ: &str = "bibstem:\"AJ...\" doctype:(article OR inproceedings)";

    fn setup() -> (Config, StaticBackend) {
        let mut config = Config::default();
        config.collections.get_mut("AST").unwrap().journals = vec!["AJ...".to_string()];
        let backend = StaticBackend::new()
            .with_facet(AJ, "volume", &[(159, 40), (160, 50)])
            .with_facet(&format!("{} abs:*", AJ), "volume", &[(159, 40), (160, 45)]);
        (config, backend)
    }

    #[test]
    fn test_metadata_coverage() {
        let (config, backend) = setup();
        let ctx = ReportContext::new(&config, &backend);
        let mut report = MetadataReport::new(ctx, ReportFormat::Nasa);
        report.make_report("AST").unwrap();

        let map = report.base.journal("AJ...").unwrap().coverage(CoverageSource::Metadata).unwrap();
        assert_eq!(map[&159], 100.0);
        assert_eq!(map[&160], 90.0);
    }

    #[test]
    fn test_backend_failure_leaves_journal_without_coverage() {
        let (config, backend) = setup();
        let backend = backend.failing_on("abs:*");
        let ctx = ReportContext::new(&config, &backend);
        let mut report = MetadataReport::new(ctx, ReportFormat::Nasa);
        report.make_report("AST").unwrap();

        let stats = report.base.journal("AJ...").unwrap();
        assert_eq!(stats.last_volume, 160);
        assert!(stats.coverage(CoverageSource::Metadata).is_none());
    }

    #[test]
    fn test_save_paths() {
        let (config, backend) = setup();
        let dir = tempdir().unwrap();
        let writer = ReportWriter::new(dir.path(), "20240131");

        let ctx = ReportContext::new(&config, &backend);
        let mut report = MetadataReport::new(ctx, ReportFormat::Curators);
        report.make_report("AST").unwrap();
        let files = report.save_report(&writer, "AST").unwrap();
        assert_eq!(files, vec![dir.path().join("CURATORS/metadata_metadata_AST_20240131.csv")]);
    }
}
