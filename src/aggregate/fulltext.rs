use log::{info, warn};
use std::path::PathBuf;

use super::{
    classic_coverage, general_coverage, CoverageSource, Report, ReportContext, ReportKind,
    StatsBase,
};
use crate::classic::{FulltextIndex, SourceClass};
use crate::cli::{ReportFormat, ReportSubject};
use crate::error::{ReportError, ReportResult};
use crate::report::{coverage_table, ReportWriter};

/// Full-text coverage per journal volume. NASA reports use the backend's
/// full-text timestamps, CURATORS reports split arXiv and publisher
/// full text using the classic index.
pub struct FulltextReport<'a> {
    ctx: ReportContext<'a>,
    format: ReportFormat,
    index: Option<FulltextIndex>,
    pub base: StatsBase,
}

impl<'a> FulltextReport<'a> {
    pub fn new(ctx: ReportContext<'a>, format: ReportFormat, index: Option<FulltextIndex>) -> Self {
        Self {
            ctx,
            format,
            index,
            base: StatsBase::new(),
        }
    }

    fn general_data(&mut self) {
        let journals = self.base.journals.clone();
        for journal in &journals {
            let Ok(stats) = self.base.journal_mut(journal) else {
                continue;
            };
            match general_coverage(self.ctx.backend, self.ctx.config, journal, stats) {
                Ok(map) => stats.set_coverage(CoverageSource::General, map),
                Err(e) => warn!("Full-text coverage for {} unavailable: {}", journal, e),
            }
        }
    }

    fn classic_data(&mut self, source: CoverageSource, class: SourceClass) -> ReportResult<()> {
        let index = self.index.as_ref().ok_or_else(|| {
            ReportError::Configuration("classic full-text index was not loaded".to_string())
        })?;
        let quirks = &self.ctx.config.quirks;

        for journal in &self.base.journals {
            if let Some(stats) = self.base.stats.get_mut(journal) {
                let map = classic_coverage(index, quirks, journal, stats, class);
                stats.set_coverage(source, map);
            }
        }
        Ok(())
    }
}

impl<'a> Report for FulltextReport<'a> {
    fn kind(&self) -> ReportKind {
        ReportKind::Fulltext
    }

    fn make_report(&mut self, collection: &str) -> ReportResult<()> {
        self.base.prepare(&self.ctx, collection)?;

        match self.format {
            ReportFormat::Curators => {
                self.classic_data(CoverageSource::Publisher, SourceClass::NotArxiv)?;
                self.classic_data(CoverageSource::Arxiv, SourceClass::Arxiv)?;
            }
            _ => self.general_data(),
        }

        info!(
            "Full-text statistics ready for {} journals in {}",
            self.base.journals.len(),
            collection
        );
        Ok(())
    }

    fn save_report(&self, writer: &ReportWriter, collection: &str) -> ReportResult<Vec<PathBuf>> {
        save_coverage(writer, &self.base, self.format, ReportSubject::Fulltext, collection)
    }
}

/// Write the coverage tables of a per-journal report: one general table for
/// NASA, one table per curator source otherwise
pub fn save_coverage(
    writer: &ReportWriter,
    base: &StatsBase,
    format: ReportFormat,
    subject: ReportSubject,
    collection: &str,
) -> ReportResult<Vec<PathBuf>> {
    let paths = writer.paths(format);
    let mut written = Vec::new();

    match format {
        ReportFormat::Curators => {
            for source in subject.curator_sources() {
                let table = coverage_table(base, *source);
                let path = paths.source_table(subject.name(), source.as_str(), collection);
                written.push(writer.write_table(&table, &path)?);
            }
        }
        _ => {
            let table = coverage_table(base, subject.general_source());
            let path = paths.table(subject.name(), collection);
            written.push(writer.write_table(&table, &path)?);
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::search::testing::StaticBackend;
    use tempfile::tempdir;

    const APJ: &str = "bibstem:\"ApJ..\" doctype:(article OR inproceedings)";

    fn config() -> Config {
        let mut config = Config::default();
        config.collections.get_mut("AST").unwrap().journals = vec!["ApJ..".to_string()];
        config
    }

    fn backend(config: &Config) -> StaticBackend {
        let full = format!("{} {}", APJ, config.fulltext_predicate);
        StaticBackend::new()
            .with_facet(APJ, "volume", &[(889, 189), (900, 196)])
            .with_facet(APJ, "year", &[(2019, 189), (2020, 196)])
            .with_facet(&full, "volume", &[(889, 180)])
    }

    #[test]
    fn test_general_report() {
        let config = config();
        let backend = backend(&config);
        let ctx = ReportContext::new(&config, &backend);
        let mut report = FulltextReport::new(ctx, ReportFormat::Nasa, None);

        report.make_report("AST").unwrap();
        let stats = report.base.journal("ApJ..").unwrap();
        let general = stats.coverage(CoverageSource::General).unwrap();
        assert_eq!(general[&889], 95.2);
        assert_eq!(general[&900], 0.0);
        assert!(stats.coverage(CoverageSource::Arxiv).is_none());
    }

    #[test]
    fn test_curators_report_uses_classic_index() {
        let config = config();
        let backend = backend(&config);
        let mut index = FulltextIndex::new();
        index.insert("ApJ..", 900, "arxiv");
        index.insert("ApJ..", 900, "iop");
        index.insert("ApJ..", 900, "iop");

        let ctx = ReportContext::new(&config, &backend);
        let mut report = FulltextReport::new(ctx, ReportFormat::Curators, Some(index));
        report.make_report("AST").unwrap();

        let stats = report.base.journal("ApJ..").unwrap();
        assert_eq!(stats.coverage(CoverageSource::Arxiv).unwrap()[&900], 0.5);
        assert_eq!(stats.coverage(CoverageSource::Publisher).unwrap()[&900], 1.0);
        assert_eq!(stats.coverage(CoverageSource::Publisher).unwrap()[&889], 0.0);
        assert!(stats.coverage(CoverageSource::General).is_none());
    }

    #[test]
    fn test_make_report_is_idempotent() {
        let config = config();
        let backend = backend(&config);
        let ctx = ReportContext::new(&config, &backend);
        let mut report = FulltextReport::new(ctx, ReportFormat::Nasa, None);

        report.make_report("AST").unwrap();
        let first = report.base.stats.clone();
        report.make_report("AST").unwrap();
        assert_eq!(report.base.stats, first);
    }

    #[test]
    fn test_unknown_collection_writes_nothing() {
        let config = config();
        let backend = backend(&config);
        let dir = tempdir().unwrap();
        let ctx = ReportContext::new(&config, &backend);
        let mut report = FulltextReport::new(ctx, ReportFormat::Nasa, None);

        assert!(matches!(report.make_report("FOO"), Err(ReportError::Configuration(_))));
        assert!(!dir.path().join("NASA").exists());
    }

    #[test]
    fn test_save_curators_writes_one_file_per_source() {
        let config = config();
        let backend = backend(&config);
        let dir = tempdir().unwrap();
        let writer = ReportWriter::new(dir.path(), "20240131");

        let mut report = FulltextReport::new(
            ReportContext::new(&config, &backend),
            ReportFormat::Curators,
            Some(FulltextIndex::new()),
        );
        report.make_report("AST").unwrap();
        let files = report.save_report(&writer, "AST").unwrap();

        assert_eq!(files.len(), 2);
        assert!(dir.path().join("CURATORS/fulltext_arxiv_AST_20240131.csv").exists());
        assert!(dir.path().join("CURATORS/fulltext_publisher_AST_20240131.csv").exists());
    }
}
