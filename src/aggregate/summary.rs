use log::{debug, info, warn};
use std::fmt;
use std::path::PathBuf;

use super::{Report, ReportContext, ReportKind};
use crate::classic::{UsageIndex, UsageTotals};
use crate::cli::{ReportFormat, ReportSubject};
use crate::common::current_year;
use crate::error::{BackendError, ReportResult};
use crate::report::{summary_table, ReportWriter};
use crate::search::{
    collection_query, facet_total, sample_query, with_predicate, CitationCounts, SearchBackend,
};

pub const REFEREED_PREDICATE: &str = "property:refereed";
pub const OPEN_ACCESS_PREDICATE: &str = "property:openaccess";
pub const DATA_PREDICATE: &str = "property:data";

/// Usage figure, or "NA" where usage is not reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageValue {
    Count(u64),
    NotApplicable,
}

impl Default for UsageValue {
    fn default() -> Self {
        UsageValue::Count(0)
    }
}

impl fmt::Display for UsageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageValue::Count(n) => write!(f, "{}", n),
            UsageValue::NotApplicable => f.write_str("NA"),
        }
    }
}

/// Reads and downloads loaded from the classic usage files
#[derive(Debug, Clone, Default)]
pub struct UsageTables {
    pub reads: UsageIndex,
    pub downloads: UsageIndex,
}

/// One row of the summary report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub nrecs: u64,
    pub ftrecs: u64,
    pub refrecs: u64,
    pub oarecs: u64,
    pub dlrecs: u64,
    pub citnum: u64,
    pub recent_citnum: u64,
    pub reads: UsageValue,
    pub recent_reads: UsageValue,
    pub downloads: UsageValue,
    pub recent_downloads: UsageValue,
}

impl CollectionSummary {
    pub fn new(skip_usage: bool) -> Self {
        let usage = if skip_usage {
            UsageValue::NotApplicable
        } else {
            UsageValue::Count(0)
        };
        Self {
            reads: usage,
            recent_reads: usage,
            downloads: usage,
            recent_downloads: usage,
            ..Default::default()
        }
    }

    pub fn columns() -> &'static [&'static str] {
        &[
            "nrecs",
            "ftrecs",
            "refrecs",
            "oarecs",
            "dlrecs",
            "citnum",
            "recent_citnum",
            "reads",
            "recent_reads",
            "downloads",
            "recent_downloads",
        ]
    }

    pub fn values(&self) -> Vec<String> {
        vec![
            self.nrecs.to_string(),
            self.ftrecs.to_string(),
            self.refrecs.to_string(),
            self.oarecs.to_string(),
            self.dlrecs.to_string(),
            self.citnum.to_string(),
            self.recent_citnum.to_string(),
            self.reads.to_string(),
            self.recent_reads.to_string(),
            self.downloads.to_string(),
            self.recent_downloads.to_string(),
        ]
    }

    fn set_usage(&mut self, reads: UsageTotals, downloads: UsageTotals) {
        self.reads = UsageValue::Count(reads.total);
        self.recent_reads = UsageValue::Count(reads.recent);
        self.downloads = UsageValue::Count(downloads.total);
        self.recent_downloads = UsageValue::Count(downloads.recent);
    }
}

fn or_default<T: Default>(label: &str, statistic: &str, result: Result<T, BackendError>) -> T {
    result.unwrap_or_else(|e| {
        warn!("{} for {} unavailable: {}", statistic, label, e);
        T::default()
    })
}

fn record_count(backend: &dyn SearchBackend, query: &str) -> Result<u64, BackendError> {
    Ok(facet_total(&backend.facet_counts(query, "year")?))
}

/// Record, citation and usage figures for one query. Each figure is fetched
/// on its own; a failing one is logged and left at zero.
pub fn summarize(
    backend: &dyn SearchBackend,
    label: &str,
    query: &str,
    fulltext_predicate: &str,
    year: i64,
    usage: Option<(&UsageTables, &[String])>,
    skip_usage: bool,
) -> CollectionSummary {
    let mut summary = CollectionSummary::new(skip_usage);
    debug!("Summary query for {}: {}", label, query);

    summary.nrecs = or_default(label, "nrecs", record_count(backend, query));
    let subset = |predicate: &str| record_count(backend, &with_predicate(query, predicate));
    summary.ftrecs = or_default(label, "ftrecs", subset(fulltext_predicate));
    summary.refrecs = or_default(label, "refrecs", subset(REFEREED_PREDICATE));
    summary.oarecs = or_default(label, "oarecs", subset(OPEN_ACCESS_PREDICATE));
    summary.dlrecs = or_default(label, "dlrecs", subset(DATA_PREDICATE));

    let citations: CitationCounts = or_default(label, "citnum", backend.citation_counts(query));
    summary.citnum = citations.values().sum();
    summary.recent_citnum = citations.get(&year).copied().unwrap_or(0);

    if !skip_usage {
        if let Some((tables, journals)) = usage {
            summary.set_usage(
                tables.reads.for_journals(journals),
                tables.downloads.for_journals(journals),
            );
        }
    }

    summary
}

/// Figures for every configured collection and content sample
pub struct SummaryReport<'a> {
    ctx: ReportContext<'a>,
    format: ReportFormat,
    usage: Option<UsageTables>,
    pub rows: Vec<(String, CollectionSummary)>,
}

impl<'a> SummaryReport<'a> {
    pub fn new(ctx: ReportContext<'a>, format: ReportFormat, usage: Option<UsageTables>) -> Self {
        Self {
            ctx,
            format,
            usage,
            rows: Vec::new(),
        }
    }
}

impl<'a> Report for SummaryReport<'a> {
    fn kind(&self) -> ReportKind {
        ReportKind::Summary
    }

    fn make_report(&mut self, collection: &str) -> ReportResult<()> {
        let config = self.ctx.config;
        config.validate_collection(collection)?;
        self.rows.clear();

        let year = current_year();
        let clause = config.doctype_clause();
        let collections: Vec<_> = config
            .collections
            .iter()
            .filter(|(name, _)| !config.is_umbrella(name))
            .collect();

        let progress = self.ctx.progress_bar(collections.len(), "collections");
        let mut samples = Vec::new();
        for (name, settings) in &collections {
            progress.set_message((*name).clone());
            let query = collection_query(&settings.journals, &clause, settings.filter.as_deref());
            let usage = self.usage.as_ref().map(|u| (u, settings.journals.as_slice()));
            let summary = summarize(
                self.ctx.backend,
                name,
                &query,
                &config.fulltext_predicate,
                year,
                usage,
                settings.skip_usage,
            );
            self.rows.push(((*name).clone(), summary));

            if let Some(template) = &settings.sample_query {
                samples.push((format!("{} recent sample", name), sample_query(template, &query)));
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        for (label, query) in samples {
            let predicate = &config.fulltext_predicate;
            let summary = summarize(self.ctx.backend, &label, &query, predicate, year, None, true);
            self.rows.push((label, summary));
        }

        info!("Summary ready with {} rows", self.rows.len());
        Ok(())
    }

    fn save_report(&self, writer: &ReportWriter, collection: &str) -> ReportResult<Vec<PathBuf>> {
        let path = writer.paths(self.format).table(ReportSubject::Summary.name(), collection);
        let table = summary_table(&self.rows);
        Ok(vec![writer.write_table(&table, &path)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectionConfig, Config};
    use crate::error::ReportError;
    use crate::search::testing::StaticBackend;

    const QUERY: &str = "bibstem:(\"Icar.\" OR \"SoPh.\") doctype:(article OR inproceedings)";

    fn config(skip_usage: bool) -> Config {
        let mut config = Config::default();
        config.collections.clear();
        config.collections.insert(
            "PS+HP".to_string(),
            CollectionConfig {
                journals: vec!["Icar.".to_string(), "SoPh.".to_string()],
                skip_usage,
                ..Default::default()
            },
        );
        config
    }

    fn backend() -> StaticBackend {
        StaticBackend::new()
            .with_facet(QUERY, "year", &[(2019, 700), (2020, 650)])
            .with_facet(
                &with_predicate(QUERY, REFEREED_PREDICATE),
                "year",
                &[(2019, 600), (2020, 600)],
            )
            .with_citations(QUERY, &[(2001, 9_000), (2019, 14_766), (current_year(), 1_234)])
    }

    fn usage() -> UsageTables {
        let mut tables = UsageTables::default();
        tables.reads.insert("2020Icar..335....1A", UsageTotals { total: 40, recent: 4 });
        tables.reads.insert("2020SoPh..295....2B", UsageTotals { total: 10, recent: 1 });
        tables.reads.insert("2020ApJ...900....3C", UsageTotals { total: 99, recent: 9 });
        tables.downloads.insert("2020SoPh..295....2B", UsageTotals { total: 7, recent: 2 });
        tables
    }

    #[test]
    fn test_summary_with_usage() {
        let config = config(false);
        let backend = backend();
        let ctx = ReportContext::new(&config, &backend);
        let mut report = SummaryReport::new(ctx, ReportFormat::Summary, Some(usage()));
        report.make_report("PS+HP").unwrap();

        assert_eq!(report.rows.len(), 1);
        let (label, summary) = &report.rows[0];
        assert_eq!(label, "PS+HP");
        assert_eq!(summary.nrecs, 1350);
        assert_eq!(summary.refrecs, 1200);
        assert_eq!(summary.ftrecs, 0);
        assert_eq!(summary.citnum, 25_000);
        assert_eq!(summary.recent_citnum, 1_234);
        assert_eq!(summary.reads, UsageValue::Count(50));
        assert_eq!(summary.recent_reads, UsageValue::Count(5));
        assert_eq!(summary.downloads, UsageValue::Count(7));
        assert_eq!(summary.recent_downloads, UsageValue::Count(2));
    }

    #[test]
    fn test_citations_split_by_publication_year() {
        let backend = StaticBackend::new().with_citations(QUERY, &[(2018, 40), (2019, 2)]);
        let summary = summarize(&backend, "PS+HP", QUERY, "property:fulltext", 2019, None, true);
        assert_eq!(summary.citnum, 42);
        assert_eq!(summary.recent_citnum, 2);

        let summary = summarize(&backend, "PS+HP", QUERY, "property:fulltext", 2020, None, true);
        assert_eq!(summary.citnum, 42);
        assert_eq!(summary.recent_citnum, 0);
    }

    #[test]
    fn test_skip_usage_reports_na() {
        let config = config(true);
        let backend = backend();
        let ctx = ReportContext::new(&config, &backend);
        let mut report = SummaryReport::new(ctx, ReportFormat::Summary, Some(usage()));
        report.make_report("PS+HP").unwrap();

        let (_, summary) = &report.rows[0];
        assert_eq!(summary.nrecs, 1350);
        let values = summary.values();
        assert_eq!(&values[7..], &["NA", "NA", "NA", "NA"]);
    }

    #[test]
    fn test_failing_statistic_keeps_default() {
        let config = config(false);
        let backend = backend().failing_on(REFEREED_PREDICATE);
        let ctx = ReportContext::new(&config, &backend);
        let mut report = SummaryReport::new(ctx, ReportFormat::Summary, None);
        report.make_report("PS+HP").unwrap();

        let (_, summary) = &report.rows[0];
        assert_eq!(summary.refrecs, 0);
        assert_eq!(summary.nrecs, 1350);
        assert_eq!(summary.citnum, 25_000);
        assert_eq!(summary.reads, UsageValue::Count(0));
    }

    #[test]
    fn test_recent_sample_rows() {
        let mut config = config(false);
        config.collections.get_mut("PS+HP").unwrap().sample_query =
            Some("{query} year:2020".to_string());
        let sample = sample_query("{query} year:2020", QUERY);
        let backend = backend().with_facet(&sample, "year", &[(2020, 300)]);

        let ctx = ReportContext::new(&config, &backend);
        let mut report = SummaryReport::new(ctx, ReportFormat::Summary, Some(usage()));
        report.make_report("ALL").unwrap();

        assert_eq!(report.rows.len(), 2);
        let (label, summary) = &report.rows[1];
        assert_eq!(label, "PS+HP recent sample");
        assert_eq!(summary.nrecs, 300);
        assert_eq!(summary.reads, UsageValue::NotApplicable);
    }

    #[test]
    fn test_unknown_collection_rejected() {
        let config = config(false);
        let backend = backend();
        let ctx = ReportContext::new(&config, &backend);
        let mut report = SummaryReport::new(ctx, ReportFormat::Summary, None);
        assert!(matches!(report.make_report("FOO"), Err(ReportError::Configuration(_))));
        assert!(report.rows.is_empty());
    }
}
