//! Coverage aggregation: per-journal statistics for one collection and the
//! cross-collection summary. Every report variant implements [`Report`].

pub mod base;
pub mod coverage;
pub mod fulltext;
pub mod metadata;
pub mod missing;
pub mod references;
pub mod stats;
pub mod summary;

pub use base::*;
pub use coverage::*;
pub use fulltext::FulltextReport;
pub use metadata::MetadataReport;
pub use missing::MissingReport;
pub use references::*;
pub use stats::*;
pub use summary::*;

use indicatif::ProgressBar;
use log::{info, warn};
use std::path::PathBuf;

use crate::classic::{build_fulltext_index, load_usage_index};
use crate::cli::{ReportFormat, ReportSubject};
use crate::common::{create_count_progress_bar, create_spinner};
use crate::config::Config;
use crate::error::{ReportError, ReportResult};
use crate::report::ReportWriter;
use crate::search::SearchBackend;

/// Collaborators shared by all report variants for one run
pub struct ReportContext<'a> {
    pub config: &'a Config,
    pub backend: &'a dyn SearchBackend,
    pub show_progress: bool,
}

impl<'a> ReportContext<'a> {
    pub fn new(config: &'a Config, backend: &'a dyn SearchBackend) -> Self {
        Self {
            config,
            backend,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub(crate) fn progress_bar(&self, len: usize, unit: &str) -> ProgressBar {
        if self.show_progress {
            create_count_progress_bar(len as u64, unit)
        } else {
            ProgressBar::hidden()
        }
    }

    pub(crate) fn spinner(&self, message: &str) -> ProgressBar {
        if self.show_progress {
            let pb = create_spinner(message);
            pb.enable_steady_tick(std::time::Duration::from_millis(120));
            pb
        } else {
            ProgressBar::hidden()
        }
    }
}

/// Contract every report variant fulfils
pub trait Report {
    fn kind(&self) -> ReportKind;

    /// Gather statistics for `collection`. Any previous results are discarded.
    fn make_report(&mut self, collection: &str) -> ReportResult<()>;

    /// Hand the gathered statistics to the writer; returns the files written
    fn save_report(&self, writer: &ReportWriter, collection: &str) -> ReportResult<Vec<PathBuf>>;
}

/// Report variant selected from subject and format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Fulltext,
    References,
    Metadata,
    Missing,
    Summary,
}

impl ReportKind {
    pub fn select(subject: ReportSubject, format: ReportFormat) -> ReportResult<Self> {
        match (subject, format) {
            (ReportSubject::Summary, _) | (_, ReportFormat::Summary) => Ok(ReportKind::Summary),
            (ReportSubject::Fulltext, ReportFormat::Missing) => Ok(ReportKind::Missing),
            (_, ReportFormat::Missing) => Err(ReportError::Configuration(format!(
                "format {} is only available for subject {}",
                ReportFormat::Missing,
                ReportSubject::Fulltext
            ))),
            (ReportSubject::Fulltext, _) => Ok(ReportKind::Fulltext),
            (ReportSubject::References, _) => Ok(ReportKind::References),
            (ReportSubject::Metadata, _) => Ok(ReportKind::Metadata),
        }
    }
}

/// Build the report variant for (subject, format), loading the classic
/// indexes it needs
pub fn create_report<'a>(
    ctx: ReportContext<'a>,
    subject: ReportSubject,
    format: ReportFormat,
) -> ReportResult<Box<dyn Report + 'a>> {
    let kind = ReportKind::select(subject, format)?;
    info!("Selected {:?} report ({} / {})", kind, subject, format);

    let report: Box<dyn Report + 'a> = match kind {
        ReportKind::Fulltext => {
            let index = match format {
                ReportFormat::Curators => {
                    let spinner = ctx.spinner("Loading classic full-text index...");
                    let index = build_fulltext_index(
                        &ctx.config.classic_fulltext_index,
                        &ctx.config.all_journals(),
                        &ctx.config.quirks,
                    );
                    spinner.finish_and_clear();
                    Some(index?)
                }
                _ => None,
            };
            Box::new(FulltextReport::new(ctx, format, index))
        }
        ReportKind::References => Box::new(ReferenceReport::new(ctx, format)),
        ReportKind::Metadata => Box::new(MetadataReport::new(ctx, format)),
        ReportKind::Missing => Box::new(MissingReport::new(ctx)),
        ReportKind::Summary => {
            let needs_usage = ctx.config.collections.values().any(|c| !c.skip_usage);
            let usage = if needs_usage {
                let paths = &ctx.config.classic_usage_index;
                let spinner = ctx.spinner("Loading usage data...");
                let loaded = (load_usage_index(&paths.reads), load_usage_index(&paths.downloads));
                spinner.finish_and_clear();
                match loaded {
                    (Ok(reads), Ok(downloads)) => Some(UsageTables { reads, downloads }),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!("Usage data unavailable, usage columns stay at zero: {}", e);
                        None
                    }
                }
            } else {
                None
            };
            Box::new(SummaryReport::new(ctx, format, usage))
        }
    };

    Ok(report)
}
