use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

use crate::aggregate::CoverageSource;

#[derive(Parser)]
#[command(name = "coverage-report")]
#[command(about = "Journal coverage reports for full text, references, metadata and summaries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a coverage report for one collection
    Report(ReportArgs),

    /// List configured collections and their journals
    Collections(CollectionsArgs),
}

/// Audience and shape of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Public report, one general table per subject
    #[value(name = "NASA", alias = "general")]
    Nasa,
    /// Internal report, one table per data source
    #[value(name = "CURATORS")]
    Curators,
    /// Publications without full text
    #[value(name = "MISSING")]
    Missing,
    /// Collection-level summary
    #[value(name = "SUMMARY")]
    Summary,
}

impl ReportFormat {
    /// Directory under the output directory holding this format's files
    pub fn dir_name(&self) -> &'static str {
        match self {
            ReportFormat::Nasa => "NASA",
            ReportFormat::Curators => "CURATORS",
            ReportFormat::Missing => "MISSING",
            ReportFormat::Summary => "SUMMARY",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// What the report measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportSubject {
    #[value(name = "FULLTEXT")]
    Fulltext,
    #[value(name = "REFERENCES")]
    References,
    #[value(name = "SUMMARY")]
    Summary,
    #[value(name = "METADATA")]
    Metadata,
}

impl ReportSubject {
    /// Lower-case name used in output file names
    pub fn name(&self) -> &'static str {
        match self {
            ReportSubject::Fulltext => "fulltext",
            ReportSubject::References => "references",
            ReportSubject::Summary => "summary",
            ReportSubject::Metadata => "metadata",
        }
    }

    pub fn general_source(&self) -> CoverageSource {
        match self {
            ReportSubject::Metadata => CoverageSource::Metadata,
            _ => CoverageSource::General,
        }
    }

    /// Sources reported separately in CURATORS reports
    pub fn curator_sources(&self) -> &'static [CoverageSource] {
        match self {
            ReportSubject::Fulltext => &[CoverageSource::Arxiv, CoverageSource::Publisher],
            ReportSubject::References => &[CoverageSource::Publisher, CoverageSource::Crossref],
            ReportSubject::Metadata => &[CoverageSource::Metadata],
            ReportSubject::Summary => &[],
        }
    }
}

impl fmt::Display for ReportSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().to_uppercase())
    }
}

#[derive(Parser, Clone)]
pub struct ReportArgs {
    /// Collection to report on (see the `collections` subcommand)
    #[arg(short, long, required = true)]
    pub collection: String,

    /// Report format
    #[arg(short, long, value_enum, ignore_case = true, default_value = "NASA")]
    pub format: ReportFormat,

    /// Report subject
    #[arg(short, long, value_enum, ignore_case = true, default_value = "FULLTEXT")]
    pub subject: ReportSubject,

    /// TOML configuration file; built-in defaults when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the report files (overrides the configuration)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Search API token
    #[arg(long, env = "ADS_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Print the written tables to the terminal
    #[arg(long)]
    pub preview: bool,

    /// Logging level (DEBUG, INFO, WARN, ERROR); defaults to the configured level
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Parser, Clone)]
pub struct CollectionsArgs {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_args() {
        let cli = Cli::try_parse_from([
            "coverage-report",
            "report",
            "-c",
            "AST",
            "-f",
            "curators",
            "-s",
            "REFERENCES",
        ])
        .unwrap();
        let Commands::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.collection, "AST");
        assert_eq!(args.format, ReportFormat::Curators);
        assert_eq!(args.subject, ReportSubject::References);
        assert!(!args.preview);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["coverage-report", "report", "-c", "PS+HP"]).unwrap();
        let Commands::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.format, ReportFormat::Nasa);
        assert_eq!(args.subject, ReportSubject::Fulltext);
    }

    #[test]
    fn test_invalid_format_rejected() {
        let err = Cli::try_parse_from(["coverage-report", "report", "-c", "AST", "-f", "EXCEL"])
            .err()
            .unwrap();
        assert!(err.to_string().contains("NASA"));
    }

    #[test]
    fn test_collection_required() {
        assert!(Cli::try_parse_from(["coverage-report", "report"]).is_err());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ReportFormat::Curators.to_string(), "CURATORS");
        assert_eq!(ReportSubject::Fulltext.to_string(), "FULLTEXT");
        assert_eq!(ReportSubject::References.name(), "references");
    }
}
