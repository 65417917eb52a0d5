use anyhow::{bail, Context, Result};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use crate::aggregate::{create_report, ReportContext};
use crate::cli::{ReportArgs, ReportFormat, ReportSubject};
use crate::common::{date_stamp, format_elapsed, setup_logging};
use crate::config::Config;
use crate::report::ReportWriter;
use crate::search::ApiClient;

/// Gather and save one report. Nothing is written when gathering fails.
pub fn generate_report(
    ctx: ReportContext,
    subject: ReportSubject,
    format: ReportFormat,
    collection: &str,
    writer: &ReportWriter,
) -> Result<Vec<PathBuf>> {
    let mut report = create_report(ctx, subject, format).with_context(|| {
        format!(
            "Preparing \"{}\" report for \"{}\" on collection \"{}\" failed",
            subject, format, collection
        )
    })?;
    info!("Gathering {:?} statistics for {}", report.kind(), collection);

    if let Err(e) = report.make_report(collection) {
        error!("{}", e);
        bail!(
            "Creating \"{}\" report for \"{}\" on collection \"{}\" failed: {}",
            subject,
            format,
            collection,
            e
        );
    }

    match report.save_report(writer, collection) {
        Ok(files) => Ok(files),
        Err(e) => {
            error!("{}", e);
            bail!(
                "Saving \"{}\" report for \"{}\" on collection \"{}\" failed: {}",
                subject,
                format,
                collection,
                e
            );
        }
    }
}

pub fn run_report(args: ReportArgs) -> Result<Vec<PathBuf>> {
    let start_time = Instant::now();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = args.output_dir {
        config.output_directory = dir;
    }
    if let Some(token) = args.api_token {
        config.api_token = token;
    }

    setup_logging(args.log_level.as_deref(), &config.logging_level)?;

    info!("Starting coverage report");
    info!("Collection: {}", args.collection);
    info!("Format: {}", args.format);
    info!("Subject: {}", args.subject);
    info!("Output directory: {}", config.output_directory.display());

    config.validate_collection(&args.collection)?;
    if config.api_token.is_empty() {
        warn!("No API token configured, the search API will likely refuse requests");
    }

    let backend = ApiClient::new(&config).context("Failed to create search API client")?;
    let ctx = ReportContext::new(&config, &backend).with_progress(true);
    let writer =
        ReportWriter::new(&config.output_directory, &date_stamp()).with_preview(args.preview);

    let files = generate_report(ctx, args.subject, args.format, &args.collection, &writer)?;

    for file in &files {
        info!("Report written: {}", file.display());
    }
    info!("Completed in {}", format_elapsed(start_time.elapsed()));

    Ok(files)
}
