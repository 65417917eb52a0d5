//! Rendering gathered statistics: tables to CSV files through polars, with
//! an optional coloured terminal preview.

pub mod highlight;
pub mod table;

pub use highlight::{highlight, Highlight};
pub use table::*;

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement};
use log::info;
use polars::prelude::{Column, CsvWriter, DataFrame, PolarsResult, SerWriter};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::cli::ReportFormat;
use crate::common::ReportPaths;
use crate::error::{ReportError, ReportResult};

/// Writes report tables under `<output_dir>/<FORMAT>/`
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    date: String,
    preview: bool,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, date: &str) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            date: date.to_string(),
            preview: false,
        }
    }

    /// Also print every written table to the terminal
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn paths(&self, format: ReportFormat) -> ReportPaths {
        ReportPaths::new(&self.output_dir, format.dir_name(), &self.date)
    }

    /// Write `table` as header-less CSV; blank cells are written as empty fields
    pub fn write_table(&self, table: &Table, path: &Path) -> ReportResult<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ReportError::output(parent, e))?;
        }

        let mut df = to_data_frame(table).map_err(|e| ReportError::output(path, e))?;
        let mut file = File::create(path).map_err(|e| ReportError::output(path, e))?;
        CsvWriter::new(&mut file)
            .include_header(false)
            .finish(&mut df)
            .map_err(|e| ReportError::output(path, e))?;

        info!("Wrote {} rows to {}", table.rows.len(), path.display());

        if self.preview {
            println!("{}", preview(table));
        }

        Ok(path.to_path_buf())
    }
}

fn to_data_frame(table: &Table) -> PolarsResult<DataFrame> {
    let columns = (0..table.width())
        .map(|i| {
            let values: Vec<Option<&str>> = table
                .rows
                .iter()
                .map(|row| row.get(i).map(|c| c.as_str()).filter(|c| !c.is_empty()))
                .collect();
            Column::new(format!("column_{}", i).into(), &values)
        })
        .collect::<Vec<_>>();

    DataFrame::new(columns)
}

/// Terminal rendering of a table; coverage cells get their colour band
pub fn preview(table: &Table) -> comfy_table::Table {
    let mut out = comfy_table::Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for (i, row) in table.rows.iter().enumerate() {
        let cells = row.iter().enumerate().map(|(j, value)| {
            let cell = Cell::new(value);
            let body = table.highlight && i >= table.header_rows && j > 0;
            match highlight(value) {
                Some(band) if body => cell.bg(band.color()),
                _ => cell,
            }
        });
        out.add_row(cells.collect::<Vec<_>>());
    }
    out
}
