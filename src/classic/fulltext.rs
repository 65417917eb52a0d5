use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead};
use std::path::Path;
use std::time::Instant;

use super::open_index_lines;
use crate::common::format_elapsed;
use crate::error::{ReportError, ReportResult};
use crate::journal::{Bibcode, QuirkTable, VolumeField};

/// Which full-text origin a coverage column counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceClass {
    Arxiv,
    NotArxiv,
}

impl SourceClass {
    pub fn matches(&self, source: &str) -> bool {
        match self {
            SourceClass::Arxiv => source == "arxiv",
            SourceClass::NotArxiv => source != "arxiv",
        }
    }
}

/// Full-text sources per (journal, volume), built from the classic link file
#[derive(Debug, Clone, Default)]
pub struct FulltextIndex {
    entries: HashMap<(String, i64), Vec<String>>,
    rows: usize,
}

/// Line counters from one index load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulltextLoadStats {
    pub lines: usize,
    pub indexed: usize,
    pub other_journals: usize,
    pub skipped_volumes: usize,
    pub malformed: usize,
}

impl FulltextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record. Sources are stored lower case.
    pub fn insert(&mut self, journal: &str, volume: i64, source: &str) {
        self.entries
            .entry((journal.to_string(), volume))
            .or_default()
            .push(source.to_lowercase());
        self.rows += 1;
    }

    /// Source tags for a journal volume restricted to one class; empty when nothing matches
    pub fn sources(&self, journal: &str, volume: i64, class: SourceClass) -> Vec<&str> {
        self.entries
            .get(&(journal.to_string(), volume))
            .map(|sources| {
                sources
                    .iter()
                    .map(|s| s.as_str())
                    .filter(|s| class.matches(s))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count(&self, journal: &str, volume: i64, class: SourceClass) -> usize {
        self.sources(journal, volume, class).len()
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of distinct (journal, volume) keys
    pub fn volume_count(&self) -> usize {
        self.entries.len()
    }
}

/// Build the full-text lookup from a `bibcode<TAB>file<TAB>source` file,
/// keeping only records of the given journals.
pub fn build_fulltext_index(
    path: &Path,
    journals: &[String],
    quirks: &QuirkTable,
) -> ReportResult<FulltextIndex> {
    info!("Building full-text index from: {}", path.display());
    let start = Instant::now();

    let reader = open_index_lines(path).map_err(|e| ReportError::data_file(path, e))?;
    let (index, stats) =
        read_fulltext_index(reader, journals, quirks).map_err(|e| ReportError::data_file(path, e))?;

    info!(
        "Built full-text index with {} records ({} journal volumes) from {} lines in {}",
        index.len(),
        index.volume_count(),
        stats.lines,
        format_elapsed(start.elapsed())
    );
    if stats.skipped_volumes > 0 {
        info!("  ({} records without a usable volume)", stats.skipped_volumes);
    }
    if stats.malformed > 0 {
        warn!("  ({} malformed lines skipped)", stats.malformed);
    }

    Ok(index)
}

pub fn read_fulltext_index<R: BufRead>(
    reader: R,
    journals: &[String],
    quirks: &QuirkTable,
) -> io::Result<(FulltextIndex, FulltextLoadStats)> {
    let include: HashSet<&str> = journals.iter().map(|j| j.as_str()).collect();
    let mut index = FulltextIndex::new();
    let mut stats = FulltextLoadStats::default();

    for line_result in reader.lines() {
        let line = match line_result {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                stats.malformed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        if line.trim().is_empty() {
            continue;
        }
        stats.lines += 1;

        let fields: Vec<&str> = line.trim().split('\t').collect();
        let (bibcode, source) = match fields.as_slice() {
            [bibcode, _file, source] => (*bibcode, *source),
            _ => {
                if stats.malformed < 5 {
                    warn!("Malformed full-text index line: {}", line);
                }
                stats.malformed += 1;
                continue;
            }
        };

        let Some(parsed) = Bibcode::parse(bibcode) else {
            if stats.malformed < 5 {
                warn!("Cannot parse bibcode in full-text index: {}", bibcode);
            }
            stats.malformed += 1;
            continue;
        };

        let journal = quirks
            .split_target(parsed.bibstem, parsed.qualifier)
            .unwrap_or(parsed.bibstem);
        if !include.contains(journal) {
            stats.other_journals += 1;
            continue;
        }

        let volume = match (parsed.volume(), quirks.year_is_volume(journal)) {
            (VolumeField::Temporary, _) | (VolumeField::Invalid, None) => {
                info!(
                    "Processing Classic fulltext index. Cannot get volume for: {}. Skipping...",
                    bibcode
                );
                stats.skipped_volumes += 1;
                continue;
            }
            (_, Some(_)) => parsed.year,
            (VolumeField::Number(v), None) => v,
        };

        index.insert(journal, volume, source);
        stats.indexed += 1;
    }

    Ok((index, stats))
}
