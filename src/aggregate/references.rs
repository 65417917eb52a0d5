use log::{debug, info, warn};
use std::fs;
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use super::fulltext::save_coverage;
use super::{
    coverage_fraction, CoverageMap, CoverageSource, JournalStats, Report, ReportContext, ReportKind,
    StatsBase,
};
use crate::cli::{ReportFormat, ReportSubject};
use crate::error::{ReportError, ReportResult};
use crate::journal::{QuirkTable, ReferenceLocation};
use crate::report::ReportWriter;

/// Suffix of resolver result files produced from Crossref deposits
pub const CROSSREF_SUFFIX: &str = ".xref.xml.result";

/// Resolved and unresolved reference counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchTally {
    pub matched: u64,
    pub unmatched: u64,
}

impl MatchTally {
    pub fn total(&self) -> u64 {
        self.matched + self.unmatched
    }

    /// Percentage of references resolved, one decimal
    pub fn fraction(&self) -> f64 {
        coverage_fraction(self.matched, self.total())
    }
}

impl AddAssign for MatchTally {
    fn add_assign(&mut self, other: Self) {
        self.matched += other.matched;
        self.unmatched += other.unmatched;
    }
}

/// Which resolver result files count towards a coverage column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    All,
    Publisher,
    Crossref,
}

impl ReferenceSource {
    fn accepts(&self, file_name: &str) -> bool {
        match self {
            ReferenceSource::All => true,
            ReferenceSource::Publisher => !file_name.ends_with(CROSSREF_SUFFIX),
            ReferenceSource::Crossref => file_name.ends_with(CROSSREF_SUFFIX),
        }
    }
}

/// Result files for one journal volume, sorted by path
pub fn result_files(
    root: &Path,
    location: &ReferenceLocation,
    source: ReferenceSource,
) -> ReportResult<Vec<PathBuf>> {
    let dir = root.join(&location.directory).join(&location.volume);
    if !dir.is_dir() {
        debug!("No reference directory {}", dir.display());
        return Ok(Vec::new());
    }

    let pattern = format!("{}/*.result", glob::Pattern::escape(&dir.to_string_lossy()));
    let entries = glob::glob(&pattern).map_err(|e| ReportError::data_file(&dir, e))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Unreadable reference entry: {}", e);
                None
            }
        })
        .filter(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            if !source.accepts(&name) {
                return false;
            }
            match location.marker {
                Some((position, marker)) => name.chars().nth(position) == Some(marker),
                None => true,
            }
        })
        .collect();
    files.sort();

    Ok(files)
}

/// Count resolved ("1") and unresolved ("0", "5") lines of one result file.
/// Only the leading byte of a line is read; the rest may be in any encoding.
pub fn tally_file(path: &Path) -> io::Result<MatchTally> {
    let bytes = fs::read(path)?;
    let mut tally = MatchTally::default();
    for line in bytes.split(|b| *b == b'\n') {
        match line.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'1') => tally.matched += 1,
            Some(b'0') | Some(b'5') => tally.unmatched += 1,
            _ => {}
        }
    }
    Ok(tally)
}

/// Tally over every result file of a volume. Unreadable data counts as nothing.
pub fn tally_volume(
    root: &Path,
    location: &ReferenceLocation,
    source: ReferenceSource,
) -> MatchTally {
    let files = match result_files(root, location, source) {
        Ok(files) => files,
        Err(e) => {
            warn!("{}", e);
            return MatchTally::default();
        }
    };

    let mut tally = MatchTally::default();
    for file in &files {
        match tally_file(file) {
            Ok(t) => tally += t,
            Err(e) => warn!("Skipping reference file {}: {}", file.display(), e),
        }
    }
    tally
}

/// Cumulative resolved-reference percentage per reported volume. Totals run
/// over volumes in ascending order, so each value covers every volume up to
/// and including its key.
pub fn reference_coverage(
    root: &Path,
    quirks: &QuirkTable,
    journal: &str,
    stats: &JournalStats,
    source: ReferenceSource,
) -> CoverageMap {
    let mut running = MatchTally::default();
    let mut map = CoverageMap::new();

    for &volume in stats.publications.keys() {
        let location = quirks.reference_location(journal, volume);
        running += tally_volume(root, &location, source);
        map.insert(quirks.reported_volume(journal, volume), running.fraction());
    }
    map
}

/// Resolved-reference coverage per journal volume
pub struct ReferenceReport<'a> {
    ctx: ReportContext<'a>,
    format: ReportFormat,
    pub base: StatsBase,
}

impl<'a> ReferenceReport<'a> {
    pub fn new(ctx: ReportContext<'a>, format: ReportFormat) -> Self {
        Self {
            ctx,
            format,
            base: StatsBase::new(),
        }
    }

    fn columns(&self) -> &'static [(CoverageSource, ReferenceSource)] {
        match self.format {
            ReportFormat::Curators => &[
                (CoverageSource::Publisher, ReferenceSource::Publisher),
                (CoverageSource::Crossref, ReferenceSource::Crossref),
            ],
            _ => &[(CoverageSource::General, ReferenceSource::All)],
        }
    }
}

impl<'a> Report for ReferenceReport<'a> {
    fn kind(&self) -> ReportKind {
        ReportKind::References
    }

    fn make_report(&mut self, collection: &str) -> ReportResult<()> {
        self.base.prepare(&self.ctx, collection)?;

        let root = &self.ctx.config.reference_data;
        let quirks = &self.ctx.config.quirks;
        let columns = self.columns();
        let progress = self.ctx.progress_bar(self.base.journals.len(), "journals");

        for journal in &self.base.journals {
            progress.set_message(journal.clone());
            if let Some(stats) = self.base.stats.get_mut(journal) {
                for (column, source) in columns {
                    let map = reference_coverage(root, quirks, journal, stats, *source);
                    stats.set_coverage(*column, map);
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(
            "Reference statistics ready for {} journals in {}",
            self.base.journals.len(),
            collection
        );
        Ok(())
    }

    fn save_report(&self, writer: &ReportWriter, collection: &str) -> ReportResult<Vec<PathBuf>> {
        save_coverage(writer, &self.base, self.format, ReportSubject::References, collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::search::testing::StaticBackend;
    use tempfile::{tempdir, TempDir};

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn stats(volumes: &[i64]) -> JournalStats {
        JournalStats {
            publications: volumes.iter().map(|v| (*v, 10)).collect(),
            ..Default::default()
        }
    }

    fn fixture() -> TempDir {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "MNRAS/0500/2020MNRAS.500....1A.raw.result",
            "1 2019ApJ...870...12B\n0 unresolved\n",
        );
        write(dir.path(), "MNRAS/0501/2021MNRAS.501....1A.raw.result", "1 a\n1 b\n1 c\n5 d\n");
        write(dir.path(), "MNRAS/0501/2021MNRAS.501....1A.xref.xml.result", "1 a\n0 b\n\n");
        dir
    }

    #[test]
    fn test_single_match_and_miss() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "ApJ/0900/2020ApJ...900..179K.raw.result",
            "1 2019MNRAS.490...12B\n0 Smith 2019\n",
        );

        let quirks = QuirkTable::new();
        let s = stats(&[900]);
        let map = reference_coverage(dir.path(), &quirks, "ApJ..", &s, ReferenceSource::All);
        assert_eq!(map[&900], 50.0);
    }

    #[test]
    fn test_latin1_reference_still_counted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ApJ/0900/2020ApJ...900..179K.raw.result");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"1 2019MNRAS.490...12B\n0 M\xfcller 2019\n").unwrap();

        assert_eq!(tally_file(&path).unwrap(), MatchTally { matched: 1, unmatched: 1 });
        let quirks = QuirkTable::new();
        let s = stats(&[900]);
        let map = reference_coverage(dir.path(), &quirks, "ApJ..", &s, ReferenceSource::All);
        assert_eq!(map[&900], 50.0);
    }

    #[test]
    fn test_tally_file_codes() {
        let dir = fixture();
        let path = dir.path().join("MNRAS/0501/2021MNRAS.501....1A.raw.result");
        let tally = tally_file(&path).unwrap();
        assert_eq!(tally, MatchTally { matched: 3, unmatched: 1 });
    }

    #[test]
    fn test_cumulative_over_volumes() {
        let dir = fixture();
        let quirks = QuirkTable::new();
        let s = stats(&[500, 501, 502]);
        let map = reference_coverage(dir.path(), &quirks, "MNRAS", &s, ReferenceSource::All);

        // 500: 1/2; 501: (1+4)/(2+6); 502 has no directory and keeps the running value
        assert_eq!(map[&500], 50.0);
        assert_eq!(map[&501], 62.5);
        assert_eq!(map[&502], 62.5);
    }

    #[test]
    fn test_source_split() {
        let dir = fixture();
        let quirks = QuirkTable::new();
        let s = stats(&[501]);

        let publisher =
            reference_coverage(dir.path(), &quirks, "MNRAS", &s, ReferenceSource::Publisher);
        let crossref =
            reference_coverage(dir.path(), &quirks, "MNRAS", &s, ReferenceSource::Crossref);
        assert_eq!(publisher[&501], 75.0);
        assert_eq!(crossref[&501], 50.0);
    }

    #[test]
    fn test_missing_directory_counts_nothing() {
        let dir = tempdir().unwrap();
        let quirks = QuirkTable::new();
        let location = quirks.reference_location("AJ...", 160);
        let tally = tally_volume(dir.path(), &location, ReferenceSource::All);
        assert_eq!(tally, MatchTally::default());

        let s = stats(&[160]);
        let map = reference_coverage(dir.path(), &quirks, "AJ...", &s, ReferenceSource::All);
        assert_eq!(map[&160], 0.0);
    }

    #[test]
    fn test_letters_redirect_filters_by_marker() {
        let dir = tempdir().unwrap();
        write(dir.path(), "ApJ/0300/1985ApJ...300L..12X.raw.result", "1 a\n");
        write(dir.path(), "ApJ/0300/1985ApJ...300..120Y.raw.result", "0 a\n0 b\n");

        let quirks = QuirkTable::builtin();
        let s = stats(&[300]);
        let letters = reference_coverage(dir.path(), &quirks, "ApJL", &s, ReferenceSource::All);
        assert_eq!(letters[&300], 100.0);
        let main = reference_coverage(dir.path(), &quirks, "ApJ..", &s, ReferenceSource::All);
        assert_eq!(main[&300], 33.3);

        // inside the letters range the journal has its own directory
        let location = quirks.reference_location("ApJL", 500);
        let files = result_files(dir.path(), &location, ReferenceSource::All).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_report_curators_columns() {
        let dir = fixture();
        let query = "bibstem:\"MNRAS\" doctype:(article OR inproceedings)";
        let backend = StaticBackend::new().with_facet(query, "volume", &[(500, 300), (501, 320)]);
        let mut config = Config::default();
        config.reference_data = dir.path().to_path_buf();
        config.collections.get_mut("AST").unwrap().journals = vec!["MNRAS".to_string()];

        let ctx = ReportContext::new(&config, &backend);
        let mut report = ReferenceReport::new(ctx, ReportFormat::Curators);
        report.make_report("AST").unwrap();

        let stats = report.base.journal("MNRAS").unwrap();
        assert_eq!(stats.coverage(CoverageSource::Crossref).unwrap()[&501], 50.0);
        assert!(stats.coverage(CoverageSource::General).is_none());
    }
}
