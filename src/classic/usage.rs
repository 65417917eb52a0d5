use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead};
use std::path::Path;

use super::open_index_lines;
use crate::error::{ReportError, ReportResult};
use crate::journal::short_bibstem;

/// Usage counts of one record: all years together and the current year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTotals {
    pub total: u64,
    pub recent: u64,
}

impl std::ops::AddAssign for UsageTotals {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.recent += other.recent;
    }
}

/// Per-bibcode usage from a classic `bibcode<TAB>count1...<TAB>countN` file.
/// The last column holds the current year.
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    records: HashMap<String, UsageTotals>,
}

impl UsageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bibcode: &str, totals: UsageTotals) {
        *self.records.entry(bibcode.to_string()).or_default() += totals;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Totals over all records of the given journals. Bibstems are compared
    /// without their trailing dots, so "ApJ" and "ApJ.." are the same journal.
    pub fn for_journals(&self, journals: &[String]) -> UsageTotals {
        let wanted: HashSet<&str> = journals.iter().map(|j| short_bibstem(j)).collect();
        let mut sum = UsageTotals::default();
        for (bibcode, totals) in &self.records {
            if let Some(stem) = bibcode.get(4..9) {
                if wanted.contains(short_bibstem(stem)) {
                    sum += *totals;
                }
            }
        }
        sum
    }
}

pub fn load_usage_index(path: &Path) -> ReportResult<UsageIndex> {
    info!("Loading usage index from: {}", path.display());
    let reader = open_index_lines(path).map_err(|e| ReportError::data_file(path, e))?;
    let index = read_usage_index(reader).map_err(|e| ReportError::data_file(path, e))?;
    info!("Loaded usage for {} records", index.len());
    Ok(index)
}

pub fn read_usage_index<R: BufRead>(reader: R) -> io::Result<UsageIndex> {
    let mut index = UsageIndex::new();
    let mut lines_failed = 0;

    for line_result in reader.lines() {
        let line = match line_result {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                lines_failed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_usage_line(&line) {
            Some((bibcode, totals)) => index.insert(bibcode, totals),
            None => {
                if lines_failed < 5 {
                    warn!("Failed to parse usage line: {}", line);
                }
                lines_failed += 1;
            }
        }
    }

    if lines_failed > 0 {
        warn!("Skipped {} malformed usage lines", lines_failed);
    }

    Ok(index)
}

fn parse_usage_line(line: &str) -> Option<(&str, UsageTotals)> {
    let mut fields = line.trim().split('\t');
    let bibcode = fields.next().filter(|b| !b.is_empty())?;
    let counts = fields
        .map(|f| f.trim().parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;
    let recent = *counts.last()?;

    Some((
        bibcode,
        UsageTotals {
            total: counts.iter().sum(),
            recent,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const READS: &str = "\
2022ApJ...924...44A\t10\t20\t30
2022A&A...660A..44K\t5\t7
2022MNRAS.509...44W\t1\t1\t1\t2
2021PhRvD.103..001X\t100\t100
2022ApJ...925...01B\tx\t1
";

    fn index() -> UsageIndex {
        read_usage_index(Cursor::new(READS)).unwrap()
    }

    #[test]
    fn test_parse_line() {
        let (bibcode, totals) = parse_usage_line("2022ApJ...924...44A\t10\t20\t30").unwrap();
        assert_eq!(bibcode, "2022ApJ...924...44A");
        assert_eq!(totals, UsageTotals { total: 60, recent: 30 });
        assert!(parse_usage_line("2022ApJ...924...44A").is_none());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        assert_eq!(index().len(), 4);
    }

    #[test]
    fn test_totals_for_journals_ignores_padding() {
        let journals = vec!["ApJ".to_string(), "A&A..".to_string()];
        assert_eq!(index().for_journals(&journals), UsageTotals { total: 72, recent: 37 });
    }

    #[test]
    fn test_empty_selection_is_zero() {
        assert_eq!(index().for_journals(&[]), UsageTotals::default());
    }
}
