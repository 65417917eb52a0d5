use crate::aggregate::{CollectionSummary, CoverageSource, JournalStats, StatsBase};

/// Rows of cells ready to be written. The first `header_rows` rows are
/// labels; coverage tables are colour-banded in the preview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
    pub header_rows: usize,
    pub highlight: bool,
}

impl Table {
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

fn header_row(
    label: &str,
    base: &StatsBase,
    value: impl Fn(&JournalStats) -> String,
) -> Vec<String> {
    let mut row = vec![label.to_string()];
    row.extend(
        base.journals
            .iter()
            .map(|j| base.stats.get(j).map(&value).unwrap_or_default()),
    );
    row
}

/// One column per journal and one row per volume from 1 to the largest
/// reported volume, below five rows naming the journal and its year and
/// volume range. Volumes without a value are left blank.
pub fn coverage_table(base: &StatsBase, source: CoverageSource) -> Table {
    let mut journals = vec!["jrnl ->".to_string()];
    journals.extend(base.journals.iter().cloned());

    let mut rows = vec![
        journals,
        header_row("start year ->", base, |s| s.start_year.to_string()),
        header_row("last year ->", base, |s| s.last_year.to_string()),
        header_row("start vol ->", base, |s| s.start_volume.to_string()),
        header_row("last vol ->", base, |s| s.last_volume.to_string()),
    ];
    let header_rows = rows.len();

    for volume in 1..=base.max_volume() {
        let mut row = vec![volume.to_string()];
        for journal in &base.journals {
            let cell = base
                .stats
                .get(journal)
                .and_then(|s| s.coverage(source))
                .and_then(|m| m.get(&volume))
                .map(|v| format!("{:.1}", v))
                .unwrap_or_default();
            row.push(cell);
        }
        rows.push(row);
    }

    Table {
        rows,
        header_rows,
        highlight: true,
    }
}

pub fn summary_table(summaries: &[(String, CollectionSummary)]) -> Table {
    let mut header = vec!["collection".to_string()];
    header.extend(CollectionSummary::columns().iter().map(|c| c.to_string()));

    let mut rows = vec![header];
    for (label, summary) in summaries {
        let mut row = vec![label.clone()];
        row.extend(summary.values());
        rows.push(row);
    }

    Table {
        rows,
        header_rows: 1,
        highlight: false,
    }
}

pub const MISSING_COLUMNS: &[&str] = &[
    "journal",
    "bibcode",
    "doi",
    "title",
    "first_author",
    "volume",
    "issue",
];

/// One row per publication without full text, journals in configured order
pub fn missing_table(base: &StatsBase) -> Table {
    let mut rows = vec![MISSING_COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>()];

    for journal in &base.journals {
        let Some(stats) = base.stats.get(journal) else {
            continue;
        };
        for record in &stats.missing {
            rows.push(vec![
                journal.clone(),
                record.bibcode.clone(),
                record.doi.clone(),
                record.title.clone(),
                record.first_author.clone(),
                record.volume.clone(),
                record.issue.clone(),
            ]);
        }
    }

    Table {
        rows,
        header_rows: 1,
        highlight: false,
    }
}
