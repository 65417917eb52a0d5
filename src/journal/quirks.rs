use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::bibcode::reference_dir_name;

/// Inclusive range of volume numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRange {
    pub from: i64,
    pub to: i64,
}

impl VolumeRange {
    pub fn contains(&self, volume: i64) -> bool {
        self.from <= volume && volume <= self.to
    }
}

/// Reference data below `below_volume` is stored under a historical directory name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRename {
    pub below_volume: i64,
    pub directory: String,
}

/// Outside `[min_volume, max_volume]` reference data lives under another journal's
/// directory and only files with `marker` at character `position` belong to us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRedirect {
    pub directory: String,
    pub min_volume: i64,
    pub max_volume: i64,
    pub position: usize,
    pub marker: char,
}

/// Bibcodes of `bibstem` carrying `letter` as qualifier form a separate journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRule {
    pub bibstem: String,
    pub letter: char,
}

/// Per-journal idiosyncrasies. Every rule is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalQuirks {
    /// First publication year when the year doubles as volume number
    pub year_is_volume: Option<i64>,
    /// Volumes for which no full text is expected
    pub excluded_volumes: Vec<VolumeRange>,
    pub reference_rename: Option<ReferenceRename>,
    pub reference_redirect: Option<ReferenceRedirect>,
    pub split_from: Option<SplitRule>,
}

/// Where the resolver results for one journal volume are found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLocation {
    pub directory: String,
    pub volume: String,
    /// (character position, expected character) filter on result file names
    pub marker: Option<(usize, char)>,
}

/// Declarative lookup table of journal quirks, keyed by journal identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuirkTable {
    entries: BTreeMap<String, JournalQuirks>,
}

impl QuirkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, journal: impl Into<String>, quirks: JournalQuirks) {
        self.entries.insert(journal.into(), quirks);
    }

    pub fn get(&self, journal: &str) -> Option<&JournalQuirks> {
        self.entries.get(journal)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn year_is_volume(&self, journal: &str) -> Option<i64> {
        self.get(journal).and_then(|q| q.year_is_volume)
    }

    pub fn is_excluded(&self, journal: &str, volume: i64) -> bool {
        self.get(journal)
            .map(|q| q.excluded_volumes.iter().any(|r| r.contains(volume)))
            .unwrap_or(false)
    }

    /// Volume number as it appears in reports. Year-as-volume journals are
    /// renumbered 1, 2, ... from their start year.
    pub fn reported_volume(&self, journal: &str, raw: i64) -> i64 {
        match self.year_is_volume(journal) {
            Some(start) => raw - start + 1,
            None => raw,
        }
    }

    /// Journal that a (bibstem, qualifier) pair is split off into, if any
    pub fn split_target(&self, bibstem: &str, letter: char) -> Option<&str> {
        self.entries.iter().find_map(|(journal, q)| match &q.split_from {
            Some(rule) if rule.bibstem == bibstem && rule.letter == letter => {
                Some(journal.as_str())
            }
            _ => None,
        })
    }

    pub fn reference_location(&self, journal: &str, volume: i64) -> ReferenceLocation {
        let mut directory = reference_dir_name(journal);
        let mut marker = None;

        if let Some(q) = self.get(journal) {
            if let Some(rename) = &q.reference_rename {
                if volume < rename.below_volume {
                    directory = rename.directory.clone();
                }
            }
            if let Some(redirect) = &q.reference_redirect {
                if volume < redirect.min_volume || volume > redirect.max_volume {
                    directory = redirect.directory.clone();
                    marker = Some((redirect.position, redirect.marker));
                }
            }
        }

        ReferenceLocation {
            directory,
            volume: format!("{:04}", volume),
            marker,
        }
    }

    /// Quirks of the production journal set
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(
            "JCAP.",
            JournalQuirks {
                year_is_volume: Some(2003),
                ..Default::default()
            },
        );
        table.insert(
            "A&A..",
            JournalQuirks {
                reference_rename: Some(ReferenceRename {
                    below_volume: 317,
                    directory: "A&A".to_string(),
                }),
                ..Default::default()
            },
        );
        table.insert(
            "A&AS.",
            JournalQuirks {
                reference_rename: Some(ReferenceRename {
                    below_volume: 121,
                    directory: "A&AS".to_string(),
                }),
                ..Default::default()
            },
        );
        table.insert(
            "ApJL",
            JournalQuirks {
                split_from: Some(SplitRule {
                    bibstem: "ApJ..".to_string(),
                    letter: 'L',
                }),
                reference_redirect: Some(ReferenceRedirect {
                    directory: "ApJ".to_string(),
                    min_volume: 474,
                    max_volume: 888,
                    position: 13,
                    marker: 'L',
                }),
                ..Default::default()
            },
        );
        table
    }
}
