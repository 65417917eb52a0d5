//! Static configuration: collections, journal quirks, data locations and
//! query knobs. Built once at start-up and passed by reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, ReportResult};
use crate::journal::QuirkTable;

pub const DEFAULT_API_URL: &str = "https://ui.adsabs.harvard.edu/v1";
pub const DEFAULT_FULLTEXT_PREDICATE: &str = r#"fulltext_mtime:["1000-01-01t00:00:00.000Z" TO *]"#;
pub const DEFAULT_SAMPLE_TEMPLATE: &str = "{query} entdate:[NOW-365DAYS TO *]";

/// One named set of journals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub journals: Vec<String>,
    /// Extra search predicate appended to every collection query
    pub filter: Option<String>,
    /// Report usage as "NA" instead of reading the usage index
    pub skip_usage: bool,
    /// Template for the summary's recent content sample; `{query}` is replaced
    /// by the collection query extended with its references and citations
    pub sample_query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageIndexPaths {
    pub reads: PathBuf,
    pub downloads: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging_level: String,
    pub api_url: String,
    #[serde(skip_serializing)]
    pub api_token: String,
    pub request_timeout_secs: u64,
    pub classic_fulltext_index: PathBuf,
    pub classic_usage_index: UsageIndexPaths,
    pub reference_data: PathBuf,
    pub output_directory: PathBuf,
    /// Collection name standing for the union of all configured journals
    pub umbrella_collection: String,
    pub collections: BTreeMap<String, CollectionConfig>,
    pub quirks: QuirkTable,
    /// Document types counted as publications
    pub doctypes: Vec<String>,
    pub fulltext_predicate: String,
    pub metadata_predicate: String,
    pub facet_limit: usize,
    pub pivot_limit: usize,
    pub rows_per_page: usize,
}

impl Default for Config {
    fn default() -> Self {
        let mut collections = BTreeMap::new();
        collections.insert(
            "AST".to_string(),
            CollectionConfig {
                journals: to_strings(&[
                    "ApJ..", "ApJL", "ApJS.", "AJ...", "MNRAS", "A&A..", "A&AS.", "PASP.", "AN...",
                    "PhRvD", "JCAP.", "APh..", "CQGra",
                ]),
                sample_query: Some(DEFAULT_SAMPLE_TEMPLATE.to_string()),
                ..Default::default()
            },
        );
        collections.insert(
            "PS+HP".to_string(),
            CollectionConfig {
                journals: to_strings(&[
                    "AREPS", "ASTRA", "AdSpR", "AnGeo", "Ap&SS", "AsBio", "CeMDA", "E&PSL", "EM&P.",
                    "GeCoA", "IJAsB", "Icar.", "JAtS.", "JGRA.", "JGRD.", "JGRE.", "M&PS.", "M&PSA",
                    "Metic", "NatGe", "P&SS.", "PEPI.", "RvGeo", "SSRv.", "SoSyR", "SoPh.", "SpWea",
                    "PSJ..", "Moon.",
                ]),
                sample_query: Some(DEFAULT_SAMPLE_TEMPLATE.to_string()),
                ..Default::default()
            },
        );

        Self {
            logging_level: "INFO".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            api_token: String::new(),
            request_timeout_secs: 60,
            classic_fulltext_index: PathBuf::from("/tmp/all.links"),
            classic_usage_index: UsageIndexPaths {
                reads: PathBuf::from("/tmp/reads.links"),
                downloads: PathBuf::from("/tmp/downloads.links"),
            },
            reference_data: PathBuf::from("/references/resolved"),
            output_directory: PathBuf::from("reports"),
            umbrella_collection: "ALL".to_string(),
            collections,
            quirks: QuirkTable::builtin(),
            doctypes: to_strings(&["article", "inproceedings"]),
            fulltext_predicate: DEFAULT_FULLTEXT_PREDICATE.to_string(),
            metadata_predicate: "abs:*".to_string(),
            facet_limit: 1000,
            pivot_limit: 2000,
            rows_per_page: 1000,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from a TOML file, or fall back to the built-in defaults
    pub fn load(path: Option<&Path>) -> ReportResult<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| ReportError::data_file(path, e))?;
                Self::from_toml(&text).map_err(|e| {
                    ReportError::Configuration(format!("{}: {}", path.display(), e))
                })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionConfig> {
        self.collections.get(name)
    }

    /// Accepted values for the collection argument, umbrella included
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        if !self.umbrella_collection.is_empty()
            && !self.collections.contains_key(&self.umbrella_collection)
        {
            names.push(self.umbrella_collection.clone());
        }
        names
    }

    pub fn is_umbrella(&self, collection: &str) -> bool {
        collection == self.umbrella_collection
    }

    /// Journals of a collection. The umbrella collection resolves to every
    /// configured journal, each listed once.
    pub fn journals(&self, collection: &str) -> ReportResult<Vec<String>> {
        if let Some(config) = self.collection(collection) {
            return Ok(config.journals.clone());
        }
        if self.is_umbrella(collection) {
            return Ok(self.all_journals());
        }
        Err(ReportError::unknown_collection(collection))
    }

    pub fn all_journals(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.collections
            .values()
            .flat_map(|c| c.journals.iter())
            .filter(|j| seen.insert(j.as_str()))
            .cloned()
            .collect()
    }

    pub fn validate_collection(&self, collection: &str) -> ReportResult<()> {
        if self.collection_names().iter().any(|c| c == collection) {
            Ok(())
        } else {
            Err(ReportError::Configuration(format!(
                "Please specify one of the following values for the collection parameter: {}",
                self.collection_names().join(", ")
            )))
        }
    }

    /// `doctype:(article OR inproceedings)`
    pub fn doctype_clause(&self) -> String {
        format!("doctype:({})", self.doctypes.join(" OR "))
    }
}
