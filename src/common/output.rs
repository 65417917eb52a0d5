use std::path::{Path, PathBuf};

/// Output locations for one report run: `<output_dir>/<FORMAT>/<name>_<date>.csv`
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub directory: PathBuf,
    pub date: String,
}

impl ReportPaths {
    pub fn new<P: AsRef<Path>>(output_dir: P, format_dir: &str, date: &str) -> Self {
        Self {
            directory: output_dir.as_ref().join(format_dir),
            date: date.to_string(),
        }
    }

    /// "fulltext_AST_20240131.csv"
    pub fn table(&self, subject: &str, collection: &str) -> PathBuf {
        self.directory.join(format!(
            "{}_{}_{}.csv",
            subject.to_lowercase(),
            collection,
            self.date
        ))
    }

    /// "fulltext_arxiv_AST_20240131.csv"
    pub fn source_table(&self, subject: &str, source: &str, collection: &str) -> PathBuf {
        self.directory.join(format!(
            "{}_{}_{}_{}.csv",
            subject.to_lowercase(),
            source,
            collection,
            self.date
        ))
    }
}
