/// Pivot used for citation totals
pub const CITATION_PIVOT: &str = "year,citation_count";

/// Fields requested when listing publications without full text
pub const MISSING_FIELDS: &[&str] = &["bibcode", "doi", "title", "first_author", "volume", "issue"];

pub type QueryParams = Vec<(String, String)>;

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Facet query: one row, counts per value of `field`
pub fn facet_params(query: &str, field: &str, limit: usize) -> QueryParams {
    vec![
        param("q", query),
        param("fl", "id"),
        param("rows", 1),
        param("facet", "on"),
        param("facet.field", field),
        param("facet.limit", limit),
        param("facet.mincount", 1),
        param("facet.offset", 0),
        param("sort", "date desc"),
    ]
}

pub fn pivot_params(query: &str, pivot: &str, limit: usize) -> QueryParams {
    vec![
        param("q", query),
        param("rows", 1),
        param("facet", "true"),
        param("facet.limit", limit),
        param("facet.mincount", 1),
        param("facet.pivot", pivot),
        param("sort", "citation_count desc"),
    ]
}

pub fn records_params(query: &str, fields: &[&str], rows: usize, start: u64) -> QueryParams {
    vec![
        param("q", query),
        param("fl", fields.join(",")),
        param("rows", rows),
        param("start", start),
    ]
}

/// `bibstem:"ApJ.." doctype:(article OR inproceedings)`
pub fn journal_query(journal: &str, doctype_clause: &str) -> String {
    format!("bibstem:\"{}\" {}", journal, doctype_clause)
}

/// `bibstem:("ApJ.." OR "MNRAS") doctype:(...) <filter>`
pub fn collection_query(journals: &[String], doctype_clause: &str, filter: Option<&str>) -> String {
    let stems = journals
        .iter()
        .map(|j| format!("\"{}\"", j))
        .collect::<Vec<_>>()
        .join(" OR ");
    let mut query = format!("bibstem:({}) {}", stems, doctype_clause);
    if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
        query.push(' ');
        query.push_str(filter.trim());
    }
    query
}

/// Widen a collection query to its references and citations, then apply the
/// sample template (`{query}` placeholder)
pub fn sample_query(template: &str, base: &str) -> String {
    let widened = format!("({0}) OR references({0}) OR citations({0})", base);
    template.replace("{query}", &format!("({})", widened))
}

pub fn with_predicate(base: &str, predicate: &str) -> String {
    format!("{} {}", base, predicate)
}

/// Records lacking full text
pub fn without_predicate(base: &str, predicate: &str) -> String {
    format!("{} -{}", base, predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_facet_params() {
        let params = facet_params("bibstem:\"ApJ..\"", "volume", 1000);
        assert_eq!(value(&params, "facet.field"), Some("volume"));
        assert_eq!(value(&params, "facet.limit"), Some("1000"));
        assert_eq!(value(&params, "facet.mincount"), Some("1"));
    }

    #[test]
    fn test_records_params() {
        let params = records_params("star", MISSING_FIELDS, 500, 1500);
        assert_eq!(value(&params, "fl"), Some("bibcode,doi,title,first_author,volume,issue"));
        assert_eq!(value(&params, "start"), Some("1500"));
    }

    #[test]
    fn test_journal_query() {
        assert_eq!(
            journal_query("ApJ..", "doctype:(article OR inproceedings)"),
            "bibstem:\"ApJ..\" doctype:(article OR inproceedings)"
        );
    }

    #[test]
    fn test_collection_query_with_filter() {
        let journals = vec!["ApJ..".to_string(), "MNRAS".to_string()];
        assert_eq!(
            collection_query(&journals, "doctype:article", Some("property:refereed")),
            "bibstem:(\"ApJ..\" OR \"MNRAS\") doctype:article property:refereed"
        );
        assert_eq!(
            collection_query(&journals, "doctype:article", Some("  ")),
            "bibstem:(\"ApJ..\" OR \"MNRAS\") doctype:article"
        );
    }

    #[test]
    fn test_sample_query() {
        let q = sample_query("{query} entdate:[NOW-365DAYS TO *]", "bibstem:X");
        assert_eq!(
            q,
            "((bibstem:X) OR references(bibstem:X) OR citations(bibstem:X)) entdate:[NOW-365DAYS TO *]"
        );
    }

    #[test]
    fn test_without_predicate() {
        assert_eq!(without_predicate("a", "fulltext_mtime:[* TO *]"), "a -fulltext_mtime:[* TO *]");
    }
}
