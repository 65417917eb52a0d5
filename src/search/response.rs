use serde_json::Value;

use super::{CitationCounts, Document, FacetCounts};
use crate::error::BackendError;

/// Turn a facet value into an integer key by keeping its digits only
/// ("905" -> 905, "L12" -> 12). Values without digits yield `None`.
pub fn facet_key(value: &Value) -> Option<i64> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn facet_counts_section(data: &Value) -> Result<&Value, BackendError> {
    data.get("facet_counts")
        .ok_or_else(|| BackendError::UnexpectedData("response has no facet_counts".to_string()))
}

/// Parse `facet_counts.facet_fields.<field>`, a flat `[value, count, value, count, ...]` list.
/// Values collapsing onto the same integer key are summed.
pub fn parse_facet_field(data: &Value, field: &str) -> Result<FacetCounts, BackendError> {
    let mut counts = FacetCounts::new();

    let values = match facet_counts_section(data)?
        .get("facet_fields")
        .and_then(|f| f.get(field))
    {
        Some(Value::Array(values)) => values,
        Some(_) => {
            return Err(BackendError::UnexpectedData(format!(
                "facet field '{}' is not a list",
                field
            )))
        }
        None => return Ok(counts),
    };

    for pair in values.chunks_exact(2) {
        let Some(key) = facet_key(&pair[0]) else {
            continue;
        };
        let count = pair[1].as_u64().unwrap_or(0);
        *counts.entry(key).or_insert(0) += count;
    }

    Ok(counts)
}

/// Sum `count * value` over the leaves of each top-level group of
/// `facet_counts.facet_pivot.<pivot>`, keyed by the group value
pub fn parse_pivot_by_year(data: &Value, pivot: &str) -> Result<CitationCounts, BackendError> {
    let groups = match facet_counts_section(data)?
        .get("facet_pivot")
        .and_then(|p| p.get(pivot))
    {
        Some(Value::Array(groups)) => groups,
        Some(_) => {
            return Err(BackendError::UnexpectedData(format!(
                "pivot '{}' is not a list",
                pivot
            )))
        }
        None => return Ok(CitationCounts::new()),
    };

    let mut years = CitationCounts::new();
    for group in groups {
        let Some(year) = group.get("value").and_then(facet_key) else {
            continue;
        };
        let citations: u64 = group
            .get("pivot")
            .and_then(|p| p.as_array())
            .into_iter()
            .flatten()
            .map(|leaf| {
                let count = leaf.get("count").and_then(|c| c.as_u64()).unwrap_or(0);
                let value = leaf.get("value").and_then(facet_key).unwrap_or(0).max(0) as u64;
                count * value
            })
            .sum();
        *years.entry(year).or_insert(0) += citations;
    }

    Ok(years)
}

/// Parse `response.docs` and `response.numFound`
pub fn parse_documents(data: &Value) -> Result<(Vec<Document>, u64), BackendError> {
    let response = data
        .get("response")
        .ok_or_else(|| BackendError::UnexpectedData("Solr returned unexpected data!".to_string()))?;

    let num_found = response
        .get("numFound")
        .and_then(|n| n.as_u64())
        .ok_or_else(|| BackendError::UnexpectedData("response has no numFound".to_string()))?;

    let docs = response
        .get("docs")
        .cloned()
        .ok_or_else(|| BackendError::UnexpectedData("Solr returned unexpected data!".to_string()))?;

    let docs: Vec<Document> =
        serde_json::from_value(docs).map_err(|e| BackendError::UnexpectedData(e.to_string()))?;

    Ok((docs, num_found))
}

/// Number of pages needed to fetch `num_found` documents
pub fn page_count(num_found: u64, rows: usize) -> u64 {
    if rows == 0 {
        return 0;
    }
    num_found.div_ceil(rows as u64)
}
