use log::{debug, error};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::runtime::Runtime;

use super::{
    facet_params, page_count, parse_documents, parse_facet_field, parse_pivot_by_year,
    pivot_params, records_params, CitationCounts, Document, FacetCounts, QueryParams,
    SearchBackend, CITATION_PIVOT,
};
use crate::config::Config;
use crate::error::BackendError;

/// Blocking client for the search API. Requests are issued one at a time on
/// a private current-thread runtime.
pub struct ApiClient {
    client: Client,
    runtime: Runtime,
    base_url: String,
    token: String,
    facet_limit: usize,
    pivot_limit: usize,
    rows_per_page: usize,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to start runtime: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            runtime,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            facet_limit: config.facet_limit,
            pivot_limit: config.pivot_limit,
            rows_per_page: config.rows_per_page,
        })
    }

    fn query(&self, params: &QueryParams) -> Result<Value, BackendError> {
        self.runtime.block_on(self.query_async(params))
    }

    async fn query_async(&self, params: &QueryParams) -> Result<Value, BackendError> {
        let url = format!("{}/search/query", self.base_url);
        debug!("Search API query: {:?}", params);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .query(params)
            .send()
            .await
            .map_err(|e| {
                error!("Search API request failed: {}", e);
                BackendError::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let err = BackendError::Status(status.as_u16());
            error!("{}", err);
            return Err(err);
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|_| {
            error!("{}", BackendError::Decode);
            BackendError::Decode
        })
    }
}

impl SearchBackend for ApiClient {
    fn facet_counts(&self, query: &str, field: &str) -> Result<FacetCounts, BackendError> {
        let data = self.query(&facet_params(query, field, self.facet_limit))?;
        parse_facet_field(&data, field)
    }

    fn citation_counts(&self, query: &str) -> Result<CitationCounts, BackendError> {
        let data = self.query(&pivot_params(query, CITATION_PIVOT, self.pivot_limit))?;
        parse_pivot_by_year(&data, CITATION_PIVOT)
    }

    fn records(&self, query: &str, fields: &[&str]) -> Result<Vec<Document>, BackendError> {
        let rows = self.rows_per_page.max(1);
        let data = self.query(&records_params(query, fields, rows, 0))?;
        let (mut docs, num_found) = parse_documents(&data)?;

        let pages = page_count(num_found, rows);
        for page in 1..pages {
            let start = page * rows as u64;
            let data = self.query(&records_params(query, fields, rows, start))?;
            let (more, _) = parse_documents(&data)?;
            docs.extend(more);
        }

        debug!("Fetched {} of {} documents in {} pages", docs.len(), num_found, pages.max(1));
        Ok(docs)
    }
}
