use restmeta_application::PageRequest;
use restmeta_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::{Value, json};

/// Executes search-index queries over HTTP against an index server
/// speaking the `_search` protocol.
pub struct HttpSearchGateway {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: Value,
}

impl HttpSearchGateway {
    /// Creates a gateway against a base URL such as
    /// `http://localhost:9200`.
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder().build().map_err(|error| {
            AppError::Configuration(format!("failed to build search client: {error}"))
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Runs one query against an index and returns the hit documents.
    ///
    /// The query is a clause document as produced by the search query
    /// builder, for example a `bool` conjunction.
    pub async fn search(
        &self,
        index: &str,
        query: Value,
        page: PageRequest,
    ) -> AppResult<Vec<Value>> {
        let url = format!("{}/{index}/_search", self.base_url);
        let body = json!({
            "query": query,
            "from": page.offset(),
            "size": page.limit(),
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("search request to '{url}' failed: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "search request to '{url}' returned status {status}"
            )));
        }

        let parsed: SearchResponse = response.json().await.map_err(|error| {
            AppError::Internal(format!("search response from '{url}' was malformed: {error}"))
        })?;

        tracing::debug!(index, hits = parsed.hits.hits.len(), "search query executed");
        Ok(parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| hit.source)
            .collect())
    }
}
