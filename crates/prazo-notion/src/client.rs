//! Notion API client — liveness check, paginated queries, page fetch.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use prazo_core::error::{PrazoError, Result};

const NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// Client for the Notion REST API.
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    database_id: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    next_cursor: Option<String>,
}

impl NotionClient {
    pub fn new(api_key: &str, database_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            database_id: database_id.to_string(),
        }
    }

    /// Point the client at a different API host (tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url)
    }

    fn get(&self, url: String, timeout: Duration) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .timeout(timeout)
    }

    /// Liveness check against the database endpoint. Anything other than
    /// a 200 is fatal — the run aborts before any processing.
    pub async fn ping(&self) -> Result<()> {
        let url = self.api_url(&format!("databases/{}", self.database_id));
        let resp = self
            .get(url, Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| PrazoError::Notion(format!("liveness check failed: {e}")))?;

        if resp.status().is_success() {
            tracing::info!("Notion API is reachable");
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(PrazoError::Notion(format!("liveness check: status {status} - {body}")))
        }
    }

    /// Fetch every record of the task database, following `next_cursor`
    /// until exhausted. The full result set is accumulated before any
    /// processing begins; any page failure aborts the run.
    pub async fn query_all(&self, page_size: u32) -> Result<Vec<Value>> {
        let url = self.api_url(&format!("databases/{}/query", self.database_id));
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            tracing::info!("querying database (cursor: {})", cursor.as_deref().unwrap_or("start"));
            let resp = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .header("Notion-Version", NOTION_VERSION)
                .timeout(Duration::from_secs(10))
                .json(&QueryRequest { page_size, start_cursor: cursor.as_deref() })
                .send()
                .await
                .map_err(|e| PrazoError::Notion(format!("query failed: {e}")))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(PrazoError::Notion(format!("query: status {status} - {body}")));
            }

            let page: QueryResponse = resp
                .json()
                .await
                .map_err(|e| PrazoError::Notion(format!("invalid query response: {e}")))?;

            all.extend(page.results);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(all)
    }

    /// Fetch a single page. Failures here are recoverable — the relation
    /// resolver drops the identifier and moves on.
    pub async fn fetch_page(&self, page_id: &str) -> Result<Value> {
        let url = self.api_url(&format!("pages/{page_id}"));
        let resp = self
            .get(url, Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| PrazoError::Notion(format!("page {page_id}: {e}")))?;

        if !resp.status().is_success() {
            return Err(PrazoError::Notion(format!("page {page_id}: status {}", resp.status())));
        }

        resp.json()
            .await
            .map_err(|e| PrazoError::Notion(format!("page {page_id}: invalid body: {e}")))
    }
}
