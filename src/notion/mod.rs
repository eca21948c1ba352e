//! Notion REST gateway
//!
//! The only component that talks to the network. Wraps the four API
//! calls the tools need (create page, query database, retrieve page,
//! update page) and maps transport failures to `Upstream` and missing
//! pages to `NotFound`. Callers hand property bags in and get raw page
//! objects back; normalization stays in the schema module.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

const NOTION_API: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Which of the two databases a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Database {
    Vocabulary,
    Grammar,
}

pub struct NotionGateway {
    client: reqwest::Client,
    base_url: String,
    token: String,
    vocab_db_id: String,
    grammar_db_id: String,
}

impl NotionGateway {
    pub fn new(config: &Config) -> Self {
        NotionGateway {
            client: reqwest::Client::new(),
            base_url: NOTION_API.to_string(),
            token: config.notion_token.clone(),
            vocab_db_id: config.vocab_db_id.clone(),
            grammar_db_id: config.grammar_db_id.clone(),
        }
    }

    /// Point the gateway at a different API root (mock servers in tests).
    #[doc(hidden)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn database_id(&self, database: Database) -> &str {
        match database {
            Database::Vocabulary => &self.vocab_db_id,
            Database::Grammar => &self.grammar_db_id,
        }
    }

    /// Create a page in the given database. Returns the created page
    /// object (the caller reads the assigned id off it).
    pub async fn create_page(&self, database: Database, properties: Value) -> Result<Value> {
        let body = json!({
            "parent": { "database_id": self.database_id(database) },
            "properties": properties,
        });

        let response = self
            .client
            .post(format!("{}/pages", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        self.into_page(response, "<new page>").await
    }

    /// Query every page of a database, following pagination. An optional
    /// Notion filter object restricts the results server-side.
    pub async fn query_database(
        &self,
        database: Database,
        filter: Option<Value>,
    ) -> Result<Vec<Value>> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": 100 });
            if let Some(filter) = &filter {
                body["filter"] = filter.clone();
            }
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let response = self
                .client
                .post(format!(
                    "{}/databases/{}/query",
                    self.base_url,
                    self.database_id(database)
                ))
                .header("Authorization", format!("Bearer {}", self.token))
                .header("Notion-Version", NOTION_VERSION)
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(upstream_error("query database", response).await);
            }

            let payload: Value = response.json().await?;
            if let Some(results) = payload.get("results").and_then(Value::as_array) {
                pages.extend(results.iter().cloned());
            }

            let has_more = payload.get("has_more").and_then(Value::as_bool).unwrap_or(false);
            cursor = payload
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(str::to_string);
            if !has_more || cursor.is_none() {
                break;
            }
        }

        debug!("Queried {} pages from {:?} database", pages.len(), database);
        Ok(pages)
    }

    /// Fetch a single page by id. A 404 becomes `NotFound` carrying the
    /// id so the caller can surface it verbatim.
    pub async fn retrieve_page(&self, page_id: &str) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}/pages/{}", self.base_url, page_id))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;

        self.into_page(response, page_id).await
    }

    /// Patch page properties. Partial updates are fine; untouched
    /// properties keep their values.
    pub async fn update_page(&self, page_id: &str, properties: Value) -> Result<Value> {
        let response = self
            .client
            .patch(format!("{}/pages/{}", self.base_url, page_id))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({ "properties": properties }))
            .send()
            .await?;

        self.into_page(response, page_id).await
    }

    async fn into_page(&self, response: reqwest::Response, page_id: &str) -> Result<Value> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(page_id.to_string()));
        }
        if !status.is_success() {
            return Err(upstream_error("page request", response).await);
        }
        Ok(response.json().await?)
    }
}

async fn upstream_error(operation: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!("Notion {} failed with {}: {}", operation, status, body);
    Error::Upstream(format!("{} returned {}: {}", operation, status, body))
}
