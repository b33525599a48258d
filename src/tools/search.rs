use super::traits::{Tool, ToolResult};
use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Web search through a Tavily-compatible API.
pub struct SearchTool {
    api_key: String,
    endpoint: String,
    max_results: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SearchHit {
    url: String,
    content: String,
}

impl SearchTool {
    pub fn new(api_key: String, endpoint: String, max_results: u32) -> Self {
        Self {
            api_key,
            endpoint,
            max_results,
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "search(query=\"the search query\") - a search engine."
    }

    fn args(&self) -> &[&str] {
        &["query"]
    }

    fn execute<'a>(
        &'a self,
        args: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolResult>> + Send + 'a>> {
        Box::pin(async move {
            let query = args
                .get("query")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .ok_or_else(|| anyhow::anyhow!("Missing 'query' parameter"))?;

            let response = self
                .client
                .post(self.endpoint.as_str())
                .json(&SearchRequest {
                    api_key: &self.api_key,
                    query,
                    max_results: self.max_results,
                })
                .send()
                .await
                .context("search request failed")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Ok(ToolResult::failure(format!(
                    "search API error ({status}): {}",
                    body.chars().take(200).collect::<String>()
                )));
            }

            let body: SearchResponse = response
                .json()
                .await
                .context("search API returned an unreadable response")?;
            Ok(ToolResult::ok(serde_json::to_string(&body.results)?))
        })
    }
}
