use crate::domain::ports::{SearchBackend, SearchHits};
use crate::utils::error::{Result, SetAnalysisError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP adapter for the search collaborator, speaking the legacy
/// index/type REST layout: `_count` and `_search` per centric type, plain
/// document GET/PUT for the terms-lookup index.
pub struct HttpSearch {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: i64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    total: i64,
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(rename = "_source")]
    source: Option<Value>,
}

impl HttpSearch {
    pub fn new(base_url: &str, request_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, segments: &[&str]) -> String {
        format!("{}/{}", self.base_url, segments.join("/"))
    }
}

#[async_trait]
impl SearchBackend for HttpSearch {
    async fn count(&self, index: &str, doc_type: &str, query: &Value) -> Result<i64> {
        let url = self.url(&[index, doc_type, "_count"]);
        tracing::debug!("POST {} {}", url, query);

        let response = self
            .client
            .post(&url)
            .json(query)
            .send()
            .await?
            .error_for_status()?;

        let body: CountResponse = response.json().await?;
        Ok(body.count)
    }

    async fn search_ids(
        &self,
        index: &str,
        doc_type: &str,
        query: &Value,
        size: usize,
    ) -> Result<SearchHits> {
        let mut body = query.clone();
        match body.as_object_mut() {
            Some(object) => {
                object.insert("size".to_string(), json!(size));
                object.insert("_source".to_string(), json!(false));
            }
            None => {
                return Err(SetAnalysisError::RegionQueryFailure {
                    message: "Search query body must be a JSON object".to_string(),
                })
            }
        }

        let url = self.url(&[index, doc_type, "_search"]);
        tracing::debug!("POST {} {}", url, body);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        Ok(SearchHits {
            total: body.hits.total,
            ids: body.hits.hits.into_iter().map(|hit| hit.id).collect(),
        })
    }

    async fn put_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        document: Value,
    ) -> Result<()> {
        let url = self.url(&[index, doc_type, id]);
        tracing::debug!("PUT {}?refresh=true", url);

        // refresh=true makes the write visible to any query issued after
        // this call returns.
        self.client
            .put(&url)
            .query(&[("refresh", "true")])
            .json(&document)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn get_document(&self, index: &str, doc_type: &str, id: &str) -> Result<Option<Value>> {
        let url = self.url(&[index, doc_type, id]);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: GetResponse = response.error_for_status()?.json().await?;
        Ok(body.source)
    }

    async fn ensure_index(&self, index: &str, settings: &Value) -> Result<()> {
        let url = self.url(&[index]);

        let head = self.client.head(&url).send().await?;
        if head.status().is_success() {
            tracing::debug!("Index '{}' exists, nothing to do", index);
            return Ok(());
        }

        tracing::info!("Creating index '{}'", index);
        let response = self
            .client
            .put(&url)
            .json(&json!({ "settings": settings }))
            .send()
            .await?;

        // A concurrent first caller may have won the creation race; the
        // backend answers 400 for an existing index and that counts as
        // success here.
        if response.status().is_success() || response.status() == StatusCode::BAD_REQUEST {
            return Ok(());
        }

        Err(SetAnalysisError::StorageUnavailable {
            message: format!(
                "Index creation for '{}' failed with status {}",
                index,
                response.status()
            ),
        })
    }
}
