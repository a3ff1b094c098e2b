//! Supabase-backed section store.
//!
//! Reads every row of the sections table through the PostgREST API.

use async_trait::async_trait;
use reqwest::Client;

use super::store::{DocumentSection, SectionStore};
use crate::core::errors::AssistError;
use crate::core::http::read_json;

#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    service_key: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(
        client: Client,
        base_url: &str,
        service_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            table: table.into(),
        }
    }
}

#[async_trait]
impl SectionStore for SupabaseStore {
    async fn fetch_sections(&self) -> Result<Vec<DocumentSection>, AssistError> {
        let url = format!("{}/rest/v1/{}", self.base_url, self.table);
        let res = self
            .client
            .get(&url)
            .query(&[("select", "content,embedding")])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|err| AssistError::upstream(format!("Section store request failed: {err}")))?;

        read_json(res, "Section store").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::test_support::spawn_mock;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    #[tokio::test]
    async fn fetches_all_sections_in_store_order() {
        let app = Router::new().route(
            "/rest/v1/page_section",
            get(
                |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(headers["apikey"], "service");
                    assert_eq!(headers["authorization"], "Bearer service");
                    assert_eq!(params.get("select").map(String::as_str), Some("content,embedding"));
                    Json(json!([
                        { "content": "Quickstart", "embedding": "[1,0]" },
                        { "content": "Auth guide", "embedding": [0.0, 1.0] }
                    ]))
                },
            ),
        );
        let base = spawn_mock(app).await;

        let store = SupabaseStore::new(Client::new(), &base, "service", "page_section");
        let sections = store.fetch_sections().await.unwrap();

        assert_eq!(
            sections,
            vec![
                DocumentSection::new("Quickstart", vec![1.0, 0.0]),
                DocumentSection::new("Auth guide", vec![0.0, 1.0]),
            ]
        );
    }

    #[tokio::test]
    async fn store_failure_is_upstream_error() {
        let app = Router::new().route(
            "/rest/v1/page_section",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Invalid API key" })),
                )
            }),
        );
        let base = spawn_mock(app).await;

        let store = SupabaseStore::new(Client::new(), &base, "wrong", "page_section");
        let err = store.fetch_sections().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.message().contains("Invalid API key"));
    }
}
