use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::errors::{AssistError, ErrorKind};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    pub query: Option<String>,
}

impl QueryRequest {
    /// Unparseable bodies are treated as a request without a query.
    fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

pub async fn answer_query(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AssistError> {
    let span = tracing::info_span!("query", request_id = %Uuid::new_v4());

    async move {
        let request = QueryRequest::from_body(&body);
        let prompt = state
            .answer(request.query.as_deref())
            .await
            .inspect_err(|err| match err.kind() {
                ErrorKind::UserInput => tracing::warn!("Rejected query: {}", err),
                _ => tracing::error!("Query failed: {}", err),
            })?;
        Ok::<_, AssistError>(Json(json!({ "prompt": prompt })))
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_body_parsing() {
        assert_eq!(
            QueryRequest::from_body(br#"{"query": "hi"}"#).query.as_deref(),
            Some("hi")
        );
        assert!(QueryRequest::from_body(b"not json").query.is_none());
        assert!(QueryRequest::from_body(br#"{"query": 42}"#).query.is_none());
        assert!(QueryRequest::from_body(b"").query.is_none());
    }
}
