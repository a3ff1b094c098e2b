use async_trait::async_trait;
use reqwest::Client;

use super::provider::{Embedder, Moderator};
use super::types::{
    EmbeddingRequest, EmbeddingResponse, ModerationRequest, ModerationResponse, ModerationResult,
};
use crate::core::errors::AssistError;
use crate::core::http::read_json;

/// Moderation and embedding over the OpenAI REST API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    embedding_model: String,
}

impl OpenAiClient {
    pub fn new(
        client: Client,
        base_url: &str,
        api_key: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            embedding_model: embedding_model.into(),
        }
    }
}

#[async_trait]
impl Moderator for OpenAiClient {
    async fn moderate(&self, input: &str) -> Result<ModerationResult, AssistError> {
        let url = format!("{}/moderations", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ModerationRequest { input })
            .send()
            .await
            .map_err(|err| AssistError::upstream(format!("Moderation request failed: {err}")))?;

        let response: ModerationResponse = read_json(res, "Moderation").await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AssistError::upstream("Moderation response contained no results"))
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, input: &str) -> Result<Vec<f32>, AssistError> {
        let url = format!("{}/embeddings", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.embedding_model,
                input,
            })
            .send()
            .await
            .map_err(|err| AssistError::upstream(format!("Embedding request failed: {err}")))?;

        let response: EmbeddingResponse = read_json(res, "Embedding").await?;
        response
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or_else(|| AssistError::upstream("Embedding response contained no vector"))
    }
}
