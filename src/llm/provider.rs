use async_trait::async_trait;

use super::types::ModerationResult;
use crate::core::errors::AssistError;

#[async_trait]
pub trait Moderator: Send + Sync {
    /// Classifies `input` against the provider's content policy.
    async fn moderate(&self, input: &str) -> Result<ModerationResult, AssistError>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a single input into one vector.
    async fn embed(&self, input: &str) -> Result<Vec<f32>, AssistError>;
}
