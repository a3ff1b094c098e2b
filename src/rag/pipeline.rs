//! Query pipeline.
//!
//! moderation → embedding → retrieval → ranking → budgeted context → prompt.
//! Each remote step is awaited to completion before the next begins and any
//! failure ends the request.

use std::sync::Arc;

use super::context_builder::{ContextBuilder, TokenCounter};
use super::prompt::PromptTemplate;
use super::query::Query;
use super::ranking::rank_sections;
use super::store::SectionStore;
use crate::core::config::Credentials;
use crate::core::errors::AssistError;
use crate::llm::{Embedder, Moderator};

/// Remote services used by one request.
#[derive(Clone)]
pub struct Collaborators {
    pub moderator: Arc<dyn Moderator>,
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn SectionStore>,
}

/// Builds request-scoped collaborators once credentials are known.
pub trait CollaboratorFactory: Send + Sync {
    fn connect(&self, credentials: &Credentials) -> Collaborators;
}

pub struct QueryPipeline {
    collaborators: Collaborators,
    counter: Arc<dyn TokenCounter>,
    context_builder: ContextBuilder,
    template: PromptTemplate,
}

impl QueryPipeline {
    pub fn new(
        collaborators: Collaborators,
        counter: Arc<dyn TokenCounter>,
        token_budget: usize,
        template: PromptTemplate,
    ) -> Self {
        Self {
            collaborators,
            counter,
            context_builder: ContextBuilder::new(token_budget),
            template,
        }
    }

    pub async fn run(&self, query: &Query) -> Result<String, AssistError> {
        let moderation = self.collaborators.moderator.moderate(query.as_str()).await?;
        if moderation.flagged {
            return Err(AssistError::flagged(&moderation.categories));
        }

        let embedding = self
            .collaborators
            .embedder
            .embed(&query.embedding_input())
            .await?;

        let sections = self.collaborators.store.fetch_sections().await?;
        let retrieved = sections.len();

        let ranked = rank_sections(&embedding, sections);
        let context = self
            .context_builder
            .assemble(&ranked, self.counter.as_ref());

        tracing::info!(
            retrieved,
            included = context.included,
            tokens = context.token_count,
            budget = self.context_builder.token_budget(),
            "assembled context"
        );

        Ok(self.template.render(&context.text, query))
    }
}
