use std::sync::Arc;

use anyhow::Context;
use reqwest::Client;

use crate::core::config::{Credentials, Settings};
use crate::core::errors::AssistError;
use crate::llm::OpenAiClient;
use crate::rag::{
    ByteLevelCounter, CollaboratorFactory, Collaborators, HfTokenizerCounter, PromptTemplate,
    Query, QueryPipeline, SupabaseStore, TokenCounter,
};

/// Connects to OpenAI and Supabase over one shared HTTP client.
pub struct HttpCollaborators {
    client: Client,
    openai_base_url: String,
    embedding_model: String,
    sections_table: String,
}

impl HttpCollaborators {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            openai_base_url: settings.openai_base_url.clone(),
            embedding_model: settings.embedding_model.clone(),
            sections_table: settings.sections_table.clone(),
        })
    }
}

impl CollaboratorFactory for HttpCollaborators {
    fn connect(&self, credentials: &Credentials) -> Collaborators {
        let openai = Arc::new(OpenAiClient::new(
            self.client.clone(),
            &self.openai_base_url,
            credentials.openai_key.clone(),
            self.embedding_model.clone(),
        ));
        let store = Arc::new(SupabaseStore::new(
            self.client.clone(),
            &credentials.supabase_url,
            credentials.supabase_service_role_key.clone(),
            self.sections_table.clone(),
        ));
        Collaborators {
            moderator: openai.clone(),
            embedder: openai,
            store,
        }
    }
}

pub struct AppState {
    pub settings: Arc<Settings>,
    pub collaborators: Arc<dyn CollaboratorFactory>,
    pub token_counter: Arc<dyn TokenCounter>,
    pub template: PromptTemplate,
}

impl AppState {
    pub fn initialize(settings: Settings) -> anyhow::Result<Arc<Self>> {
        let collaborators = Arc::new(HttpCollaborators::new(&settings)?);
        let token_counter: Arc<dyn TokenCounter> = match &settings.tokenizer_path {
            Some(path) => Arc::new(HfTokenizerCounter::from_file(path)?),
            None => Arc::new(ByteLevelCounter::new()),
        };
        Ok(Self::with_parts(settings, collaborators, token_counter))
    }

    pub fn with_parts(
        settings: Settings,
        collaborators: Arc<dyn CollaboratorFactory>,
        token_counter: Arc<dyn TokenCounter>,
    ) -> Arc<Self> {
        let template = PromptTemplate::new(settings.product_name.clone());
        Arc::new(AppState {
            settings: Arc::new(settings),
            collaborators,
            token_counter,
            template,
        })
    }

    /// Validates configuration and input, then runs the pipeline. Nothing
    /// remote is contacted unless both checks pass.
    pub async fn answer(&self, raw_query: Option<&str>) -> Result<String, AssistError> {
        let credentials = self.settings.credentials()?;
        let query = Query::parse(raw_query)?;

        let pipeline = QueryPipeline::new(
            self.collaborators.connect(&credentials),
            self.token_counter.clone(),
            self.settings.token_budget,
            self.template.clone(),
        );
        pipeline.run(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::rag::pipeline::mocks::{MockFactory, MockServices};
    use crate::rag::DocumentSection;
    use std::sync::atomic::Ordering;

    fn configured() -> Settings {
        Settings {
            openai_key: Some("sk-test".to_string()),
            supabase_url: Some("https://example.supabase.co".to_string()),
            supabase_service_role_key: Some("service".to_string()),
            ..Settings::default()
        }
    }

    fn state(settings: Settings, services: &Arc<MockServices>) -> Arc<AppState> {
        AppState::with_parts(
            settings,
            Arc::new(MockFactory(services.clone())),
            Arc::new(ByteLevelCounter::new()),
        )
    }

    #[tokio::test]
    async fn missing_openai_key_makes_no_remote_calls() {
        let services = Arc::new(MockServices::default());
        let settings = Settings {
            openai_key: None,
            ..configured()
        };

        let err = state(settings, &services)
            .answer(Some("How do I get started?"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(services.total_remote_calls(), 0);
        assert_eq!(services.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn configuration_is_checked_before_input() {
        let services = Arc::new(MockServices::default());
        let err = state(Settings::default(), &services)
            .answer(Some("   "))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn blank_query_makes_no_remote_calls() {
        let services = Arc::new(MockServices::default());

        let err = state(configured(), &services)
            .answer(Some(" \n\t "))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UserInput);
        assert_eq!(services.total_remote_calls(), 0);
    }

    #[test]
    fn unreadable_tokenizer_path_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            tokenizer_path: Some(dir.path().join("missing.json")),
            ..configured()
        };

        let err = AppState::initialize(settings).err().unwrap();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn default_settings_start_without_tokenizer_file() {
        assert!(AppState::initialize(Settings::default()).is_ok());
    }

    #[tokio::test]
    async fn token_budget_comes_from_settings() {
        let services = Arc::new(MockServices {
            embedding: vec![1.0, 0.0],
            sections: vec![
                DocumentSection::new("first", vec![1.0, 0.0]),
                DocumentSection::new("second", vec![0.5, 0.5]),
            ],
            ..Default::default()
        });
        let settings = Settings {
            token_budget: 2,
            ..configured()
        };

        let prompt = state(settings, &services).answer(Some("q")).await.unwrap();
        assert!(prompt.contains("first\n---\n"));
        assert!(!prompt.contains("second"));
    }
}
