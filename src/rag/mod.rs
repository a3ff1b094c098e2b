//! Retrieval-augmented prompt construction.
//!
//! - `QueryPipeline`: moderation, embedding, retrieval and prompt assembly
//! - `ContextBuilder`: token-budgeted context from ranked sections
//! - `SectionStore`: read-only source of indexed documentation

pub mod context_builder;
pub mod pipeline;
pub mod prompt;
pub mod query;
pub mod ranking;
pub mod store;
pub mod supabase;

pub use context_builder::{ByteLevelCounter, ContextBuilder, HfTokenizerCounter, TokenCounter};
pub use pipeline::{CollaboratorFactory, Collaborators, QueryPipeline};
pub use prompt::PromptTemplate;
pub use query::Query;
pub use store::{DocumentSection, SectionStore};
pub use supabase::SupabaseStore;
