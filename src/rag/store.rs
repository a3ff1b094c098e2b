//! SectionStore trait: read-only source of indexed documentation sections.
//!
//! The primary implementation is `SupabaseStore` in the `supabase` module.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::core::errors::AssistError;

/// A stored documentation section with its precomputed embedding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentSection {
    pub content: String,
    #[serde(deserialize_with = "deserialize_embedding")]
    pub embedding: Vec<f32>,
}

impl DocumentSection {
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            content: content.into(),
            embedding,
        }
    }
}

#[async_trait]
pub trait SectionStore: Send + Sync {
    /// Every stored section, in the store's own order. No filtering.
    async fn fetch_sections(&self) -> Result<Vec<DocumentSection>, AssistError>;
}

/// pgvector columns come back from PostgREST as text (`"[0.1,0.2]"`);
/// plain JSON arrays are accepted too.
fn deserialize_embedding<'de, D>(deserializer: D) -> Result<Vec<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawEmbedding {
        Array(Vec<f32>),
        Text(String),
    }

    match RawEmbedding::deserialize(deserializer)? {
        RawEmbedding::Array(values) => Ok(values),
        RawEmbedding::Text(text) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_array_and_text_embeddings() {
        let rows: Vec<DocumentSection> = serde_json::from_str(
            r#"[
                {"content": "Install the CLI", "embedding": [0.5, 0.25]},
                {"content": "Create a project", "embedding": "[0.5,0.25]"}
            ]"#,
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].embedding, rows[1].embedding);
        assert_eq!(rows[1].content, "Create a project");
    }

    #[test]
    fn rejects_garbage_embedding_text() {
        let result: Result<DocumentSection, _> =
            serde_json::from_str(r#"{"content": "x", "embedding": "not a vector"}"#);
        assert!(result.is_err());
    }
}
