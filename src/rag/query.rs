use crate::core::errors::AssistError;

/// A user question, guaranteed non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Accepts the raw `query` field of a request body.
    pub fn parse(raw: Option<&str>) -> Result<Self, AssistError> {
        let raw = raw.ok_or_else(|| AssistError::user_input("Missing query in request data"))?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AssistError::user_input("Query must not be empty"));
        }
        Ok(Query(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The text sent to the embedding service. Newlines degrade embedding
    /// quality, so each line break becomes a single space.
    pub fn embedding_input(&self) -> String {
        self.0.replace("\r\n", " ").replace(['\n', '\r'], " ")
    }
}
