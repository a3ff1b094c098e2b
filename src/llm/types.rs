use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of a moderation check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModerationRequest<'a> {
    pub input: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModerationResponse {
    #[serde(default)]
    pub results: Vec<ModerationResult>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingResponse {
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingData {
    pub embedding: Vec<f32>,
}
