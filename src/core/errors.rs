use std::collections::BTreeMap;
use std::fmt;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    UserInput,
    Upstream,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::UserInput => "user input error",
            ErrorKind::Upstream => "upstream error",
        };
        f.write_str(label)
    }
}

impl ErrorKind {
    /// Bad input is the caller's fault; everything else is ours or a
    /// collaborator's.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::UserInput => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration | ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Error)]
#[error("{kind}: {message}")]
pub struct AssistError {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<BTreeMap<String, bool>>,
}

impl AssistError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            categories: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn user_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserInput, message)
    }

    /// Content rejected by moderation. Only the categories that tripped are kept.
    pub fn flagged(categories: &BTreeMap<String, bool>) -> Self {
        let tripped = categories
            .iter()
            .filter(|(_, hit)| **hit)
            .map(|(name, hit)| (name.clone(), *hit))
            .collect();
        Self {
            kind: ErrorKind::UserInput,
            message: "Flagged content".to_string(),
            categories: Some(tripped),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Upstream, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn categories(&self) -> Option<&BTreeMap<String, bool>> {
        self.categories.as_ref()
    }
}

impl IntoResponse for AssistError {
    fn into_response(self) -> axum::response::Response {
        let status = self.kind.status();
        let body = Json(json!({ "error": self }));
        (status, body).into_response()
    }
}
