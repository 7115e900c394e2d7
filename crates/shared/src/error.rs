use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of a GraphQL response's `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl GraphQlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: None,
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{operation} returned errors: {}", join_messages(.errors))]
pub struct GraphQlFailure {
    pub operation: String,
    pub errors: Vec<GraphQlError>,
}

impl GraphQlFailure {
    pub fn new(operation: impl Into<String>, errors: Vec<GraphQlError>) -> Self {
        Self {
            operation: operation.into(),
            errors,
        }
    }
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
