use std::path::PathBuf;

use shared::{domain::VehicleId, error::GraphQlFailure};
use thiserror::Error;

/// A GraphQL call that did not produce usable data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error(transparent)]
    GraphQl(#[from] GraphQlFailure),
    #[error("{operation} response carried no data")]
    MissingData { operation: String },
    #[error("could not decode {operation} response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An intent rejected locally, before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("vehicle {0} is not on the current page")]
    UnknownRecord(VehicleId),
    #[error("another dialog is already open")]
    ModalAlreadyOpen,
    #[error("no vehicle update in progress")]
    NoUpdateInProgress,
    #[error("no vehicle deletion in progress")]
    NoDeleteInProgress,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ControllerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
