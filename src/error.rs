use serde::Serialize;
use thiserror::Error;

/// Failures that abort a whole view load.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DashboardError {
    /// A remote read failed: bad status, network error, or an error envelope.
    #[error("transport error on {endpoint}: {detail}")]
    Transport { endpoint: String, detail: String },
    /// A document's top-level shape is not something we can read.
    #[error("unrecognized {document} document: {detail}")]
    Schema { document: String, detail: String },
}

impl DashboardError {
    pub fn transport(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        DashboardError::Transport {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    pub fn schema(document: impl Into<String>, detail: impl Into<String>) -> Self {
        DashboardError::Schema {
            document: document.into(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::Transport { .. } => ErrorKind::Transport,
            DashboardError::Schema { .. } => ErrorKind::Schema,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Schema,
    UnknownView,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Schema => "schema",
            ErrorKind::UnknownView => "unknown_view",
        }
    }
}

/// A single malformed record inside an otherwise readable batch.
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
#[error("{batch} record #{position} rejected: {reason}")]
pub struct RecordError {
    pub batch: &'static str,
    pub position: usize,
    pub reason: String,
}

impl RecordError {
    pub fn new(batch: &'static str, position: usize, reason: impl Into<String>) -> Self {
        Self {
            batch,
            position,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid timestamp: {input:?}")]
pub struct TimestampError {
    pub input: String,
}
