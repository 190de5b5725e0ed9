// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub type Result<T, E = RetrievalError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("{message}")]
    InvalidConfig { message: String },
    #[error("cannot reach {endpoint}")]
    Connection {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch: {status}")]
    Status { status: u16, body: String },
    #[error("read response body from {endpoint}")]
    Body {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("decode applications from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RetrievalError {
    /// HTTP status for non-success responses.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
