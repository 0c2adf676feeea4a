use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalApiError {
    #[error("invalid evaluator URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// The evaluator could not be reached or the connection failed mid-request.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    /// The evaluator answered with a non-2xx status.
    #[error("{}", rejection_message(.status, .body))]
    Rejected { status: StatusCode, body: String },
    /// A 2xx body that is not a serialized graph.
    #[error("malformed evaluator response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("evaluation runtime failure: {0}")]
    Runtime(String),
}

impl EvalApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Request(error) => error.status(),
            _ => None,
        }
    }

    /// True when no response was received at all.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

/// Body text when present, otherwise the canonical status reason.
pub fn rejection_message(status: &StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
