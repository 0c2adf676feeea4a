use serde::{Deserialize, Serialize};

/// Body of `POST /eval`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalRequest {
    pub code: String,
    pub session_id: String,
}

impl EvalRequest {
    pub fn new(code: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            session_id: session_id.into(),
        }
    }
}

/// Body of a 2xx response: `{ "root": .., "serialized": { .. } }`.
pub type EvalResponse = flatval::SerializedGraph;
