//! Transport-only client for the remote evaluator.
//!
//! This crate owns request building, response decoding and failure
//! classification for `POST /eval`. It contains no session state and no UI
//! coupling; callers turn every [`EvalApiError`] into transcript text.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use crate::client::{decode_response, EvalApiClient};
pub use crate::config::EvalApiConfig;
pub use crate::error::EvalApiError;
pub use crate::payload::{EvalRequest, EvalResponse};
pub use crate::url::normalize_eval_url;
