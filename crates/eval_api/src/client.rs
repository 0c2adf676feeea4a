use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};
use url::Url;

use crate::config::EvalApiConfig;
use crate::error::EvalApiError;
use crate::headers::build_headers;
use crate::payload::{EvalRequest, EvalResponse};
use crate::url::normalize_eval_url;

/// One-shot evaluator client. Requests are never retried; a failure is
/// reported to the caller exactly once.
#[derive(Debug)]
pub struct EvalApiClient {
    http: Client,
    config: EvalApiConfig,
    endpoint: Url,
}

impl EvalApiClient {
    pub fn new(config: EvalApiConfig) -> Result<Self, EvalApiError> {
        let normalized = normalize_eval_url(&config.base_url);
        let endpoint = Url::parse(&normalized)
            .map_err(|error| EvalApiError::InvalidBaseUrl(format!("{normalized}: {error}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(EvalApiError::InvalidBaseUrl(format!(
                "{normalized}: unsupported scheme {}",
                endpoint.scheme()
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    pub fn config(&self) -> &EvalApiConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn build_headers(&self) -> Result<HeaderMap, EvalApiError> {
        let mut out = HeaderMap::new();
        for (key, value) in build_headers(&self.config) {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| EvalApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    EvalApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(&self, request: &EvalRequest) -> Result<RequestBuilder, EvalApiError> {
        let headers = self.build_headers()?;
        Ok(self
            .http
            .post(self.endpoint.clone())
            .headers(headers)
            .json(request))
    }

    /// Sends one evaluation and decodes the serialized graph.
    pub async fn evaluate(&self, request: &EvalRequest) -> Result<EvalResponse, EvalApiError> {
        debug!(
            session_id = %request.session_id,
            endpoint = %self.endpoint,
            "sending evaluation"
        );
        let response = self.build_request(request)?.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!(%status, session_id = %request.session_id, "evaluator rejected request");
            return Err(EvalApiError::Rejected { status, body });
        }

        decode_response(&body)
    }
}

/// Decodes a 2xx body into a serialized graph.
pub fn decode_response(body: &[u8]) -> Result<EvalResponse, EvalApiError> {
    Ok(serde_json::from_slice(body)?)
}
