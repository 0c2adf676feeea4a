use eval_api::{EvalApiClient, EvalApiConfig, EvalApiError, EvalRequest};
use flatval::{EnvConfig, SerializedGraph};

/// The remote side of an evaluation. Implementations block the calling
/// worker thread until the evaluator answers or fails.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, request: EvalRequest) -> Result<SerializedGraph, String>;
}

/// [`Evaluator`] backed by the HTTP transport.
#[derive(Debug)]
pub struct HttpEvaluator {
    client: EvalApiClient,
}

impl HttpEvaluator {
    pub fn new(config: EvalApiConfig) -> Result<Self, EvalApiError> {
        Ok(Self {
            client: EvalApiClient::new(config)?,
        })
    }

    pub fn from_env_config(config: &EnvConfig) -> Result<Self, EvalApiError> {
        let mut api_config = EvalApiConfig::new(config.evaluator_url.clone());
        if let Some(timeout) = config.timeout {
            api_config = api_config.with_timeout(timeout);
        }
        Self::new(api_config)
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }
}

impl Evaluator for HttpEvaluator {
    fn evaluate(&self, request: EvalRequest) -> Result<SerializedGraph, String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                EvalApiError::Runtime(format!("failed to initialize tokio runtime: {error}"))
                    .to_string()
            })?;

        runtime
            .block_on(self.client.evaluate(&request))
            .map_err(|error| error.to_string())
    }
}
