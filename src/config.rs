//! Environment configuration.

use std::env;
use std::time::Duration;

pub const DEFAULT_EVALUATOR_URL: &str = "http://127.0.0.1:3000";

pub const URL_ENV_VAR: &str = "FLATVAL_URL";
pub const TIMEOUT_ENV_VAR: &str = "FLATVAL_TIMEOUT_SEC";
pub const LOG_ENV_VAR: &str = "FLATVAL_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub evaluator_url: String,
    pub timeout: Option<Duration>,
    pub log_file: Option<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            evaluator_url: DEFAULT_EVALUATOR_URL.to_string(),
            timeout: None,
            log_file: None,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            evaluator_url: env_string_opt(URL_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_EVALUATOR_URL.to_string()),
            timeout: env_string_opt(TIMEOUT_ENV_VAR).and_then(|value| parse_timeout(&value)),
            log_file: env_string_opt(LOG_ENV_VAR),
        }
    }
}

fn parse_timeout(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value.trim().to_string())
        }
    })
}
