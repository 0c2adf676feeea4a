use std::collections::BTreeMap;

use crate::config::EvalApiConfig;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for evaluator requests.
///
/// Extra headers are applied last, so they override the defaults.
pub fn build_headers(config: &EvalApiConfig) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    let user_agent = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), user_agent);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }
    headers
}

fn default_user_agent() -> String {
    format!("flatval/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_request_json() {
        let headers = build_headers(&EvalApiConfig::default());
        assert_eq!(headers[HEADER_CONTENT_TYPE], "application/json");
        assert!(headers[HEADER_USER_AGENT].starts_with("flatval/"));
    }

    #[test]
    fn extra_headers_are_lowercased_and_override_defaults() {
        let config = EvalApiConfig::default()
            .insert_header("X-Trace", " abc ")
            .insert_header("User-Agent", "custom");
        let headers = build_headers(&config);
        assert_eq!(headers["x-trace"], "abc");
        assert_eq!(headers[HEADER_USER_AGENT], "custom");
    }
}
