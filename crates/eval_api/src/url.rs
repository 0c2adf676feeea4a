/// Default base URL of a locally running evaluator.
pub const DEFAULT_EVAL_BASE_URL: &str = flatval::config::DEFAULT_EVALUATOR_URL;

/// Normalize a base URL to the evaluation endpoint.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_EVAL_BASE_URL`]
/// 2) keep a URL already ending in `/eval` unchanged
/// 3) append `/eval` otherwise
pub fn normalize_eval_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_EVAL_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/eval") {
        return trimmed.to_string();
    }
    format!("{trimmed}/eval")
}
