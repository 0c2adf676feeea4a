use eval_api::EvalApiError;
use reqwest::StatusCode;

#[test]
fn error_rejected_displays_body_verbatim() {
    let error = EvalApiError::Rejected {
        status: StatusCode::BAD_REQUEST,
        body: "SyntaxError: Unexpected token".to_string(),
    };
    assert_eq!(error.to_string(), "SyntaxError: Unexpected token");
    assert_eq!(error.status(), Some(StatusCode::BAD_REQUEST));
    assert!(!error.is_network_failure());
}

#[test]
fn error_rejected_with_empty_body_uses_status_reason() {
    let error = EvalApiError::Rejected {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: String::new(),
    };
    assert_eq!(error.to_string(), "Internal Server Error");
}

#[test]
fn error_malformed_response_mentions_decoding() {
    let source = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated");
    let error = EvalApiError::from(source);
    assert!(error
        .to_string()
        .starts_with("malformed evaluator response: "));
}
