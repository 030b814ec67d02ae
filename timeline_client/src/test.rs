use std::collections::HashMap;
use std::str::FromStr;

use reqwest::StatusCode;

use crate::config::{ClientConfig, ENV_API_BASE, ENV_BEARER_TOKEN, ENV_COOKIE, ENV_LOG_DIR, ENV_PAGE_SIZE};
use crate::consts::{DEFAULT_PAGE_SIZE, HOME_TIMELINE_MAX_COUNT, HOME_TIMELINE_PATH};
use crate::error::Error;
use crate::{check_status, parse_status, parse_timeline, SessionCookie, TimelineClient};

const COOKIE: &str = "guest_id=v1%3A1; ct0=csrf123; auth_token=tok456; lang=en";

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| vars.get(key).cloned()
}

fn base_vars() -> Vec<(&'static str, &'static str)> {
    vec![(ENV_BEARER_TOKEN, "AAAA"), (ENV_COOKIE, COOKIE)]
}

#[test]
fn test_parse_session_cookie() {
    let cookie = SessionCookie::from_str(COOKIE).unwrap();
    assert_eq!(cookie.ct0, "csrf123");
    assert_eq!(cookie.auth_token, "tok456");
    assert_eq!(cookie.to_string(), "ct0=csrf123; auth_token=tok456");
}

#[test]
fn test_parse_session_cookie_missing_token() {
    let result = SessionCookie::from_str("ct0=csrf123; lang=en");
    assert!(matches!(result, Err(Error::InvalidCookie(_))));
}

#[test]
fn test_config_defaults() {
    let config = ClientConfig::from_lookup(lookup(&base_vars())).unwrap();
    assert_eq!(config.api_base.as_str(), "https://api.twitter.com/1.1");
    assert_eq!(config.bearer_token, "AAAA");
    assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(config.log_dir, None);
}

#[test]
fn test_config_overrides() {
    let mut vars = base_vars();
    vars.push((ENV_API_BASE, "http://localhost:8080/1.1/"));
    vars.push((ENV_PAGE_SIZE, "1000"));
    vars.push((ENV_LOG_DIR, "log"));
    let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
    assert_eq!(config.api_base.as_str(), "http://localhost:8080/1.1/");
    assert_eq!(config.page_size, HOME_TIMELINE_MAX_COUNT);
    assert_eq!(config.log_dir.as_deref(), Some(std::path::Path::new("log")));

    let client = TimelineClient::new(config).unwrap();
    assert_eq!(
        client.endpoint(HOME_TIMELINE_PATH).unwrap().as_str(),
        "http://localhost:8080/1.1/statuses/home_timeline.json"
    );
}

#[test]
fn test_config_errors() {
    let result = ClientConfig::from_lookup(lookup(&[(ENV_COOKIE, COOKIE)]));
    assert!(matches!(result, Err(Error::MissingConfig(key)) if key == ENV_BEARER_TOKEN));

    let mut vars = base_vars();
    vars.push((ENV_PAGE_SIZE, "twenty"));
    let result = ClientConfig::from_lookup(lookup(&vars));
    assert!(matches!(result, Err(Error::InvalidConfig { key, .. }) if key == ENV_PAGE_SIZE));

    let mut vars = base_vars();
    vars.push((ENV_API_BASE, "not a url"));
    let result = ClientConfig::from_lookup(lookup(&vars));
    assert!(matches!(result, Err(Error::InvalidConfig { key, .. }) if key == ENV_API_BASE));
}

#[test]
fn test_query_params() {
    let since_id: Option<u64> = Some(42);
    let max_id: Option<u64> = None;
    let params = crate::query! {
        required count => 20,
        optional since_id,
        optional max_id,
    };
    assert_eq!(
        params,
        [("count", "20".to_string()), ("since_id", "42".to_string())]
    );
}

#[test]
fn test_parse_timeline() {
    let page = parse_timeline(r#"[{"id": 2, "text": "b"}, {"id": 1}]"#).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["id"], 2);

    let result = parse_timeline(r#"{"errors": [{"code": 88, "message": "Rate limit exceeded"}]}"#);
    assert!(matches!(result, Err(Error::UnexpectedResponse { expected: "array", .. })));
    assert!(matches!(parse_timeline("<html>"), Err(Error::JSONError(_))));
}

#[test]
fn test_check_status() {
    assert!(check_status(StatusCode::OK, "[]").is_ok());

    let body = r#"{"errors": [{"code": 88, "message": "Rate limit exceeded"}]}"#;
    match check_status(StatusCode::TOO_MANY_REQUESTS, body) {
        Err(Error::HttpStatus { status, body: got }) => {
            assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(got, body);
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
    assert!(matches!(
        check_status(StatusCode::UNAUTHORIZED, ""),
        Err(Error::HttpStatus { status, .. }) if status == StatusCode::UNAUTHORIZED
    ));
}

#[test]
fn test_parse_status() {
    let post = parse_status(r#"{"id": 100, "text": "hello"}"#).unwrap();
    assert_eq!(post["id"], 100);

    let result = parse_status(r#"[{"id": 100}]"#);
    assert!(matches!(result, Err(Error::UnexpectedResponse { expected: "object", .. })));
    assert!(matches!(parse_status(""), Err(Error::JSONError(_))));
}

#[tokio::test]
async fn test_response_log_failure_keeps_outcome() {
    let mut vars = base_vars();
    vars.push((ENV_LOG_DIR, "/nonexistent/timeline-log-dir"));
    let client = TimelineClient::new(ClientConfig::from_lookup(lookup(&vars)).unwrap()).unwrap();
    assert!(client.log("home", "[]").await.is_err());

    let content = client
        .finish_response(HOME_TIMELINE_PATH, StatusCode::OK, "[]".to_string())
        .await
        .unwrap();
    assert_eq!(content, "[]");

    let result = client
        .finish_response(HOME_TIMELINE_PATH, StatusCode::SERVICE_UNAVAILABLE, "down".to_string())
        .await;
    assert!(matches!(
        result,
        Err(Error::HttpStatus { status, .. }) if status == StatusCode::SERVICE_UNAVAILABLE
    ));
}
