use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unexpected response: expected {expected}, got {got}")]
    UnexpectedResponse { expected: &'static str, got: String },
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("Invalid cookie: {0}")]
    InvalidCookie(String),
    #[error("Missing config: {0}")]
    MissingConfig(&'static str),
    #[error("Invalid config {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },
    #[error("Invalid header value: {0}")]
    HeaderError(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Cannot encode/decode JSON: {0}")]
    JSONError(#[from] serde_json::Error),
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Network Error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Cannot parse URL: {0}")]
    UrlError(#[from] url::ParseError),
}
