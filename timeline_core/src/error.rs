use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Record is not a key-value structure: {0}")]
    NotKeyValue(String),
    #[error("Record has no readable id")]
    MissingId,
    #[error("Index {index} out of range for feed of {count} posts")]
    OutOfRange { index: usize, count: usize },

    #[error("Draft is empty")]
    EmptyDraft,
    #[error("Draft is {0} characters long, over the limit")]
    DraftTooLong(usize),

    #[error("Fetch failed: {0}")]
    FetchFailed(#[source] anyhow::Error),
    #[error("Cannot encode/decode JSON: {0}")]
    JSONError(#[from] serde_json::Error),
}
