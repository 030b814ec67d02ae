mod config;
mod consts;
mod error;
#[cfg(test)]
mod test;
mod util;

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode, Url};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use timeline_core::{Draft, FeedSource, Publisher};

pub use config::*;
use consts::*;
pub use error::{Error, Result};
use util::parse_cookie_str;

#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub ct0: String,
    pub auth_token: String,
}

impl Display for SessionCookie {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ct0={}; auth_token={}", self.ct0, self.auth_token)
    }
}

impl FromStr for SessionCookie {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut cookie_map = parse_cookie_str(s);
        let ct0 = cookie_map.remove("ct0").ok_or(Error::InvalidCookie(s.to_string()))?;
        let auth_token = cookie_map
            .remove("auth_token")
            .ok_or(Error::InvalidCookie(s.to_string()))?;
        Ok(SessionCookie { ct0, auth_token })
    }
}

/// Home timeline client over the REST API. Serves as the feed source of a `FeedSession`.
#[derive(Debug, Clone)]
pub struct TimelineClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl TimelineClient {
    pub fn new(config: ClientConfig) -> Result<TimelineClient> {
        let cookie = &config.session_cookie;
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.bearer_token))?,
        );
        headers.insert(header::COOKIE, header::HeaderValue::from_str(&cookie.to_string())?);
        headers.insert("x-csrf-token", header::HeaderValue::from_str(&cookie.ct0)?);
        headers.insert("x-twitter-active-user", header::HeaderValue::from_static("yes"));
        headers.insert("x-twitter-client-language", header::HeaderValue::from_static("en"));
        headers.insert("x-twitter-auth-type", header::HeaderValue::from_static("OAuth2Session"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(TimelineClient { config, client })
    }

    pub fn from_env() -> Result<TimelineClient> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// One page of the home timeline, newest first, as raw records.
    /// `max_id` is inclusive: the page starts with that post when it still exists.
    pub async fn home_timeline(&self, since_id: Option<u64>, max_id: Option<u64>) -> Result<Vec<Value>> {
        let params = crate::query! {
            required count => self.config.page_size,
            required include_entities => true,
            optional since_id,
            optional max_id,
        };
        let content = self.rest_get(HOME_TIMELINE_PATH, &params).await?;
        let page = parse_timeline(&content)?;
        tracing::info!(
            "Fetched {} posts (since {:?}, max {:?})",
            page.len(),
            since_id,
            max_id
        );
        Ok(page)
    }

    /// Post a new status, or a reply when the draft has `in_reply_to`. Returns the created post.
    pub async fn update_status(&self, draft: &Draft) -> Result<Value> {
        let in_reply_to_status_id = draft.in_reply_to;
        let params = crate::query! {
            required status => draft.text,
            optional in_reply_to_status_id,
        };
        let content = self.rest_post(UPDATE_STATUS_PATH, &params).await?;
        parse_status(&content)
    }
}

impl TimelineClient {
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.config.api_base.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }

    async fn rest_get(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let url = self.endpoint(path)?;
        let response: Response = self.client.get(url).query(params).send().await?;
        self.read_response(path, response).await
    }

    async fn rest_post(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let url = self.endpoint(path)?;
        let response: Response = self.client.post(url).form(params).send().await?;
        self.read_response(path, response).await
    }

    async fn read_response(&self, path: &str, response: Response) -> Result<String> {
        let status = response.status();
        let content = response.text().await?;
        self.finish_response(path, status, content).await
    }

    /// Dump the body to the log dir, then fail on a non-2xx status.
    /// A dump that cannot be written never changes the outcome of the request.
    async fn finish_response(&self, path: &str, status: StatusCode, content: String) -> Result<String> {
        let name = path.trim_start_matches('/').trim_end_matches(".json").replace('/', "_");
        if let Err(e) = self.log(&name, &content).await {
            tracing::warn!("Cannot write response log for {}: {}", path, e);
        }
        if let Err(e) = check_status(status, &content) {
            tracing::warn!("Request to {} failed: {}", path, e);
            return Err(e);
        }
        Ok(content)
    }

    async fn log(&self, name: &str, content: &str) -> Result<()> {
        use tokio::{fs::File, io::AsyncWriteExt};

        if let Some(dir) = &self.config.log_dir {
            let time = chrono::Local::now().format("%Y%m%d_%H%M%S");
            let filepath = dir.join(format!("timeline_{}_{}.json", name, time));
            let mut file = File::create(filepath).await?;
            file.write_all(content.as_bytes()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl FeedSource for TimelineClient {
    async fn fetch_home(&self) -> anyhow::Result<Vec<Value>> {
        Ok(self.home_timeline(None, None).await?)
    }

    async fn fetch_newer(&self, since_id: u64) -> anyhow::Result<Vec<Value>> {
        Ok(self.home_timeline(Some(since_id), None).await?)
    }

    async fn fetch_older(&self, max_id: u64) -> anyhow::Result<Vec<Value>> {
        Ok(self.home_timeline(None, Some(max_id)).await?)
    }
}

#[async_trait]
impl Publisher for TimelineClient {
    async fn publish(&self, draft: &Draft) -> anyhow::Result<Value> {
        Ok(self.update_status(draft).await?)
    }
}

fn check_status(status: StatusCode, content: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(Error::HttpStatus {
        status,
        body: content_preview(content),
    })
}

/// A timeline response must be a JSON array of records.
fn parse_timeline(content: &str) -> Result<Vec<Value>> {
    match serde_json::from_str(content)? {
        Value::Array(records) => Ok(records),
        _ => Err(Error::UnexpectedResponse {
            expected: "array",
            got: content_preview(content),
        }),
    }
}

/// A status update response must be a single JSON object.
fn parse_status(content: &str) -> Result<Value> {
    match serde_json::from_str(content)? {
        value @ Value::Object(_) => Ok(value),
        _ => Err(Error::UnexpectedResponse {
            expected: "object",
            got: content_preview(content),
        }),
    }
}

fn content_preview(content: &str) -> String {
    content.chars().take(120).collect()
}
