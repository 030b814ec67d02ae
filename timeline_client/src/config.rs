use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use crate::consts::{DEFAULT_PAGE_SIZE, DEFAULT_REST_API, HOME_TIMELINE_MAX_COUNT};
use crate::error::{Error, Result};
use crate::SessionCookie;

pub const ENV_API_BASE: &str = "TIMELINE_API_BASE";
pub const ENV_BEARER_TOKEN: &str = "TIMELINE_BEARER_TOKEN";
pub const ENV_COOKIE: &str = "TIMELINE_COOKIE";
pub const ENV_PAGE_SIZE: &str = "TIMELINE_PAGE_SIZE";
pub const ENV_LOG_DIR: &str = "CLIENT_LOG_DIR";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: Url,
    pub bearer_token: String,
    pub session_cookie: SessionCookie,
    /// Posts per page, within `1..=HOME_TIMELINE_MAX_COUNT`.
    pub page_size: u32,
    /// Raw responses are written here when set.
    pub log_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(bearer_token: impl Into<String>, session_cookie: SessionCookie) -> Result<Self> {
        Ok(ClientConfig {
            api_base: Url::parse(DEFAULT_REST_API)?,
            bearer_token: bearer_token.into(),
            session_cookie,
            page_size: DEFAULT_PAGE_SIZE,
            log_dir: None,
        })
    }

    /// Read the config from the environment, loading a `.env` file first if there is one.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bearer_token = lookup(ENV_BEARER_TOKEN).ok_or(Error::MissingConfig(ENV_BEARER_TOKEN))?;
        let cookie = lookup(ENV_COOKIE).ok_or(Error::MissingConfig(ENV_COOKIE))?;
        let mut config = Self::new(bearer_token, SessionCookie::from_str(&cookie)?)?;

        if let Some(api_base) = lookup(ENV_API_BASE) {
            config.api_base = Url::parse(&api_base).map_err(|_| Error::InvalidConfig {
                key: ENV_API_BASE,
                value: api_base.clone(),
            })?;
        }
        if let Some(page_size) = lookup(ENV_PAGE_SIZE) {
            let parsed: u32 = page_size.trim().parse().map_err(|_| Error::InvalidConfig {
                key: ENV_PAGE_SIZE,
                value: page_size.clone(),
            })?;
            config.page_size = parsed.clamp(1, HOME_TIMELINE_MAX_COUNT);
        }
        config.log_dir = lookup(ENV_LOG_DIR).filter(|dir| !dir.is_empty()).map(PathBuf::from);

        tracing::debug!(
            "Client config: api {}, page size {}, log dir {:?}",
            config.api_base,
            config.page_size,
            config.log_dir
        );
        Ok(config)
    }
}
