use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::util::created_at_format;

/// Media attachments beyond this count are ignored.
pub const MAX_MEDIA: usize = 4;

/// The first link entity embedded in a post.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub url: Option<String>,
    pub display_url: Option<String>,
    pub expanded_url: Option<String>,
}

impl Link {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.display_url.is_none() && self.expanded_url.is_none()
    }
}

/// A decoded post. Built once by the decoder and never mutated afterwards.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub id: u64,
    pub text: Option<String>,
    #[serde(with = "created_at_format", default)]
    pub created_at: Option<DateTime<Utc>>,
    pub retweet_count: u64,
    pub favorite_count: u64,
    pub author_name: Option<String>,
    pub author_handle: Option<String>,
    pub author_avatar_url: Option<Url>,
    pub favorited: Option<bool>,
    pub reposted: Option<bool>,
    pub link: Option<Link>,
    pub media_urls: Vec<Url>,
}

impl PostRecord {
    /// An otherwise empty record, mostly useful for tests and placeholders.
    pub fn with_id(id: u64) -> Self {
        PostRecord {
            id,
            text: None,
            created_at: None,
            retweet_count: 0,
            favorite_count: 0,
            author_name: None,
            author_handle: None,
            author_avatar_url: None,
            favorited: None,
            reposted: None,
            link: None,
            media_urls: Vec::new(),
        }
    }

    pub fn has_media(&self) -> bool {
        !self.media_urls.is_empty()
    }
}
