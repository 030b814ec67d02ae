// Raw post payloads are loosely typed: any field may be missing, null, or of the wrong type.
// Each field below is extracted independently, and a bad field only degrades itself.

use serde::Deserialize;
use serde_json::{Map, Value};
use serde_with::{serde_as, DefaultOnError, VecSkipError};
use url::Url;

use crate::error::{Error, Result};
use crate::post::{Link, PostRecord, MAX_MEDIA};
use crate::util::parse_created_at;

// MARK: Raw shapes

#[serde_as]
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawPost {
    #[serde_as(as = "DefaultOnError")]
    id: Option<u64>,
    #[serde_as(as = "DefaultOnError")]
    text: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    full_text: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    created_at: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    retweet_count: Option<u64>,
    #[serde_as(as = "DefaultOnError")]
    favorite_count: Option<u64>,
    #[serde_as(as = "DefaultOnError")]
    favorited: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    retweeted: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    user: Option<RawUser>,
    #[serde_as(as = "DefaultOnError")]
    entities: Option<RawEntities>,
    #[serde_as(as = "DefaultOnError")]
    extended_entities: Option<RawExtendedEntities>,
}

#[serde_as]
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawUser {
    #[serde_as(as = "DefaultOnError")]
    name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    screen_name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    profile_image_url: Option<Url>,
    #[serde_as(as = "DefaultOnError")]
    profile_image_url_https: Option<Url>,
}

#[serde_as]
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawEntities {
    #[serde_as(as = "DefaultOnError")]
    urls: Vec<Value>,
}

#[serde_as]
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawUrlEntity {
    #[serde_as(as = "DefaultOnError")]
    url: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    display_url: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    expanded_url: Option<String>,
}

#[serde_as]
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawExtendedEntities {
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    media: Vec<RawMedia>,
}

#[derive(Deserialize, Debug)]
struct RawMedia {
    media_url_https: Url,
}

// MARK: Decoder

#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderConfig {
    /// Reject records without a readable id instead of giving them id 0.
    pub require_id: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Decoder { config }
    }

    /// Decode one raw record. Fails only when the record is not a JSON object,
    /// or when it has no id and `require_id` is set.
    pub fn decode(&self, raw: &Value) -> Result<PostRecord> {
        let Some(object) = raw.as_object() else {
            return Err(Error::NotKeyValue(value_kind(raw).to_string()));
        };
        let post = RawPost::deserialize(raw)?;

        let id = match post.id {
            Some(id) => id,
            None if self.config.require_id => return Err(Error::MissingId),
            None => {
                tracing::debug!("Post has no readable id, using 0");
                0
            }
        };

        let created_at = post.created_at.as_deref().and_then(parse_created_at);
        let degraded = degraded_fields(object, &post, created_at.is_some());
        if !degraded.is_empty() {
            tracing::debug!("Post {} has malformed fields: {:?}", id, degraded);
        }

        let user = post.user.unwrap_or_default();
        Ok(PostRecord {
            id,
            text: post.text.or(post.full_text),
            created_at,
            retweet_count: post.retweet_count.unwrap_or(0),
            favorite_count: post.favorite_count.unwrap_or(0),
            author_name: user.name,
            author_handle: user.screen_name,
            author_avatar_url: user.profile_image_url.or(user.profile_image_url_https),
            favorited: post.favorited,
            reposted: post.retweeted,
            link: post.entities.and_then(first_link),
            media_urls: post.extended_entities.map(media_urls).unwrap_or_default(),
        })
    }

    /// Decode a page of raw records. Records that are not objects are dropped;
    /// every other record yields a post, degraded where necessary.
    pub fn decode_many<'a, I>(&self, raws: I) -> Vec<PostRecord>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        raws.into_iter()
            .enumerate()
            .filter_map(|(index, raw)| match self.decode(raw) {
                Ok(post) => Some(post),
                Err(e) => {
                    tracing::warn!("Dropped record {} of page: {}", index, e);
                    None
                }
            })
            .collect()
    }
}

pub fn decode(raw: &Value) -> Result<PostRecord> {
    Decoder::default().decode(raw)
}

pub fn decode_many(raws: &[Value]) -> Vec<PostRecord> {
    Decoder::default().decode_many(raws)
}

/// Keys present in the raw record whose value could not be read.
fn degraded_fields(object: &Map<String, Value>, post: &RawPost, created_at_parsed: bool) -> Vec<&'static str> {
    [
        ("created_at", !created_at_parsed),
        ("text", post.text.is_none()),
        ("full_text", post.full_text.is_none()),
        ("retweet_count", post.retweet_count.is_none()),
        ("favorite_count", post.favorite_count.is_none()),
        ("favorited", post.favorited.is_none()),
        ("retweeted", post.retweeted.is_none()),
        ("user", post.user.is_none()),
        ("entities", post.entities.is_none()),
        ("extended_entities", post.extended_entities.is_none()),
    ]
    .into_iter()
    .filter(|(key, unread)| *unread && object.get(*key).is_some_and(|v| !v.is_null()))
    .map(|(key, _)| key)
    .collect()
}

fn first_link(entities: RawEntities) -> Option<Link> {
    let first = entities.urls.first()?;
    let entity = RawUrlEntity::deserialize(first).ok()?;
    let link = Link {
        url: entity.url,
        display_url: entity.display_url,
        expanded_url: entity.expanded_url,
    };
    (!link.is_empty()).then_some(link)
}

fn media_urls(entities: RawExtendedEntities) -> Vec<Url> {
    entities
        .media
        .into_iter()
        .take(MAX_MEDIA)
        .map(|m| m.media_url_https)
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn degraded(raw: &Value) -> Vec<&'static str> {
        let post = RawPost::deserialize(raw).unwrap();
        let created_at = post.created_at.as_deref().and_then(parse_created_at);
        degraded_fields(raw.as_object().unwrap(), &post, created_at.is_some())
    }

    #[test]
    fn test_malformed_text_reported_despite_full_text() {
        let raw = json!({ "id": 1, "text": 5, "full_text": "fallback", "created_at": null });
        assert_eq!(degraded(&raw), ["text"]);
        assert_eq!(decode(&raw).unwrap().text.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_absent_fields_are_not_degraded() {
        assert!(degraded(&json!({ "id": 1 })).is_empty());
        let raw = json!({ "id": 1, "created_at": "soon", "user": "someone", "retweet_count": "x" });
        assert_eq!(degraded(&raw), ["created_at", "retweet_count", "user"]);
    }
}
