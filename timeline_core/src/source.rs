// The collaborators a feed session talks to. Implementations own the transport,
// authentication, timeouts and retries; the core only sees raw records.

use async_trait::async_trait;
use serde_json::Value;

use crate::compose::Draft;

/// A source of raw, newest-first pages of posts.
#[async_trait]
pub trait FeedSource {
    /// The first page of the home feed.
    async fn fetch_home(&self) -> anyhow::Result<Vec<Value>>;
    /// Posts newer than `since_id`.
    async fn fetch_newer(&self, since_id: u64) -> anyhow::Result<Vec<Value>>;
    /// Posts at or older than `max_id`. The page may start with `max_id` itself.
    async fn fetch_older(&self, max_id: u64) -> anyhow::Result<Vec<Value>>;
}

/// A sink for new posts and replies. Returns the raw record of the created post.
#[async_trait]
pub trait Publisher {
    async fn publish(&self, draft: &Draft) -> anyhow::Result<Value>;
}
