use serde_json::Value;
use tokio::sync::{watch, RwLock, RwLockReadGuard};

use crate::compose::Draft;
use crate::cursor::Direction;
use crate::decode::{Decoder, DecoderConfig};
use crate::error::{Error, Result};
use crate::post::PostRecord;
use crate::source::{FeedSource, Publisher};
use crate::store::FeedStore;

/// Last change to the feed, broadcast to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Idle,
    Loaded { count: usize },
    Prepended { added: usize },
    Appended { added: usize },
    Published { id: u64 },
    Updated { id: u64 },
    /// `direction` is `None` for failures outside paging, like publishing.
    FetchFailed { direction: Option<Direction>, error: String },
}

/// One feed being browsed: its source, the merged posts, and their pagination state.
///
/// Methods take `&self`, so a refresh and an older-page fetch can be in flight at the same
/// time on one task. The store lock is only held between awaits on the source; the cursor's
/// in-flight flags reject a second fetch in the same direction.
pub struct FeedSession<S> {
    source: S,
    decoder: Decoder,
    store: RwLock<FeedStore>,
    events: watch::Sender<FeedEvent>,
}

impl<S> FeedSession<S> {
    pub fn new(source: S) -> Self {
        Self::with_decoder(source, DecoderConfig::default())
    }

    pub fn with_decoder(source: S, config: DecoderConfig) -> Self {
        let (events, _) = watch::channel(FeedEvent::Idle);
        FeedSession {
            source,
            decoder: Decoder::new(config),
            store: RwLock::new(FeedStore::new()),
            events,
        }
    }

    pub async fn store(&self) -> RwLockReadGuard<'_, FeedStore> {
        self.store.read().await
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Decode an updated copy of a post already in the feed and swap it in.
    pub async fn merge_update(&self, raw: &Value) -> Result<bool> {
        let record = self.decoder.decode(raw)?;
        let id = record.id;
        let replaced = self.store.write().await.replace(record);
        if replaced {
            self.emit(FeedEvent::Updated { id });
        }
        Ok(replaced)
    }

    fn emit(&self, event: FeedEvent) {
        self.events.send_replace(event);
    }

    fn settle<T>(&self, fetched: anyhow::Result<T>, direction: Option<Direction>) -> Result<T> {
        fetched.map_err(|e| {
            tracing::error!("Fetch failed ({:?}): {:#}", direction, e);
            self.emit(FeedEvent::FetchFailed {
                direction,
                error: e.to_string(),
            });
            Error::FetchFailed(e)
        })
    }
}

impl<S: FeedSource> FeedSession<S> {
    /// Fetch the first page of the feed and replace the current contents with it.
    pub async fn load_home(&self) -> Result<usize> {
        let fetched = self.source.fetch_home().await;
        let raws = self.settle(fetched, None)?;
        let records = self.decoder.decode_many(&raws);
        let count = self.store.write().await.initialize(records);
        self.emit(FeedEvent::Loaded { count });
        Ok(count)
    }

    /// Fetch posts newer than the front of the feed and put them in front.
    /// Returns `None` without fetching if a refresh is already in flight.
    pub async fn refresh(&self) -> Result<Option<usize>> {
        let (_permit, since_id) = {
            let store = self.store.read().await;
            let Some(permit) = store.cursor().acquire(Direction::Newer) else {
                tracing::debug!("Refresh already in flight, skipped");
                return Ok(None);
            };
            (permit, store.cursor().since_id())
        };

        let fetched = match since_id {
            Some(since_id) => self.source.fetch_newer(since_id).await,
            None => self.source.fetch_home().await,
        };
        let raws = self.settle(fetched, Some(Direction::Newer))?;
        let records = self.decoder.decode_many(&raws);
        let added = self.store.write().await.prepend_newer(records);
        self.emit(FeedEvent::Prepended { added });
        Ok(Some(added))
    }

    /// Fetch the page after the tail of the feed and append it.
    /// Returns `None` without fetching if a page is already in flight or nothing is loaded yet.
    pub async fn load_more(&self) -> Result<Option<usize>> {
        let (_permit, max_id) = {
            let store = self.store.read().await;
            let Some(max_id) = store.cursor().max_id() else {
                tracing::debug!("Feed is empty, nothing to page from");
                return Ok(None);
            };
            let Some(permit) = store.cursor().acquire(Direction::Older) else {
                tracing::debug!("Older page already in flight, skipped");
                return Ok(None);
            };
            (permit, max_id)
        };

        let fetched = self.source.fetch_older(max_id).await;
        let raws = self.settle(fetched, Some(Direction::Older))?;
        let records = self.decoder.decode_many(&raws);
        let added = self.store.write().await.append_older(records);
        self.emit(FeedEvent::Appended { added });
        Ok(Some(added))
    }
}

impl<S: FeedSource + Publisher> FeedSession<S> {
    /// Publish a new post or reply and put the created post at the front of the feed.
    /// The refresh boundary stays put, so posts made by others in the meantime still arrive.
    pub async fn publish(&self, draft: &Draft) -> Result<PostRecord> {
        draft.validate()?;
        let published = self.source.publish(draft).await;
        let raw = self.settle(published, None)?;
        let record = self.decoder.decode(&raw)?;
        self.store.write().await.insert_published(record.clone());
        tracing::info!("Published post {} (reply to {:?})", record.id, draft.in_reply_to);
        self.emit(FeedEvent::Published { id: record.id });
        Ok(record)
    }
}
