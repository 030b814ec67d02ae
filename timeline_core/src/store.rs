use std::collections::HashSet;

use crate::cursor::PaginationCursor;
use crate::error::{Error, Result};
use crate::post::PostRecord;

/// Ordered, newest-first collection of posts with unique ids.
///
/// Order is the order in which pages arrived and were merged; records are never
/// re-sorted by timestamp. The cursor boundaries only ever point at posts that came
/// from the feed source, so locally published posts never hide a gap from a refresh.
#[derive(Debug, Default)]
pub struct FeedStore {
    posts: Vec<PostRecord>,
    ids: HashSet<u64>,
    /// Posts inserted by `insert_published` that the source has not sent back yet.
    published: HashSet<u64>,
    cursor: PaginationCursor,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole feed with a newest-first page.
    pub fn initialize(&mut self, records: Vec<PostRecord>) -> usize {
        self.posts.clear();
        self.ids.clear();
        self.published.clear();
        for record in records {
            if self.ids.insert(record.id) {
                self.posts.push(record);
            } else {
                tracing::warn!("Skipped duplicate post {} in initial page", record.id);
            }
        }
        self.cursor.set_since_id(self.posts.first().map(|post| post.id));
        self.cursor.set_max_id(self.posts.last().map(|post| post.id));
        tracing::info!("Initialized feed with {} posts", self.posts.len());
        self.posts.len()
    }

    /// Insert a newest-first page in front of the feed, keeping its order.
    /// Posts already in the feed are skipped, except locally published ones, which move
    /// to where the page puts them. Returns the number of posts added.
    pub fn prepend_newer(&mut self, records: Vec<PostRecord>) -> usize {
        let before = self.posts.len();
        let echoed: HashSet<u64> = records
            .iter()
            .map(|record| record.id)
            .filter(|id| self.published.contains(id))
            .collect();
        if !echoed.is_empty() {
            self.posts.retain(|post| !echoed.contains(&post.id));
            for id in &echoed {
                self.ids.remove(id);
                self.published.remove(id);
            }
        }

        let fresh: Vec<PostRecord> = records
            .into_iter()
            .filter(|record| self.ids.insert(record.id))
            .collect();
        if let Some(first) = fresh.first() {
            self.cursor.set_since_id(Some(first.id));
        }
        if self.cursor.max_id().is_none() {
            self.cursor.set_max_id(fresh.last().map(|post| post.id));
        }
        if !fresh.is_empty() {
            self.posts.splice(0..0, fresh);
        }
        let added = self.posts.len() - before;
        tracing::info!("Prepended {} newer posts, feed has {}", added, self.posts.len());
        added
    }

    /// Put a post the user just published at the front without moving the cursor.
    /// Returns false if the post is already in the feed.
    pub fn insert_published(&mut self, record: PostRecord) -> bool {
        if !self.ids.insert(record.id) {
            return false;
        }
        self.published.insert(record.id);
        self.posts.insert(0, record);
        true
    }

    /// Append a page of older posts after the tail.
    ///
    /// The feed source re-sends the current tail as the first post of an older page,
    /// so a leading post with the tail's id is dropped. Returns the number of posts added.
    pub fn append_older(&mut self, records: Vec<PostRecord>) -> usize {
        let tail_id = self.posts.last().map(|post| post.id);
        let mut records = records.into_iter().peekable();
        let resent_tail = matches!((tail_id, records.peek()), (Some(tail), Some(first)) if first.id == tail);
        if resent_tail {
            tracing::debug!("Dropped boundary post {:?} re-sent at head of older page", tail_id);
            records.next();
        }

        let before = self.posts.len();
        for record in records {
            if self.ids.insert(record.id) {
                self.posts.push(record);
            } else {
                tracing::warn!("Skipped duplicate post {} in older page", record.id);
            }
        }
        let added = self.posts.len() - before;
        if added > 0 {
            if self.cursor.since_id().is_none() {
                self.cursor.set_since_id(Some(self.posts[before].id));
            }
            self.cursor.set_max_id(self.posts.last().map(|post| post.id));
        }
        tracing::info!("Appended {} older posts, feed has {}", added, self.posts.len());
        added
    }

    /// Swap in an updated version of a post already in the feed, keeping its position.
    pub fn replace(&mut self, record: PostRecord) -> bool {
        match self.position(record.id) {
            Some(index) => {
                self.posts[index] = record;
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn at(&self, index: usize) -> Result<&PostRecord> {
        self.posts.get(index).ok_or(Error::OutOfRange {
            index,
            count: self.posts.len(),
        })
    }

    pub fn get(&self, index: usize) -> Option<&PostRecord> {
        self.posts.get(index)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.posts.iter().position(|post| post.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostRecord> {
        self.posts.iter()
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }
}
