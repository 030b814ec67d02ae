use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Which end of the feed a fetch extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Posts newer than the front of the feed (refresh).
    Newer,
    /// Posts older than the tail of the feed (pagination).
    Older,
}

/// Boundary ids for the next page requests, plus one in-flight flag per direction.
///
/// The flags are the only guard against overlapping fetches. The boundaries are
/// written by the feed store after a successful merge and never rolled back.
#[derive(Debug, Default)]
pub struct PaginationCursor {
    since_id: Option<u64>,
    max_id: Option<u64>,
    newer_in_flight: Arc<AtomicBool>,
    older_in_flight: Arc<AtomicBool>,
}

impl PaginationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the newest known post.
    pub fn since_id(&self) -> Option<u64> {
        self.since_id
    }

    /// Id of the oldest known post.
    pub fn max_id(&self) -> Option<u64> {
        self.max_id
    }

    pub(crate) fn set_since_id(&mut self, id: Option<u64>) {
        self.since_id = id;
    }

    pub(crate) fn set_max_id(&mut self, id: Option<u64>) {
        self.max_id = id;
    }

    pub fn begin_older_fetch(&self) -> bool {
        begin(&self.older_in_flight)
    }

    pub fn end_older_fetch(&self) {
        self.older_in_flight.store(false, Ordering::Release);
    }

    pub fn begin_newer_fetch(&self) -> bool {
        begin(&self.newer_in_flight)
    }

    pub fn end_newer_fetch(&self) {
        self.newer_in_flight.store(false, Ordering::Release);
    }

    pub fn in_flight(&self, direction: Direction) -> bool {
        self.flag(direction).load(Ordering::Acquire)
    }

    /// Mark a fetch in flight and return a permit that clears the flag when dropped.
    /// Returns `None` if a fetch in the same direction is already running.
    pub fn acquire(&self, direction: Direction) -> Option<FetchPermit> {
        let flag = self.flag(direction);
        begin(flag).then(|| FetchPermit {
            direction,
            flag: flag.clone(),
        })
    }

    fn flag(&self, direction: Direction) -> &Arc<AtomicBool> {
        match direction {
            Direction::Newer => &self.newer_in_flight,
            Direction::Older => &self.older_in_flight,
        }
    }
}

fn begin(flag: &AtomicBool) -> bool {
    flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}

/// Scoped in-flight marker for one fetch.
#[derive(Debug)]
#[must_use = "the fetch is released as soon as the permit is dropped"]
pub struct FetchPermit {
    direction: Direction,
    flag: Arc<AtomicBool>,
}

impl FetchPermit {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn release(self) {}
}

impl Drop for FetchPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_rejected() {
        let cursor = PaginationCursor::new();
        assert!(cursor.begin_older_fetch());
        assert!(!cursor.begin_older_fetch());
        cursor.end_older_fetch();
        assert!(cursor.begin_older_fetch());
    }

    #[test]
    fn test_directions_are_independent() {
        let cursor = PaginationCursor::new();
        assert!(cursor.begin_older_fetch());
        assert!(cursor.begin_newer_fetch());
        assert!(!cursor.begin_newer_fetch());
        cursor.end_newer_fetch();
        assert!(cursor.in_flight(Direction::Older));
        assert!(!cursor.in_flight(Direction::Newer));
    }

    #[test]
    fn test_permit_releases_on_drop() {
        let cursor = PaginationCursor::new();
        {
            let permit = cursor.acquire(Direction::Newer).unwrap();
            assert_eq!(permit.direction(), Direction::Newer);
            assert!(cursor.acquire(Direction::Newer).is_none());
            assert!(!cursor.begin_newer_fetch());
        }
        assert!(!cursor.in_flight(Direction::Newer));
        let permit = cursor.acquire(Direction::Newer).unwrap();
        permit.release();
        assert!(cursor.begin_newer_fetch());
    }

    #[test]
    fn test_boundaries_start_empty() {
        let cursor = PaginationCursor::new();
        assert_eq!(cursor.since_id(), None);
        assert_eq!(cursor.max_id(), None);
    }
}
