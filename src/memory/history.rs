//! Bounded History: capacity-capped append-only log
//!
//! Keeps the newest `capacity` items. Writes past capacity drop from the
//! front, oldest first.

use std::collections::VecDeque;

/// Append-only ring of at most `capacity` items
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    /// Create an empty history
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from a snapshot, keeping only the newest `capacity` items
    pub fn from_items(items: impl IntoIterator<Item = T>, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        history.items.extend(items);
        history.truncate_front();
        history
    }

    /// Append an item, returning the old items it pushed out, oldest first
    /// Complexity: O(1) amortized
    pub fn push(&mut self, item: T) -> Vec<T> {
        self.items.push_back(item);
        self.truncate_front()
    }

    /// Reverse the last `push`: drop the newest item and put the items it
    /// pushed out back at the front
    pub fn undo_push(&mut self, dropped: Vec<T>) -> Option<T> {
        let newest = self.items.pop_back()?;
        for item in dropped.into_iter().rev() {
            self.items.push_front(item);
        }
        Some(newest)
    }

    fn truncate_front(&mut self) -> Vec<T> {
        let overflow = self.items.len().saturating_sub(self.capacity);
        self.items.drain(..overflow).collect()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// The newest `limit` items, oldest first
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &T> {
        let start = self.items.len().saturating_sub(limit);
        self.items.range(start..)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
