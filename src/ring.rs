//! Fixed-capacity ring buffer with overwrite-oldest semantics
//!
//! All long-lived histories in Crucible (performance snapshots, metric
//! series, explanations, episodes) are bounded so a long-running session
//! cannot grow state without bound. Oldest entries are silently discarded
//! once the buffer is full.

use crate::error::{CrucibleError, Result};
use serde::{Deserialize, Serialize};

/// A fixed-capacity circular buffer
///
/// Pushing into a full buffer overwrites the oldest entry and returns it.
/// Iteration always yields elements in insertion order, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingBuffer<T> {
    items: Vec<T>,
    head: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create a buffer with the given capacity
    ///
    /// A capacity of zero is rejected as a configuration error.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CrucibleError::config("ring buffer capacity must be positive"));
        }
        Ok(Self::new_unchecked(capacity))
    }

    /// Internal constructor for callers that have already validated capacity
    pub(crate) fn new_unchecked(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            head: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append an element, evicting and returning the oldest when full
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.items.len() < self.capacity {
            self.items.push(item);
            None
        } else {
            let evicted = std::mem::replace(&mut self.items[self.head], item);
            self.head = (self.head + 1) % self.capacity;
            Some(evicted)
        }
    }

    /// Number of elements currently held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the buffer is at capacity
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Maximum number of elements the buffer can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The oldest element still retained
    pub fn oldest(&self) -> Option<&T> {
        if self.is_full() {
            self.items.get(self.head)
        } else {
            self.items.first()
        }
    }

    /// The most recently pushed element
    pub fn newest(&self) -> Option<&T> {
        if self.items.is_empty() {
            None
        } else if self.is_full() {
            self.items.get((self.head + self.capacity - 1) % self.capacity)
        } else {
            self.items.last()
        }
    }

    /// Iterate in insertion order, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        // head is always 0 until the first wrap, so the split is a no-op
        // for a buffer that has not yet filled.
        let (wrapped, oldest) = self.items.split_at(self.head);
        oldest.iter().chain(wrapped.iter())
    }

    /// Remove all elements, keeping the capacity
    pub fn clear(&mut self) {
        self.items.clear();
        self.head = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy the retained elements into a vector, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(RingBuffer::<i32>::new(0).is_err());
    }

    #[test]
    fn test_push_below_capacity() {
        let mut buf = RingBuffer::new(3).unwrap();
        assert_eq!(buf.push(1), None);
        assert_eq!(buf.push(2), None);
        assert_eq!(buf.len(), 2);
        assert!(!buf.is_full());
        assert_eq!(buf.oldest(), Some(&1));
        assert_eq!(buf.newest(), Some(&2));
    }

    #[test]
    fn test_eviction_oldest_first() {
        let mut buf = RingBuffer::new(3).unwrap();
        buf.push(1);
        buf.push(2);
        buf.push(3);
        assert_eq!(buf.push(4), Some(1));
        assert_eq!(buf.push(5), Some(2));
        assert_eq!(buf.to_vec(), vec![3, 4, 5]);
        assert_eq!(buf.oldest(), Some(&3));
        assert_eq!(buf.newest(), Some(&5));
    }

    #[test]
    fn test_iteration_order_after_wrap() {
        let mut buf = RingBuffer::new(4).unwrap();
        for i in 0..10 {
            buf.push(i);
        }
        assert_eq!(buf.to_vec(), vec![6, 7, 8, 9]);
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn test_clear() {
        let mut buf = RingBuffer::new(2).unwrap();
        buf.push("a");
        buf.push("b");
        buf.push("c");
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.newest(), None);
        buf.push("d");
        assert_eq!(buf.to_vec(), vec!["d"]);
    }
}
