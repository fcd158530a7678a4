//! [`CommandQueue`] — the FIFO holding commands that have not started yet.

use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("cannot pop from an empty queue")]
    Empty,
}

/// First in, first out. Items are pushed at the back and popped from the front.
#[derive(Debug, Clone)]
pub struct CommandQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for CommandQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> CommandQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Remove and return the head of the queue.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if there is nothing to pop. Check
    /// [`is_empty`](Self::is_empty) first.
    pub fn pop(&mut self) -> Result<T, QueueError> {
        self.items.pop_front().ok_or(QueueError::Empty)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }
}

impl<T> Extend<T> for CommandQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_returns_items_in_push_order() {
        let mut queue = CommandQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.pop(), Ok(1));
        assert_eq!(queue.pop(), Ok(2));
        assert_eq!(queue.pop(), Ok(3));
    }

    #[test]
    fn test_pop_empty_is_an_error() {
        let mut queue: CommandQueue<u8> = CommandQueue::new();
        assert_eq!(queue.pop(), Err(QueueError::Empty));
    }

    #[test]
    fn test_front_and_back() {
        let mut queue = CommandQueue::new();
        assert_eq!(queue.front(), None);
        queue.push("a");
        queue.push("b");
        assert_eq!(queue.front(), Some(&"a"));
        assert_eq!(queue.back(), Some(&"b"));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut queue = CommandQueue::new();
        queue.extend([1, 2, 3]);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }
}
