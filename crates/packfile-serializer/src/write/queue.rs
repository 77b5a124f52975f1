//! Nested FIFO work lists.
//!
//! A stack of queues where processing always takes from the deepest
//! non-empty level. Work discovered while handling an item at depth `d` is
//! queued at `d + 1`, so it completes before the item's remaining siblings.

use std::collections::VecDeque;

#[derive(Debug)]
pub(crate) struct WorkStack<T> {
    levels: Vec<VecDeque<T>>,
}

impl<T> Default for WorkStack<T> {
    fn default() -> Self {
        Self {
            levels: vec![VecDeque::new()],
        }
    }
}

impl<T> WorkStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` to the level at `depth`, creating levels as needed.
    pub fn enqueue(&mut self, depth: usize, item: T) {
        while self.levels.len() <= depth {
            self.levels.push(VecDeque::new());
        }
        self.levels[depth].push_back(item);
    }

    /// Drop empty levels above the base. Returns how many were dropped.
    pub fn trim(&mut self) -> usize {
        let mut dropped = 0;
        while self.levels.len() > 1 && self.levels.last().is_some_and(VecDeque::is_empty) {
            self.levels.pop();
            dropped += 1;
        }
        dropped
    }

    /// Take the next item of the deepest level, with that level's depth.
    ///
    /// Call after [`trim`](Self::trim); an empty top level yields `None`.
    pub fn dequeue(&mut self) -> Option<(usize, T)> {
        let depth = self.levels.len() - 1;
        self.levels[depth].pop_front().map(|item| (depth, item))
    }

    /// Trim, then dequeue.
    pub fn pop(&mut self) -> Option<(usize, T)> {
        self.trim();
        self.dequeue()
    }
}
