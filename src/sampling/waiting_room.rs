//! Fixed-capacity FIFO staging buffer in front of the reservoir

use crate::graph::Edge;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct WaitingRoom {
    queue: VecDeque<Edge>,
    capacity: usize,
}

impl WaitingRoom {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    /// Stage `edge`. When the room is full the oldest edge is pushed out and
    /// returned; a zero-capacity room hands the edge straight back.
    pub fn push(&mut self, edge: Edge) -> Option<Edge> {
        if self.capacity == 0 {
            return Some(edge);
        }
        let oldest = if self.is_full() {
            self.queue.pop_front()
        } else {
            None
        };
        self.queue.push_back(edge);
        oldest
    }

    pub fn oldest(&self) -> Option<&Edge> {
        self.queue.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.queue.iter()
    }
}
