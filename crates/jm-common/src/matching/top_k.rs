use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// One scored survivor. Ordered so that "greater" means "ranks higher":
/// higher score first, then lower id.
#[derive(Debug, Clone)]
pub struct Ranked<I, T> {
    pub score: u8,
    pub id: I,
    pub item: T,
}

impl<I: Ord, T> Ranked<I, T> {
    fn key(&self) -> (u8, Reverse<&I>) {
        (self.score, Reverse(&self.id))
    }
}

impl<I: Ord, T> PartialEq for Ranked<I, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<I: Ord, T> Eq for Ranked<I, T> {}

impl<I: Ord, T> PartialOrd for Ranked<I, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: Ord, T> Ord for Ranked<I, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Keeps the best `capacity` entries seen so far. Memory stays bounded by
/// `capacity` no matter how many entries are offered.
#[derive(Debug)]
pub struct TopK<I, T> {
    capacity: usize,
    // Min-heap on rank: the root is the weakest survivor.
    heap: BinaryHeap<Reverse<Ranked<I, T>>>,
}

impl<I: Ord, T> TopK<I, T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1).min(1024)),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offers an entry; returns `true` if it is currently retained.
    pub fn offer(&mut self, score: u8, id: I, item: T) -> bool {
        if self.capacity == 0 {
            return false;
        }

        let candidate = Ranked { score, id, item };
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(candidate));
            return true;
        }

        match self.heap.peek() {
            Some(Reverse(weakest)) if candidate > *weakest => {
                self.heap.pop();
                self.heap.push(Reverse(candidate));
                true
            }
            _ => false,
        }
    }

    /// Best first.
    pub fn into_sorted_vec(self) -> Vec<Ranked<I, T>> {
        // Ascending order of Reverse<_> is descending rank.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(ranked)| ranked)
            .collect()
    }
}
