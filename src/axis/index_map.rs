use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::trace;

/// Position -> index mapping for one axis.
///
/// `order` is empty while the axis is in identity order. Once a move happens
/// it holds a permutation of `0..order.len()`; positions past its end still
/// map to themselves.
#[derive(Debug, Clone, Default)]
pub struct AxisIndexMap {
    order: Vec<usize>,
    count: usize,
}

impl AxisIndexMap {
    pub fn new(count: usize) -> Self {
        Self {
            order: Vec::new(),
            count,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Length of the materialized part of the mapping
    pub fn materialized_len(&self) -> usize {
        self.order.len()
    }

    pub fn is_identity(&self) -> bool {
        self.order.iter().enumerate().all(|(p, &i)| p == i)
    }

    /// Logical index shown at `position`. O(1).
    pub fn index_at(&self, position: usize) -> usize {
        assert!(
            position < self.count,
            "position {} out of range for axis of {}",
            position,
            self.count
        );
        self.order.get(position).copied().unwrap_or(position)
    }

    /// Visual position of `index`. Linear in the materialized length;
    /// prefer `index_at` on hot paths.
    pub fn position_of(&self, index: usize) -> usize {
        assert!(
            index < self.count,
            "index {} out of range for axis of {}",
            index,
            self.count
        );
        self.order
            .iter()
            .position(|&i| i == index)
            .unwrap_or(index)
    }

    /// Change the number of positions. Shrinking drops every index that no
    /// longer exists and keeps the survivors in their current order.
    pub fn set_count(&mut self, count: usize) {
        if count < self.order.len() {
            self.order.retain(|&i| i < count);
        }
        self.count = count;
    }

    pub fn reset(&mut self) {
        self.order.clear();
    }

    fn fill_to(&mut self, len: usize) {
        let len = len.min(self.count);
        let start = self.order.len();
        if start < len {
            self.order.extend(start..len);
        }
    }

    /// Move the indices at `positions` so that they sit contiguously, in
    /// their original relative order, in front of `destination`.
    ///
    /// `destination` is a position in the order *before* the move and may
    /// equal `count` to append at the end. Returns the position of the first
    /// moved item afterwards.
    pub fn move_positions(&mut self, positions: &[usize], destination: usize) -> usize {
        assert!(
            destination <= self.count,
            "destination {} out of range for axis of {}",
            destination,
            self.count
        );
        let mut sorted: Vec<usize> = positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let Some(&highest) = sorted.last() else {
            return destination;
        };
        assert!(
            highest < self.count,
            "position {} out of range for axis of {}",
            highest,
            self.count
        );

        self.fill_to(highest.max(destination) + 1);

        let mut moved = Vec::with_capacity(sorted.len());
        for &p in sorted.iter().rev() {
            moved.push(self.order.remove(p));
        }
        moved.reverse();

        let before = sorted.iter().filter(|&&p| p < destination).count();
        let insert_at = destination - before;
        self.order.splice(insert_at..insert_at, moved);

        trace!(moved = sorted.len(), destination, insert_at, "axis order moved");
        insert_at
    }

    /// Inverse of `move_positions`: take the contiguous block starting at
    /// `block_start` and put each of its items back at the matching entry of
    /// `original_positions` (ascending, same length as the block).
    pub fn restore_block(&mut self, block_start: usize, original_positions: &[usize]) {
        let mut sorted: Vec<usize> = original_positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let Some(&highest) = sorted.last() else {
            return;
        };
        let block_end = block_start + sorted.len();
        assert!(
            block_end <= self.count && highest < self.count,
            "block {}..{} out of range for axis of {}",
            block_start,
            block_end,
            self.count
        );

        self.fill_to(block_end.max(highest + 1));

        let block: Vec<usize> = self.order.drain(block_start..block_end).collect();
        // Ascending inserts land every item on its final position because
        // all smaller targets are already in place.
        for (&p, index) in sorted.iter().zip(block) {
            self.order.insert(p, index);
        }
    }

    /// Hash of the full order. Two equal fingerprints taken around a move
    /// mean the move changed nothing.
    pub fn order_fingerprint(&mut self) -> u64 {
        self.fill_to(self.count);
        let mut hasher = DefaultHasher::new();
        self.order.hash(&mut hasher);
        hasher.finish()
    }

    /// Full position -> index order
    pub fn order(&self) -> Vec<usize> {
        (0..self.count).map(|p| self.index_at(p)).collect()
    }
}
