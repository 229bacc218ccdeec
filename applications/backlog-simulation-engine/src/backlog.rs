//! Priority-ordered backlog of defects awaiting service

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::types::DefectId;

/// Min-heap over `(priority rank, admission sequence)`.
///
/// Lower rank is served first. The sequence number is stamped at push time
/// and makes ties deterministic: within one rank, defects leave the backlog
/// in the order they entered it.
#[derive(Debug, Clone, Default)]
pub struct BacklogQueue {
    heap: BinaryHeap<Reverse<(i32, u64, DefectId)>>,
    next_seq: u64,
}

impl BacklogQueue {
    pub fn new() -> Self {
        BacklogQueue::default()
    }

    pub fn push(&mut self, priority: i32, id: DefectId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((priority, seq, id)));
    }

    /// Remove and return the highest-priority (lowest-rank) defect
    pub fn pop_min(&mut self) -> Option<DefectId> {
        self.heap.pop().map(|Reverse((_, _, id))| id)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain the backlog in service order
    pub fn drain_ids(&mut self) -> Vec<DefectId> {
        let mut ids = Vec::with_capacity(self.heap.len());
        while let Some(id) = self.pop_min() {
            ids.push(id);
        }
        ids
    }
}
