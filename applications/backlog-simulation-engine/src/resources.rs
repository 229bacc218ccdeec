//! Bounded multi-tasking service slots

use std::collections::VecDeque;

use crate::types::DefectId;

/// One service channel holding up to `qmax` defects concurrently.
///
/// Defects rotate through the slot front-to-back each tick; admission past
/// capacity is refused rather than queued.
#[derive(Debug, Clone)]
pub struct ResourceSlot {
    queue: VecDeque<DefectId>,
    qmax: usize,
}

impl ResourceSlot {
    fn new(qmax: usize) -> Self {
        ResourceSlot {
            queue: VecDeque::with_capacity(qmax),
            qmax,
        }
    }

    pub fn has_room(&self) -> bool {
        self.queue.len() < self.qmax
    }

    /// Admit a defect if capacity allows; returns whether it was admitted
    pub fn admit(&mut self, id: DefectId) -> bool {
        if self.has_room() {
            self.queue.push_back(id);
            true
        } else {
            false
        }
    }

    pub fn pop_front(&mut self) -> Option<DefectId> {
        self.queue.pop_front()
    }

    pub fn push_back(&mut self, id: DefectId) {
        self.queue.push_back(id);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DefectId> + '_ {
        self.queue.iter().copied()
    }
}

/// Fixed pool of independently indexed slots.
///
/// Index order is the refill fairness order: lower-indexed slots get first
/// access to the top of the backlog each tick.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    slots: Vec<ResourceSlot>,
}

impl ResourcePool {
    pub fn new(resources: usize, qmax: usize) -> Self {
        ResourcePool {
            slots: (0..resources).map(|_| ResourceSlot::new(qmax)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, n: usize) -> &ResourceSlot {
        &self.slots[n]
    }

    pub fn slot_mut(&mut self, n: usize) -> &mut ResourceSlot {
        &mut self.slots[n]
    }

    /// All defect ids currently in service, across every slot
    pub fn in_service(&self) -> Vec<DefectId> {
        self.slots.iter().flat_map(|s| s.ids()).collect()
    }
}
