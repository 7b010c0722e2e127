//! View history
//!
//! Keeps copies of the most recently viewed items, oldest first, at most one
//! entry per id. Entries live in a slot arena linked by `prev`/`next` indices;
//! an `id -> slot` map makes both recording and forgetting O(1).

use std::collections::HashMap;

use crate::item::{Item, ItemId};

#[derive(Debug, Clone)]
struct Node {
    item: Item,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Recency-ordered, deduplicated record of viewed items
#[derive(Debug, Clone, Default)]
pub struct History {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<ItemId, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    limit: Option<usize>,
}

impl History {
    /// Unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// History that evicts the oldest entry once `limit` entries are held
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Record a view of `item`, moving it to the most recent position
    pub fn record(&mut self, item: &Item) {
        self.forget(item.id);

        let node = Node {
            item: item.clone(),
            prev: self.tail,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.set_next(tail, Some(slot)),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.index.insert(item.id, slot);

        if let Some(limit) = self.limit {
            while self.len() > limit {
                let Some(oldest) = self.head.and_then(|head| self.node(head)).map(|n| n.item.id)
                else {
                    break;
                };
                self.forget(oldest);
            }
        }
    }

    /// Drop the entry for `id`; no-op if it was never viewed
    pub fn forget(&mut self, id: ItemId) {
        let Some(slot) = self.index.remove(&id) else {
            return;
        };
        let Some(node) = self.slots.get_mut(slot).and_then(Option::take) else {
            return;
        };

        match node.prev {
            Some(prev) => self.set_next(prev, node.next),
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.set_prev(next, node.prev),
            None => self.tail = node.prev,
        }
        self.free.push(slot);
    }

    /// Copies of every entry, oldest view first
    pub fn snapshot(&self) -> Vec<Item> {
        let mut items = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(node) = cursor.and_then(|slot| self.node(slot)) {
            items.push(node.item.clone());
            cursor = node.next;
        }
        items
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    fn node(&self, slot: usize) -> Option<&Node> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn set_next(&mut self, slot: usize, next: Option<usize>) {
        if let Some(node) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            node.next = next;
        }
    }

    fn set_prev(&mut self, slot: usize, prev: Option<usize>) {
        if let Some(node) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            node.prev = prev;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: ItemId) -> Item {
        Item::task(format!("task {id}"), "").with_id(id)
    }

    fn ids(history: &History) -> Vec<ItemId> {
        history.snapshot().iter().map(|item| item.id).collect()
    }

    #[test]
    fn records_in_view_order() {
        let mut history = History::new();
        for id in [1, 2, 3] {
            history.record(&item(id));
        }
        assert_eq!(ids(&history), vec![1, 2, 3]);
    }

    #[test]
    fn revisit_moves_to_tail_without_duplicates() {
        let mut history = History::new();
        for id in [1, 2, 3, 1, 2, 2] {
            history.record(&item(id));
        }
        assert_eq!(ids(&history), vec![3, 1, 2]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn forget_head_middle_and_tail() {
        let mut history = History::new();
        for id in 1..=5 {
            history.record(&item(id));
        }
        history.forget(1);
        history.forget(3);
        history.forget(5);
        history.forget(42);
        assert_eq!(ids(&history), vec![2, 4]);

        history.forget(2);
        history.forget(4);
        assert!(history.is_empty());
        assert!(history.snapshot().is_empty());
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut history = History::new();
        for round in 0..100 {
            history.record(&item(round % 3));
        }
        assert_eq!(history.slots.len(), 3);
        assert_eq!(ids(&history), vec![1, 2, 0]);
    }

    #[test]
    fn stores_copy_taken_at_view_time() {
        let mut history = History::new();
        let mut viewed = item(1);
        history.record(&viewed);
        viewed.name = "renamed".to_string();
        assert_eq!(history.snapshot()[0].name, "task 1");
    }

    #[test]
    fn limit_evicts_oldest() {
        let mut history = History::with_limit(2);
        for id in [1, 2, 3] {
            history.record(&item(id));
        }
        assert_eq!(ids(&history), vec![2, 3]);
        history.record(&item(2));
        history.record(&item(4));
        assert_eq!(ids(&history), vec![2, 4]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut history = History::new();
        history.record(&item(1));
        history.clear();
        assert!(history.is_empty());
        history.record(&item(2));
        assert_eq!(ids(&history), vec![2]);
    }
}
