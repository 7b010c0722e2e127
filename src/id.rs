//! Identity allocation shared by every item kind.

use crate::item::ItemId;

/// Hands out strictly increasing ids starting at 1.
///
/// One allocator belongs to one store; ids are never reused, even after the
/// item holding them is removed.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: ItemId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> ItemId {
        self.last += 1;
        self.last
    }

    /// Most recently issued id (0 before the first call)
    pub fn last(&self) -> ItemId {
        self.last
    }
}
