//! Chronological prioritization and overlap detection
//!
//! Only timed items (a start time and a non-zero duration) take part. The
//! index holds ids in ascending start order, ties broken by id; the store
//! resolves ids to item copies when listing.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::item::{Item, ItemId};

/// Half-open interval `[start, end)` of a timed item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Schedule {
    /// Interval of `item`, or `None` if it is not timed
    pub fn of(item: &Item) -> Option<Self> {
        if !item.is_timed() {
            return None;
        }
        let start = item.start_time?;
        let end = item.end_time()?;
        Some(Self { start, end })
    }

    /// Whether two schedules collide.
    ///
    /// A start or end strictly inside the other interval collides, and so do
    /// equal starts. Touching endpoints do not.
    pub fn intersects(&self, other: &Schedule) -> bool {
        let inside = |range: &Schedule, point: DateTime<Utc>| point > range.start && point < range.end;

        self.start == other.start
            || inside(self, other.start)
            || inside(self, other.end)
            || inside(other, self.start)
            || inside(other, self.end)
    }
}

/// Start-ordered set of timed items
#[derive(Debug, Clone, Default)]
pub struct PriorityIndex {
    by_start: BTreeMap<(DateTime<Utc>, ItemId), DateTime<Utc>>,
    starts: HashMap<ItemId, DateTime<Utc>>,
}

impl PriorityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.starts.contains_key(&id)
    }

    /// Re-register `item`: drop any previous entry, then insert it if timed
    pub fn upsert(&mut self, item: &Item) {
        self.remove(item.id);
        if let Some(schedule) = Schedule::of(item) {
            self.by_start.insert((schedule.start, item.id), schedule.end);
            self.starts.insert(item.id, schedule.start);
        }
    }

    pub fn remove(&mut self, id: ItemId) {
        if let Some(start) = self.starts.remove(&id) {
            self.by_start.remove(&(start, id));
        }
    }

    /// First member (in start order) whose schedule collides with `candidate`.
    ///
    /// The member sharing the candidate's id is skipped so that an item never
    /// collides with its own previous interval. Untimed candidates never
    /// collide.
    pub fn find_intersection(&self, candidate: &Item) -> Option<ItemId> {
        let schedule = Schedule::of(candidate)?;
        self.by_start
            .iter()
            .filter(|((_, id), _)| *id != candidate.id)
            .find(|((start, _), end)| {
                schedule.intersects(&Schedule {
                    start: *start,
                    end: **end,
                })
            })
            .map(|((_, id), _)| *id)
    }

    /// Member ids in ascending start order
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.by_start.keys().map(|(_, id)| *id)
    }
}
