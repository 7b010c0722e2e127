//! In-memory item store
//!
//! [`MemoryStore`] owns the canonical records of every task, epic and
//! subtask, together with the id allocator, view history and prioritization
//! index derived from them. Everything crossing the public boundary is a copy.
//!
//! The store does no locking of its own; callers sharing one instance across
//! threads must serialize access (for example behind a `Mutex`).

use std::collections::BTreeMap;
use std::iter;

use chrono::Duration;
use tracing::{debug, info};

use crate::epic::{self, Aggregate};
use crate::error::{Error, Result};
use crate::history::History;
use crate::id::IdAllocator;
use crate::item::{Item, ItemId, ItemKind, Kind, Status};
use crate::priority::PriorityIndex;

/// Operations every store flavour offers
///
/// Read operations return independent copies. `get` records the item in the
/// view history when found.
pub trait TaskManager {
    /// Create an item of `attributes.kind`; the id in `attributes` is ignored
    fn create(&mut self, attributes: &Item) -> Result<Item>;

    /// Copy the mutable fields of `attributes` onto the record `attributes.id`
    fn update(&mut self, attributes: &Item) -> Result<Item>;

    fn get(&mut self, kind: Kind, id: ItemId) -> Option<Item>;

    fn list(&self, kind: Kind) -> Vec<Item>;

    /// Subtasks owned by `epic_id`
    fn epic_subtasks(&self, epic_id: ItemId) -> Result<Vec<Item>>;

    /// Remove whatever item holds `id`; unknown ids are ignored
    fn remove(&mut self, id: ItemId) -> Result<()>;

    /// Remove every item of `kind`, one at a time
    fn remove_all_of(&mut self, kind: Kind) -> Result<()>;

    /// Timed tasks and subtasks in ascending start order
    fn prioritized(&self) -> Vec<Item>;

    /// Viewed items, oldest view first
    fn history(&self) -> Vec<Item>;

    fn is_empty(&self) -> bool;

    /// Remove every task and epic (and through them every subtask)
    fn remove_all(&mut self) -> Result<()> {
        self.remove_all_of(Kind::Task)?;
        self.remove_all_of(Kind::Epic)
    }
}

/// The canonical in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    ids: IdAllocator,
    tasks: BTreeMap<ItemId, Item>,
    epics: BTreeMap<ItemId, Item>,
    subtasks: BTreeMap<ItemId, Item>,
    history: History,
    prioritized: PriorityIndex,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose view history keeps at most `limit` entries
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            history: History::with_limit(limit),
            ..Self::default()
        }
    }

    /// Highest id handed out so far
    pub fn last_id(&self) -> ItemId {
        self.ids.last()
    }

    fn collection(&self, kind: Kind) -> &BTreeMap<ItemId, Item> {
        match kind {
            Kind::Task => &self.tasks,
            Kind::Epic => &self.epics,
            Kind::Subtask => &self.subtasks,
        }
    }

    fn create_task(&mut self, attributes: &Item) -> Result<Item> {
        validate_schedule(attributes)?;
        self.check_intersection(attributes, None)?;

        let task = Item {
            id: self.ids.next_id(),
            status: Status::New,
            kind: ItemKind::Task,
            ..attributes.clone()
        };
        self.prioritized.upsert(&task);
        self.tasks.insert(task.id, task.clone());
        debug!(id = task.id, name = %task.name, "created task");
        Ok(task)
    }

    fn create_epic(&mut self, attributes: &Item) -> Result<Item> {
        let mut epic = Item::epic(attributes.name.clone(), attributes.description.clone());
        epic.id = self.ids.next_id();
        self.epics.insert(epic.id, epic.clone());
        debug!(id = epic.id, name = %epic.name, "created epic");
        Ok(epic)
    }

    fn create_subtask(&mut self, attributes: &Item, epic_id: ItemId) -> Result<Item> {
        if !self.epics.contains_key(&epic_id) {
            return Err(Error::not_found(Kind::Epic, epic_id));
        }
        validate_schedule(attributes)?;
        self.check_intersection(attributes, None)?;

        let mut subtask = Item {
            id: 0,
            status: Status::New,
            kind: ItemKind::Subtask { epic_id },
            ..attributes.clone()
        };
        let aggregate = self.epic_aggregate(epic_id, &subtask)?;

        subtask.id = self.ids.next_id();
        self.prioritized.upsert(&subtask);
        self.subtasks.insert(subtask.id, subtask.clone());
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            aggregate.apply_to(epic);
        }
        debug!(id = subtask.id, epic_id, name = %subtask.name, "created subtask");
        Ok(subtask)
    }

    fn update_scheduled(&mut self, kind: Kind, attributes: &Item) -> Result<Item> {
        let Some(current) = self.collection(kind).get(&attributes.id) else {
            return Err(Error::not_found(kind, attributes.id));
        };
        validate_schedule(attributes)?;
        self.check_intersection(attributes, Some(attributes.id))?;

        let updated = Item {
            name: attributes.name.clone(),
            description: attributes.description.clone(),
            status: attributes.status,
            start_time: attributes.start_time,
            duration: attributes.duration,
            ..current.clone()
        };
        let aggregate = match updated.epic_id() {
            Some(epic_id) => Some((epic_id, self.epic_aggregate(epic_id, &updated)?)),
            None => None,
        };

        self.prioritized.upsert(&updated);
        match kind {
            Kind::Task => self.tasks.insert(updated.id, updated.clone()),
            _ => self.subtasks.insert(updated.id, updated.clone()),
        };
        if let Some((epic_id, aggregate)) = aggregate {
            if let Some(epic) = self.epics.get_mut(&epic_id) {
                aggregate.apply_to(epic);
            }
        }
        debug!(id = updated.id, %kind, "updated item");
        Ok(updated)
    }

    fn update_epic(&mut self, attributes: &Item) -> Result<Item> {
        let Some(epic) = self.epics.get_mut(&attributes.id) else {
            return Err(Error::not_found(Kind::Epic, attributes.id));
        };
        epic.name = attributes.name.clone();
        epic.description = attributes.description.clone();
        debug!(id = epic.id, "updated epic");
        Ok(epic.clone())
    }

    fn check_intersection(&self, candidate: &Item, candidate_id: Option<ItemId>) -> Result<()> {
        let pending = Item {
            id: candidate_id.unwrap_or(0),
            ..candidate.clone()
        };
        let Some(existing_id) = self.prioritized.find_intersection(&pending) else {
            return Ok(());
        };
        let existing_name = self
            .tasks
            .get(&existing_id)
            .or_else(|| self.subtasks.get(&existing_id))
            .map(|item| item.name.clone())
            .unwrap_or_default();
        info!(
            candidate = %candidate.name,
            existing_id,
            "rejected overlapping schedule"
        );
        Err(Error::Overlap {
            candidate_id,
            candidate_name: candidate.name.clone(),
            existing_id,
            existing_name,
        })
    }

    /// Aggregate of `epic_id` once `pending` is stored, replacing any record
    /// with the same id
    fn epic_aggregate(&self, epic_id: ItemId, pending: &Item) -> Result<Aggregate> {
        let others = self
            .subtasks
            .values()
            .filter(|subtask| subtask.epic_id() == Some(epic_id) && subtask.id != pending.id);
        epic::aggregate(others.chain(iter::once(pending)))
            .ok_or_else(|| epic_out_of_range(epic_id))
    }

    fn refresh_epic(&mut self, epic_id: ItemId) -> Result<()> {
        let aggregate = epic::aggregate(
            self.subtasks
                .values()
                .filter(|subtask| subtask.epic_id() == Some(epic_id)),
        )
        .ok_or_else(|| epic_out_of_range(epic_id))?;
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            aggregate.apply_to(epic);
        }
        Ok(())
    }

    fn owned_subtask_ids(&self, epic_id: ItemId) -> Vec<ItemId> {
        self.subtasks
            .values()
            .filter(|subtask| subtask.epic_id() == Some(epic_id))
            .map(|subtask| subtask.id)
            .collect()
    }
}

impl TaskManager for MemoryStore {
    fn create(&mut self, attributes: &Item) -> Result<Item> {
        match attributes.kind {
            ItemKind::Task => self.create_task(attributes),
            ItemKind::Epic => self.create_epic(attributes),
            ItemKind::Subtask { epic_id } => self.create_subtask(attributes, epic_id),
        }
    }

    fn update(&mut self, attributes: &Item) -> Result<Item> {
        match attributes.kind {
            ItemKind::Task => self.update_scheduled(Kind::Task, attributes),
            ItemKind::Epic => self.update_epic(attributes),
            ItemKind::Subtask { .. } => self.update_scheduled(Kind::Subtask, attributes),
        }
    }

    fn get(&mut self, kind: Kind, id: ItemId) -> Option<Item> {
        let item = self.collection(kind).get(&id).cloned()?;
        self.history.record(&item);
        Some(item)
    }

    fn list(&self, kind: Kind) -> Vec<Item> {
        self.collection(kind).values().cloned().collect()
    }

    fn epic_subtasks(&self, epic_id: ItemId) -> Result<Vec<Item>> {
        if !self.epics.contains_key(&epic_id) {
            return Err(Error::not_found(Kind::Epic, epic_id));
        }
        Ok(self
            .subtasks
            .values()
            .filter(|subtask| subtask.epic_id() == Some(epic_id))
            .cloned()
            .collect())
    }

    fn remove(&mut self, id: ItemId) -> Result<()> {
        if self.tasks.remove(&id).is_some() {
            self.history.forget(id);
            self.prioritized.remove(id);
            debug!(id, "removed task");
            return Ok(());
        }

        if self.epics.contains_key(&id) {
            let owned = self.owned_subtask_ids(id);
            for subtask_id in &owned {
                self.subtasks.remove(subtask_id);
                self.history.forget(*subtask_id);
                self.prioritized.remove(*subtask_id);
            }
            self.epics.remove(&id);
            self.history.forget(id);
            debug!(id, cascaded = owned.len(), "removed epic");
            return Ok(());
        }

        if let Some(subtask) = self.subtasks.remove(&id) {
            self.history.forget(id);
            self.prioritized.remove(id);
            if let Some(epic_id) = subtask.epic_id() {
                self.refresh_epic(epic_id)?;
            }
            debug!(id, "removed subtask");
        }
        Ok(())
    }

    fn remove_all_of(&mut self, kind: Kind) -> Result<()> {
        let ids: Vec<ItemId> = self.collection(kind).keys().copied().collect();
        for id in ids {
            self.remove(id)?;
        }
        Ok(())
    }

    fn prioritized(&self) -> Vec<Item> {
        self.prioritized
            .ids()
            .filter_map(|id| self.tasks.get(&id).or_else(|| self.subtasks.get(&id)))
            .cloned()
            .collect()
    }

    fn history(&self) -> Vec<Item> {
        self.history.snapshot()
    }

    fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.epics.is_empty()
    }
}

fn epic_out_of_range(epic_id: ItemId) -> Error {
    Error::InvalidArgument(format!("duration of epic {epic_id} out of range"))
}

fn validate_schedule(attributes: &Item) -> Result<()> {
    if attributes.duration < Duration::zero() {
        return Err(Error::InvalidArgument(format!(
            "duration of \"{}\" cannot be negative",
            attributes.name
        )));
    }
    if attributes.start_time.is_some() && attributes.end_time().is_none() {
        return Err(Error::InvalidArgument(format!(
            "schedule of \"{}\" ends out of range",
            attributes.name
        )));
    }
    Ok(())
}
