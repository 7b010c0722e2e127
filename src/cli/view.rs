//! Read and removal commands shared by every item kind, plus the
//! prioritized and history views.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::item::{Item, ItemId, Kind};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::TaskManager;

use super::{find, group};

/// JSON payload for commands returning several items
#[derive(Debug, Serialize)]
pub struct ItemsReport {
    pub count: usize,
    pub items: Vec<Item>,
}

impl ItemsReport {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

#[derive(Serialize)]
struct RemoveReport {
    kind: Kind,
    id: ItemId,
    /// Subtasks removed along with an epic
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cascaded: Vec<ItemId>,
}

#[derive(Serialize)]
struct ClearReport {
    kind: Kind,
    removed: usize,
}

#[derive(Serialize)]
struct HistoryReport {
    viewed: Vec<ItemId>,
    not_found: Vec<ItemId>,
    history: Vec<Item>,
}

fn list_output(header: String, items: &[Item]) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    for item in items {
        human.push_detail(item.to_string());
    }
    human
}

pub fn run_list<S: TaskManager>(store: &S, output: OutputOptions, kind: Kind) -> Result<()> {
    let items = store.list(kind);
    let group = group(kind);

    let mut human = list_output(
        format!("taskboard {group} list: {} item(s)", items.len()),
        &items,
    );
    if items.is_empty() {
        match kind {
            Kind::Subtask => human.push_next_step("taskboard sub add <epic-id> <name>"),
            _ => human.push_next_step(format!("taskboard {group} add <name>")),
        }
    }

    emit_success(
        output,
        &format!("{group} list"),
        &ItemsReport::new(items),
        Some(&human),
    )
}

pub fn run_show<S: TaskManager>(
    store: &mut S,
    output: OutputOptions,
    kind: Kind,
    id: ItemId,
) -> Result<()> {
    let item = store.get(kind, id).ok_or_else(|| Error::not_found(kind, id))?;
    let group = group(kind);

    let mut human = HumanOutput::new(format!("taskboard {group} show: {id}"));
    human.push_item_summary(&item);
    if kind == Kind::Epic {
        for subtask in store.epic_subtasks(id)? {
            human.push_detail(subtask.to_string());
        }
    }

    emit_success(output, &format!("{group} show"), &item, Some(&human))
}

pub fn run_rm<S: TaskManager>(
    store: &mut S,
    output: OutputOptions,
    kind: Kind,
    id: ItemId,
) -> Result<()> {
    // Removal by bare id would silently drop an item of another kind.
    find(store, kind, id)?;
    let cascaded = match kind {
        Kind::Epic => store
            .epic_subtasks(id)?
            .into_iter()
            .map(|subtask| subtask.id)
            .collect(),
        _ => Vec::new(),
    };
    store.remove(id)?;
    let group = group(kind);

    let mut human = HumanOutput::new(format!("taskboard {group} rm: {id}"));
    if !cascaded.is_empty() {
        human.push_summary("subtasks removed", cascaded.len().to_string());
    }

    emit_success(
        output,
        &format!("{group} rm"),
        &RemoveReport { kind, id, cascaded },
        Some(&human),
    )
}

pub fn run_clear<S: TaskManager>(store: &mut S, output: OutputOptions, kind: Kind) -> Result<()> {
    let removed = store.list(kind).len();
    store.remove_all_of(kind)?;
    let group = group(kind);

    let mut human = HumanOutput::new(format!("taskboard {group} clear: {removed} removed"));
    if kind == Kind::Epic {
        human.push_warning("subtasks of removed epics were removed too");
    }

    emit_success(
        output,
        &format!("{group} clear"),
        &ClearReport { kind, removed },
        Some(&human),
    )
}

pub fn run_prioritized<S: TaskManager>(store: &S, output: OutputOptions) -> Result<()> {
    let items = store.prioritized();

    let human = list_output(
        format!("taskboard prioritized: {} timed item(s)", items.len()),
        &items,
    );

    emit_success(output, "prioritized", &ItemsReport::new(items), Some(&human))
}

/// View `ids` in order (each id is looked up as a task, an epic, then a
/// subtask) and report the resulting history.
pub fn run_history<S: TaskManager>(
    store: &mut S,
    output: OutputOptions,
    ids: &[ItemId],
) -> Result<()> {
    let mut viewed = Vec::new();
    let mut not_found = Vec::new();
    for &id in ids {
        let hit = [Kind::Task, Kind::Epic, Kind::Subtask]
            .into_iter()
            .find_map(|kind| store.get(kind, id));
        match hit {
            Some(_) => viewed.push(id),
            None => not_found.push(id),
        }
    }
    let history = store.history();

    let mut human = list_output(
        format!("taskboard history: {} item(s)", history.len()),
        &history,
    );
    for id in &not_found {
        human.push_warning(format!("no item with id {id}"));
    }

    emit_success(
        output,
        "history",
        &HistoryReport {
            viewed,
            not_found,
            history,
        },
        Some(&human),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const QUIET: OutputOptions = OutputOptions {
        json: false,
        quiet: true,
    };

    #[test]
    fn rm_checks_kind_before_removing() {
        let mut store = MemoryStore::new();
        store.create(&Item::task("a", "")).unwrap();

        let err = run_rm(&mut store, QUIET, Kind::Epic, 1).unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: Kind::Epic, id: 1 }));
        assert_eq!(store.list(Kind::Task).len(), 1);

        run_rm(&mut store, QUIET, Kind::Task, 1).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn history_views_ids_in_order() {
        let mut store = MemoryStore::new();
        store.create(&Item::task("a", "")).unwrap();
        store.create(&Item::epic("e", "")).unwrap();
        store.create(&Item::subtask(2, "s", "")).unwrap();

        run_history(&mut store, QUIET, &[3, 1, 9, 2, 3]).unwrap();
        let ids: Vec<ItemId> = store.history().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn show_unknown_is_not_found() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            run_show(&mut store, QUIET, Kind::Task, 5),
            Err(Error::NotFound { .. })
        ));
    }
}
