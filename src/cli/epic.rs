//! taskboard epic add, update and subtasks

use crate::error::Result;
use crate::item::{Item, ItemId, Kind};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::TaskManager;

use super::find;
use super::view::ItemsReport;

pub fn run_add<S: TaskManager>(
    store: &mut S,
    output: OutputOptions,
    name: String,
    description: String,
) -> Result<()> {
    let created = store.create(&Item::epic(name, description))?;

    let mut human = HumanOutput::new(format!("taskboard epic add: {}", created.id));
    human.push_item_summary(&created);
    human.push_next_step(format!("taskboard sub add {} <name>", created.id));

    emit_success(output, "epic add", &created, Some(&human))
}

pub fn run_update<S: TaskManager>(
    store: &mut S,
    output: OutputOptions,
    id: ItemId,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let mut attributes = find(store, Kind::Epic, id)?;
    if let Some(name) = name {
        attributes.name = name;
    }
    if let Some(description) = description {
        attributes.description = description;
    }

    let updated = store.update(&attributes)?;

    let mut human = HumanOutput::new(format!("taskboard epic update: {}", updated.id));
    human.push_item_summary(&updated);

    emit_success(output, "epic update", &updated, Some(&human))
}

pub fn run_subtasks<S: TaskManager>(store: &S, output: OutputOptions, id: ItemId) -> Result<()> {
    let subtasks = store.epic_subtasks(id)?;

    let mut human = HumanOutput::new(format!(
        "taskboard epic subtasks {id}: {} subtask(s)",
        subtasks.len()
    ));
    for subtask in &subtasks {
        human.push_detail(subtask.to_string());
    }
    if subtasks.is_empty() {
        human.push_next_step(format!("taskboard sub add {id} <name>"));
    }

    emit_success(
        output,
        "epic subtasks",
        &ItemsReport::new(subtasks),
        Some(&human),
    )
}
