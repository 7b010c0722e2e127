//! taskboard task/sub add and update
//!
//! Tasks and subtasks share the schedule flags, so one implementation serves
//! both command groups.

use crate::error::Result;
use crate::item::{Item, Kind, Status};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::TaskManager;

use super::{find, group, parse_minutes, parse_start, ScheduleArgs, UpdateArgs};

pub fn run_add<S: TaskManager>(
    store: &mut S,
    output: OutputOptions,
    draft: Item,
    schedule: &ScheduleArgs,
) -> Result<()> {
    let mut draft = draft;
    if let Some(raw) = &schedule.start {
        draft.start_time = Some(parse_start(raw)?);
    }
    if let Some(minutes) = schedule.duration {
        draft.duration = parse_minutes(minutes)?;
    }

    let kind = draft.kind();
    let created = store.create(&draft)?;
    let group = group(kind);

    let mut human = HumanOutput::new(format!("taskboard {group} add: {}", created.id));
    human.push_item_summary(&created);
    if created.start_time.is_some() && !created.is_timed() {
        human.push_warning("zero duration; not part of the prioritized schedule");
    }
    if let Some(epic_id) = created.epic_id() {
        human.push_next_step(format!("taskboard epic show {epic_id}"));
    } else {
        human.push_next_step(format!("taskboard {group} show {}", created.id));
    }

    emit_success(output, &format!("{group} add"), &created, Some(&human))
}

pub fn run_update<S: TaskManager>(
    store: &mut S,
    output: OutputOptions,
    kind: Kind,
    args: &UpdateArgs,
) -> Result<()> {
    let mut attributes = find(store, kind, args.id)?;

    if let Some(name) = &args.name {
        attributes.name = name.clone();
    }
    if let Some(description) = &args.description {
        attributes.description = description.clone();
    }
    if let Some(raw) = &args.status {
        attributes.status = raw.parse::<Status>()?;
    }
    if args.unschedule {
        attributes = attributes.unscheduled();
    } else {
        if let Some(raw) = &args.schedule.start {
            attributes.start_time = Some(parse_start(raw)?);
        }
        if let Some(minutes) = args.schedule.duration {
            attributes.duration = parse_minutes(minutes)?;
        }
    }

    let updated = store.update(&attributes)?;
    let group = group(kind);

    let mut human = HumanOutput::new(format!("taskboard {group} update: {}", updated.id));
    human.push_item_summary(&updated);

    emit_success(output, &format!("{group} update"), &updated, Some(&human))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::MemoryStore;

    const QUIET: OutputOptions = OutputOptions {
        json: false,
        quiet: true,
    };

    fn update(id: u64) -> UpdateArgs {
        UpdateArgs {
            id,
            name: None,
            description: None,
            status: None,
            schedule: ScheduleArgs::default(),
            unschedule: false,
        }
    }

    #[test]
    fn add_applies_schedule_flags() {
        let mut store = MemoryStore::new();
        let schedule = ScheduleArgs {
            start: Some("2024-01-01T09:00:00Z".to_string()),
            duration: Some(45),
        };
        run_add(&mut store, QUIET, Item::task("a", ""), &schedule).unwrap();

        let prioritized = store.prioritized();
        assert_eq!(prioritized.len(), 1);
        assert_eq!(prioritized[0].duration.num_minutes(), 45);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut store = MemoryStore::new();
        store.create(&Item::task("a", "keep")).unwrap();

        let mut args = update(1);
        args.status = Some("in-progress".to_string());
        run_update(&mut store, QUIET, Kind::Task, &args).unwrap();

        let task = find(&store, Kind::Task, 1).unwrap();
        assert_eq!(task.description, "keep");
        assert_eq!(task.status, Status::InProgress);
    }

    #[test]
    fn unschedule_drops_item_from_prioritized() {
        let mut store = MemoryStore::new();
        let schedule = ScheduleArgs {
            start: Some("2024-01-01T09:00:00Z".to_string()),
            duration: Some(30),
        };
        run_add(&mut store, QUIET, Item::task("a", ""), &schedule).unwrap();

        let mut args = update(1);
        args.unschedule = true;
        run_update(&mut store, QUIET, Kind::Task, &args).unwrap();
        assert!(store.prioritized().is_empty());
    }

    #[test]
    fn update_of_wrong_kind_is_not_found() {
        let mut store = MemoryStore::new();
        store.create(&Item::task("a", "")).unwrap();

        let err = run_update(&mut store, QUIET, Kind::Subtask, &update(1)).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
