//! Derived epic state.
//!
//! An epic's status, start time and duration are never written by callers.
//! They are recomputed from the epic's subtasks after every subtask create,
//! update and removal.

use chrono::{DateTime, Duration, Utc};

use crate::item::{Item, Status};

/// Status, start and duration derived from a set of subtasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub status: Status,
    pub start_time: Option<DateTime<Utc>>,
    pub duration: Duration,
}

impl Default for Aggregate {
    fn default() -> Self {
        Self {
            status: Status::New,
            start_time: None,
            duration: Duration::zero(),
        }
    }
}

impl Aggregate {
    /// Write the derived fields onto an epic record
    pub fn apply_to(&self, epic: &mut Item) {
        epic.status = self.status;
        epic.start_time = self.start_time;
        epic.duration = self.duration;
    }
}

/// Fold subtasks into an [`Aggregate`].
///
/// Duration is the sum of subtask durations, not the span from the earliest
/// start to the latest end. An unset subtask start orders before every real
/// time, so it makes the epic start unset too. Returns `None` when the summed
/// duration does not fit in a `Duration`.
pub fn aggregate<'a, I>(subtasks: I) -> Option<Aggregate>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut has_new = false;
    let mut has_in_progress = false;
    let mut has_done = false;
    let mut start_time: Option<Option<DateTime<Utc>>> = None;
    let mut duration = Duration::zero();

    for subtask in subtasks {
        match subtask.status {
            Status::New => has_new = true,
            Status::InProgress => has_in_progress = true,
            Status::Done => has_done = true,
        }
        start_time = Some(match start_time {
            Some(current) => current.min(subtask.start_time),
            None => subtask.start_time,
        });
        duration = duration.checked_add(&subtask.duration)?;
    }

    let status = if has_in_progress || (has_new && has_done) {
        Status::InProgress
    } else if has_done {
        Status::Done
    } else {
        Status::New
    };

    Some(Aggregate {
        status,
        start_time: start_time.flatten(),
        duration,
    })
}
