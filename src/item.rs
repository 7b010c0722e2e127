//! Work items: plain tasks, epics and epic-owned subtasks.
//!
//! All three kinds share one record shape ([`Item`]); what differs is carried
//! by the [`ItemKind`] tag. A subtask's owning epic lives only inside its tag,
//! so it cannot be changed without replacing the variant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identity shared by tasks, epics and subtasks
pub type ItemId = u64;

// =============================================================================
// Status
// =============================================================================

/// Progress of a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    New,
    InProgress,
    Done,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::New => write!(f, "NEW"),
            Status::InProgress => write!(f, "IN_PROGRESS"),
            Status::Done => write!(f, "DONE"),
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "NEW" => Ok(Status::New),
            "IN_PROGRESS" => Ok(Status::InProgress),
            "DONE" => Ok(Status::Done),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid status '{}'. Expected: NEW, IN_PROGRESS, DONE",
                s
            ))),
        }
    }
}

// =============================================================================
// Kind
// =============================================================================

/// Which collection an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Task,
    Epic,
    Subtask,
}

impl Kind {
    /// Tag used for this kind in the snapshot file
    pub fn record_tag(&self) -> &'static str {
        match self {
            Kind::Task => "REGULAR",
            Kind::Epic => "EPIC",
            Kind::Subtask => "SUB",
        }
    }

    pub fn from_record_tag(tag: &str) -> Option<Self> {
        match tag {
            "REGULAR" => Some(Kind::Task),
            "EPIC" => Some(Kind::Epic),
            "SUB" => Some(Kind::Subtask),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Task => write!(f, "task"),
            Kind::Epic => write!(f, "epic"),
            Kind::Subtask => write!(f, "subtask"),
        }
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "task" | "regular" => Ok(Kind::Task),
            "epic" => Ok(Kind::Epic),
            "subtask" | "sub" => Ok(Kind::Subtask),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid kind '{}'. Expected: task, epic, subtask",
                s
            ))),
        }
    }
}

/// Kind tag together with the fields only that kind carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Epic,
    Subtask { epic_id: ItemId },
}

impl ItemKind {
    pub fn kind(&self) -> Kind {
        match self {
            ItemKind::Task => Kind::Task,
            ItemKind::Epic => Kind::Epic,
            ItemKind::Subtask { .. } => Kind::Subtask,
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A task, epic or subtask.
///
/// Values handed out by a store are independent copies; mutating one never
/// reaches the stored record. The same type doubles as the attribute bag for
/// create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub status: Status,
    /// `None` means the item has no start time
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default = "Duration::zero", with = "duration_minutes")]
    pub duration: Duration,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    fn draft(kind: ItemKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            status: Status::New,
            start_time: None,
            duration: Duration::zero(),
            kind,
        }
    }

    /// Attributes for a new plain task
    pub fn task(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::draft(ItemKind::Task, name, description)
    }

    /// Attributes for a new epic
    pub fn epic(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::draft(ItemKind::Epic, name, description)
    }

    /// Attributes for a new subtask of `epic_id`
    pub fn subtask(
        epic_id: ItemId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::draft(ItemKind::Subtask { epic_id }, name, description)
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = id;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_schedule(mut self, start: DateTime<Utc>, duration: Duration) -> Self {
        self.start_time = Some(start);
        self.duration = duration;
        self
    }

    pub fn unscheduled(mut self) -> Self {
        self.start_time = None;
        self.duration = Duration::zero();
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind.kind()
    }

    /// Owning epic, for subtasks
    pub fn epic_id(&self) -> Option<ItemId> {
        match self.kind {
            ItemKind::Subtask { epic_id } => Some(epic_id),
            _ => None,
        }
    }

    /// Start plus duration; `None` while the start time is unset
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
            .and_then(|start| start.checked_add_signed(self.duration))
    }

    /// Whether the item has both a start time and a non-zero duration
    pub fn is_timed(&self) -> bool {
        self.start_time.is_some() && self.duration > Duration::zero()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} \"{}\"", self.kind(), self.id, self.name)?;
        if let (Some(start), Some(end)) = (self.start_time, self.end_time()) {
            write!(f, " [{} - {}]", start.to_rfc3339(), end.to_rfc3339())?;
        }
        Ok(())
    }
}

/// Durations travel as whole minutes
mod duration_minutes {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_minutes())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let minutes = i64::deserialize(deserializer)?;
        Duration::try_minutes(minutes)
            .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {minutes}")))
    }
}
