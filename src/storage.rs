//! Snapshot persistence
//!
//! [`FileBackedStore`] wraps a [`MemoryStore`] and rewrites the whole backing
//! file after every create, update and remove. Nothing is ever appended.
//!
//! # File format
//!
//! One UTF-8 line per item: all tasks, then all epics, then all subtasks.
//!
//! ```text
//! id,kind,name,status,description,epicIdOrEmpty,startEpochSeconds,durationMinutes
//! 1,REGULAR,Write report,NEW,quarterly,,1704099600,90
//! 2,EPIC,Release,IN_PROGRESS,v1.0,,,0
//! 3,SUB,Tag build,IN_PROGRESS,,2,,0
//! ```
//!
//! An empty store deletes the file instead of writing an empty one. The
//! companion `<file>.lock` is never deleted and stays behind, empty, once the
//! snapshot is gone. Loading
//! replays every line through the ordinary create path, so items receive
//! fresh ids; subtasks are re-pointed at the freshly created epics.
//!
//! Start times are stored in whole seconds and durations in whole minutes, so
//! anything finer is truncated on save.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::item::{Item, ItemId, ItemKind, Kind, Status};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::store::{MemoryStore, TaskManager};

const FIELD_SEPARATOR: &str = ",";
const FIELD_COUNT: usize = 8;

/// Knobs for opening a [`FileBackedStore`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long to wait for another owner to release the file
    pub lock_timeout_ms: u64,
    /// Maximum view-history length; `None` keeps every entry
    pub history_limit: Option<usize>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            history_limit: None,
        }
    }
}

/// A [`MemoryStore`] mirrored to a flat file
#[derive(Debug)]
pub struct FileBackedStore {
    store: MemoryStore,
    path: PathBuf,
    _lock: FileLock,
}

impl FileBackedStore {
    /// Open `path` with default options
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path, &StoreOptions::default())
    }

    /// Take ownership of `path` and load whatever it holds.
    ///
    /// A missing file yields an empty store. The file stays locked until the
    /// store is dropped.
    pub fn open_with(path: impl Into<PathBuf>, options: &StoreOptions) -> Result<Self> {
        let path = path.into();
        let lock = FileLock::acquire(lock::lock_path_for(&path), options.lock_timeout_ms)?;
        debug!(lock = %lock.path().display(), "acquired snapshot lock");

        let mut store = match options.history_limit {
            Some(limit) => MemoryStore::with_history_limit(limit),
            None => MemoryStore::new(),
        };

        match fs::read_to_string(&path) {
            Ok(content) => {
                let records = decode_file(&path, &content)?;
                let count = records.len();
                replay(&mut store, &path, records)?;
                info!(path = %path.display(), records = count, "loaded snapshot");
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot yet, starting empty");
            }
            Err(err) => {
                return Err(Error::Load {
                    path,
                    line: 0,
                    reason: err.to_string(),
                });
            }
        }

        Ok(Self {
            store,
            path,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the backing file from the current store contents
    pub fn save(&self) -> Result<()> {
        let save_error = |source: io::Error| {
            warn!(path = %self.path.display(), error = %source, "save failed, file is stale");
            Error::Save {
                path: self.path.clone(),
                source,
            }
        };

        if self.store.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => info!(path = %self.path.display(), "store empty, removed snapshot"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(save_error(err)),
            }
            return Ok(());
        }

        let mut buffer = String::new();
        let mut records = 0;
        for kind in [Kind::Task, Kind::Epic, Kind::Subtask] {
            for item in self.store.list(kind) {
                buffer.push_str(&encode_record(&item));
                buffer.push('\n');
                records += 1;
            }
        }
        lock::write_atomic(&self.path, buffer.as_bytes()).map_err(save_error)?;
        debug!(path = %self.path.display(), records, "saved snapshot");
        Ok(())
    }
}

impl TaskManager for FileBackedStore {
    fn create(&mut self, attributes: &Item) -> Result<Item> {
        check_encodable(attributes)?;
        let item = self.store.create(attributes)?;
        self.save()?;
        Ok(item)
    }

    fn update(&mut self, attributes: &Item) -> Result<Item> {
        check_encodable(attributes)?;
        let item = self.store.update(attributes)?;
        self.save()?;
        Ok(item)
    }

    fn get(&mut self, kind: Kind, id: ItemId) -> Option<Item> {
        self.store.get(kind, id)
    }

    fn list(&self, kind: Kind) -> Vec<Item> {
        self.store.list(kind)
    }

    fn epic_subtasks(&self, epic_id: ItemId) -> Result<Vec<Item>> {
        self.store.epic_subtasks(epic_id)
    }

    fn remove(&mut self, id: ItemId) -> Result<()> {
        self.store.remove(id)?;
        self.save()
    }

    fn remove_all_of(&mut self, kind: Kind) -> Result<()> {
        self.store.remove_all_of(kind)?;
        self.save()
    }

    fn prioritized(&self) -> Vec<Item> {
        self.store.prioritized()
    }

    fn history(&self) -> Vec<Item> {
        self.store.history()
    }

    fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

// =============================================================================
// Line codec
// =============================================================================

/// Render one item as a snapshot line (without the trailing newline)
pub fn encode_record(item: &Item) -> String {
    let epic_id = item.epic_id().map(|id| id.to_string()).unwrap_or_default();
    let start = item
        .start_time
        .map(|start| start.timestamp().to_string())
        .unwrap_or_default();

    [
        item.id.to_string(),
        item.kind().record_tag().to_string(),
        item.name.clone(),
        item.status.to_string(),
        item.description.clone(),
        epic_id,
        start,
        item.duration.num_minutes().to_string(),
    ]
    .join(FIELD_SEPARATOR)
}

/// Parse one snapshot line back into an item carrying the id from the file
pub fn decode_record(line: &str) -> std::result::Result<Item, String> {
    let fields: Vec<&str> = line.splitn(FIELD_COUNT, FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        ));
    }

    let id: ItemId = fields[0]
        .parse()
        .map_err(|_| format!("invalid id '{}'", fields[0]))?;
    let kind = Kind::from_record_tag(fields[1])
        .ok_or_else(|| format!("invalid kind '{}'", fields[1]))?;
    let status = match fields[3] {
        "NEW" => Status::New,
        "IN_PROGRESS" => Status::InProgress,
        "DONE" => Status::Done,
        other => return Err(format!("invalid status '{other}'")),
    };

    let epic_field = fields[5];
    let item_kind = match (kind, epic_field.is_empty()) {
        (Kind::Subtask, false) => ItemKind::Subtask {
            epic_id: epic_field
                .parse()
                .map_err(|_| format!("invalid epic id '{epic_field}'"))?,
        },
        (Kind::Subtask, true) => return Err("subtask without epic id".to_string()),
        (_, false) => return Err(format!("{kind} cannot reference epic '{epic_field}'")),
        (Kind::Task, true) => ItemKind::Task,
        (Kind::Epic, true) => ItemKind::Epic,
    };

    let start_time = match fields[6] {
        "" => None,
        raw => {
            let seconds: i64 = raw
                .parse()
                .map_err(|_| format!("invalid start time '{raw}'"))?;
            Some(
                DateTime::from_timestamp(seconds, 0)
                    .ok_or_else(|| format!("start time out of range '{raw}'"))?,
            )
        }
    };

    let duration = match fields[7] {
        "" => Duration::zero(),
        raw => {
            let minutes: i64 = raw
                .parse()
                .map_err(|_| format!("invalid duration '{raw}'"))?;
            if minutes < 0 {
                return Err(format!("negative duration '{raw}'"));
            }
            Duration::try_minutes(minutes)
                .ok_or_else(|| format!("duration out of range '{raw}'"))?
        }
    };

    Ok(Item {
        id,
        name: fields[2].to_string(),
        description: fields[4].to_string(),
        status,
        start_time,
        duration,
        kind: item_kind,
    })
}

/// Reject text the line format cannot carry
fn check_encodable(item: &Item) -> Result<()> {
    for (field, value) in [("name", &item.name), ("description", &item.description)] {
        if value.contains([',', '\n', '\r']) {
            return Err(Error::InvalidArgument(format!(
                "{field} cannot contain commas or line breaks: {value:?}"
            )));
        }
    }
    Ok(())
}

fn decode_file(path: &Path, content: &str) -> Result<Vec<(usize, Item)>> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (index, raw) in content.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;
        let item = decode_record(line).map_err(|reason| Error::Load {
            path: path.to_path_buf(),
            line: line_no,
            reason,
        })?;
        if !seen.insert(item.id) {
            return Err(Error::Load {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("duplicate id {}", item.id),
            });
        }
        records.push((line_no, item));
    }

    Ok(records)
}

/// Feed decoded records through the ordinary create path.
///
/// Tasks and epics go first, in file order, then subtasks so every owning
/// epic exists by the time its subtasks arrive.
fn replay(store: &mut MemoryStore, path: &Path, records: Vec<(usize, Item)>) -> Result<()> {
    let load_error = |line: usize, err: Error| Error::Load {
        path: path.to_path_buf(),
        line,
        reason: err.to_string(),
    };

    let (subtasks, others): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|(_, record)| record.kind() == Kind::Subtask);

    let mut epic_ids: HashMap<ItemId, ItemId> = HashMap::new();
    for (line, record) in others {
        let created = store.create(&record).map_err(|err| load_error(line, err))?;
        match record.kind {
            ItemKind::Epic => {
                epic_ids.insert(record.id, created.id);
            }
            _ => restore_status(store, created, record.status)
                .map_err(|err| load_error(line, err))?,
        }
    }

    for (line, record) in subtasks {
        let Some(file_epic_id) = record.epic_id() else {
            continue;
        };
        let Some(&epic_id) = epic_ids.get(&file_epic_id) else {
            return Err(Error::Load {
                path: path.to_path_buf(),
                line,
                reason: format!("subtask references unknown epic {file_epic_id}"),
            });
        };
        let draft = Item {
            kind: ItemKind::Subtask { epic_id },
            ..record.clone()
        };
        let created = store.create(&draft).map_err(|err| load_error(line, err))?;
        restore_status(store, created, record.status).map_err(|err| load_error(line, err))?;
    }

    Ok(())
}

fn restore_status(store: &mut MemoryStore, created: Item, status: Status) -> Result<()> {
    if status == Status::New {
        return Ok(());
    }
    store.update(&Item { status, ..created })?;
    Ok(())
}
