#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use taskboard::{Item, ItemId};
use tempfile::TempDir;

/// `hour` hours after 2024-01-01T00:00:00Z (negative hours go earlier)
pub fn at_hour(hour: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
}

/// Task draft occupying `[from, to)` in hours
pub fn timed_task(name: &str, from: i64, to: i64) -> Item {
    Item::task(name, "").with_schedule(at_hour(from), Duration::hours(to - from))
}

/// Subtask draft under `epic_id` occupying `[from, to)` in hours
pub fn timed_subtask(epic_id: ItemId, name: &str, from: i64, to: i64) -> Item {
    Item::subtask(epic_id, name, "").with_schedule(at_hour(from), Duration::hours(to - from))
}

pub fn ids(items: &[Item]) -> Vec<ItemId> {
    items.iter().map(|item| item.id).collect()
}

/// Scratch directory holding one snapshot file
pub struct Board {
    dir: TempDir,
}

impl Board {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self) -> PathBuf {
        self.dir.path().join("tasks.csv")
    }

    pub fn write(&self, contents: &str) -> PathBuf {
        let path = self.file();
        fs::write(&path, contents).expect("write snapshot");
        path
    }

    pub fn read(&self) -> String {
        fs::read_to_string(self.file()).expect("read snapshot")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join(".taskboard.toml");
        fs::write(&path, contents).expect("write config");
        path
    }
}
