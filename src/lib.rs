//! taskboard - task tracking library
//!
//! This library provides the core functionality for the taskboard CLI:
//! an in-memory store of tasks, epics and subtasks, a view history, a
//! chronological schedule with overlap detection, and a flat-file snapshot.
//!
//! # Core Concepts
//!
//! - **Items**: tasks, epics and subtasks sharing one id space
//! - **Epics**: status, start and duration derived from their subtasks
//! - **History**: most recently viewed items, each at most once
//! - **Prioritized**: timed items ordered by start, never overlapping
//! - **Snapshot**: the whole store rewritten to one file after every change
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.taskboard.toml`
//! - `epic`: Derivation of epic fields from subtasks
//! - `error`: Error types and result aliases
//! - `history`: View history
//! - `id`: Id allocation
//! - `item`: Item records and kinds
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output for the CLI
//! - `priority`: Start-ordered index and overlap rule
//! - `storage`: File-backed store and line codec
//! - `store`: The `TaskManager` contract and in-memory store

pub mod cli;
pub mod config;
pub mod epic;
pub mod error;
pub mod history;
pub mod id;
pub mod item;
pub mod lock;
pub mod output;
pub mod priority;
pub mod storage;
pub mod store;

pub use error::{Error, Result};
pub use item::{Item, ItemId, ItemKind, Kind, Status};
pub use storage::{FileBackedStore, StoreOptions};
pub use store::{MemoryStore, TaskManager};
