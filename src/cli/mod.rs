//! Command-line interface for taskboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Command groups are implemented in their own submodules.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::item::{Item, ItemId, Kind};
use crate::output::OutputOptions;
use crate::storage::FileBackedStore;
use crate::store::TaskManager;

mod epic;
mod init;
mod task;
mod view;

/// taskboard - tasks, epics and subtasks with a chronological schedule
///
/// Items live in a flat snapshot file that is rewritten after every change.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Snapshot file (overrides storage.path from the config)
    #[arg(long, global = true, env = "TASKBOARD_FILE")]
    pub file: Option<PathBuf>,

    /// Configuration file (defaults to ./.taskboard.toml when present)
    #[arg(long, global = true, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default .taskboard.toml (or the --config path)
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Standalone tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Epics and their subtasks
    #[command(subcommand)]
    Epic(EpicCommands),

    /// Subtasks belonging to an epic
    #[command(subcommand)]
    Sub(SubCommands),

    /// Timed tasks and subtasks in start order
    Prioritized,

    /// View items in order, then print the view history
    History {
        /// Ids to view, oldest first
        #[arg(required = true)]
        ids: Vec<ItemId>,
    },
}

/// Start time and duration flags shared by tasks and subtasks
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Start time (RFC 3339, e.g. 2024-01-01T09:00:00Z)
    #[arg(long)]
    pub start: Option<String>,

    /// Duration in minutes
    #[arg(long, allow_negative_numbers = true)]
    pub duration: Option<i64>,
}

/// Fields accepted by `task update` and `sub update`
#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Item id
    pub id: ItemId,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,

    /// New status: new, in_progress, done
    #[arg(long)]
    pub status: Option<String>,

    #[command(flatten)]
    pub schedule: ScheduleArgs,

    /// Clear the start time and duration
    #[arg(long, conflicts_with_all = ["start", "duration"])]
    pub unschedule: bool,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Add {
        name: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Change a task
    Update(UpdateArgs),

    /// List all tasks
    List,

    /// Show one task
    Show { id: ItemId },

    /// Remove a task
    Rm { id: ItemId },

    /// Remove every task
    Clear,
}

/// Epic subcommands
#[derive(Subcommand, Debug)]
pub enum EpicCommands {
    /// Create an epic
    Add {
        name: String,

        /// Epic description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Rename or redescribe an epic
    Update {
        id: ItemId,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List all epics
    List,

    /// Show one epic
    Show { id: ItemId },

    /// Remove an epic and all its subtasks
    Rm { id: ItemId },

    /// Remove every epic (and every subtask)
    Clear,

    /// List the subtasks of an epic
    Subtasks { id: ItemId },
}

/// Subtask subcommands
#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Create a subtask under an epic
    Add {
        epic_id: ItemId,

        name: String,

        /// Subtask description
        #[arg(short, long, default_value = "")]
        description: String,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Change a subtask
    Update(UpdateArgs),

    /// List all subtasks
    List,

    /// Show one subtask
    Show { id: ItemId },

    /// Remove a subtask
    Rm { id: ItemId },

    /// Remove every subtask
    Clear,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let command = match self.command {
            Commands::Init { force } => return init::run(self.config.as_deref(), force, output),
            command => command,
        };
        let mut store = open_store(self.file.as_deref(), self.config.as_deref())?;

        match command {
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    name,
                    description,
                    schedule,
                } => task::run_add(&mut store, output, Item::task(name, description), &schedule),
                TaskCommands::Update(args) => task::run_update(&mut store, output, Kind::Task, &args),
                TaskCommands::List => view::run_list(&store, output, Kind::Task),
                TaskCommands::Show { id } => view::run_show(&mut store, output, Kind::Task, id),
                TaskCommands::Rm { id } => view::run_rm(&mut store, output, Kind::Task, id),
                TaskCommands::Clear => view::run_clear(&mut store, output, Kind::Task),
            },
            Commands::Epic(cmd) => match cmd {
                EpicCommands::Add { name, description } => {
                    epic::run_add(&mut store, output, name, description)
                }
                EpicCommands::Update {
                    id,
                    name,
                    description,
                } => epic::run_update(&mut store, output, id, name, description),
                EpicCommands::List => view::run_list(&store, output, Kind::Epic),
                EpicCommands::Show { id } => view::run_show(&mut store, output, Kind::Epic, id),
                EpicCommands::Rm { id } => view::run_rm(&mut store, output, Kind::Epic, id),
                EpicCommands::Clear => view::run_clear(&mut store, output, Kind::Epic),
                EpicCommands::Subtasks { id } => epic::run_subtasks(&store, output, id),
            },
            Commands::Sub(cmd) => match cmd {
                SubCommands::Add {
                    epic_id,
                    name,
                    description,
                    schedule,
                } => task::run_add(
                    &mut store,
                    output,
                    Item::subtask(epic_id, name, description),
                    &schedule,
                ),
                SubCommands::Update(args) => {
                    task::run_update(&mut store, output, Kind::Subtask, &args)
                }
                SubCommands::List => view::run_list(&store, output, Kind::Subtask),
                SubCommands::Show { id } => view::run_show(&mut store, output, Kind::Subtask, id),
                SubCommands::Rm { id } => view::run_rm(&mut store, output, Kind::Subtask, id),
                SubCommands::Clear => view::run_clear(&mut store, output, Kind::Subtask),
            },
            // Returned above, before the store is opened.
            Commands::Init { .. } => Ok(()),
            Commands::Prioritized => view::run_prioritized(&store, output),
            Commands::History { ids } => view::run_history(&mut store, output, &ids),
        }
    }
}

/// Resolve the snapshot path from flags and config, then open it.
///
/// A relative `storage.path` is taken relative to the directory holding the
/// config file (the working directory when no config was given).
fn open_store(file: Option<&Path>, config: Option<&Path>) -> Result<FileBackedStore> {
    let cwd = std::env::current_dir()?;
    let (config, base) = match config {
        Some(path) => {
            let base = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.clone());
            (Config::load(path)?, base)
        }
        None => (Config::load_from_dir(&cwd)?, cwd),
    };

    let path = match file {
        Some(file) => file.to_path_buf(),
        None => base.join(&config.storage.path),
    };
    debug!(path = %path.display(), "opening store");
    FileBackedStore::open_with(path, &config.store_options())
}

/// Parse an RFC 3339 timestamp into UTC
pub(crate) fn parse_start(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|start| start.with_timezone(&Utc))
        .map_err(|err| Error::InvalidArgument(format!("invalid start time '{raw}': {err}")))
}

pub(crate) fn parse_minutes(minutes: i64) -> Result<Duration> {
    Duration::try_minutes(minutes)
        .ok_or_else(|| Error::InvalidArgument(format!("duration out of range: {minutes}")))
}

/// Current record of `kind` with `id`, without touching the view history
pub(crate) fn find<S: TaskManager>(store: &S, kind: Kind, id: ItemId) -> Result<Item> {
    store
        .list(kind)
        .into_iter()
        .find(|item| item.id == id)
        .ok_or_else(|| Error::not_found(kind, id))
}

/// `task`, `epic` or `sub`: the command group handling `kind`
pub(crate) fn group(kind: Kind) -> &'static str {
    match kind {
        Kind::Task => "task",
        Kind::Epic => "epic",
        Kind::Subtask => "sub",
    }
}
