//! taskboard init: write a default `.taskboard.toml`

use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(serde::Serialize)]
struct InitReport {
    config: PathBuf,
    storage: PathBuf,
    replaced: bool,
}

pub fn run(config: Option<&Path>, force: bool, output: OutputOptions) -> Result<()> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?.join(CONFIG_FILE),
    };

    let replaced = path.exists();
    if replaced && !force {
        return Err(Error::InvalidArgument(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let defaults = Config::default();
    defaults.save(&path)?;

    let report = InitReport {
        config: path.clone(),
        storage: defaults.storage.path.clone(),
        replaced,
    };

    let verb = if replaced { "rewrote" } else { "wrote" };
    let mut human = HumanOutput::new(format!("taskboard init: {verb} {}", path.display()));
    human.push_summary("storage", defaults.storage.path.display().to_string());
    human.push_next_step("taskboard task add <name>");

    emit_success(output, "init", &report, Some(&human))
}
