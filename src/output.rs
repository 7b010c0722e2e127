//! Shared output formatting for taskboard CLI commands.
//!
//! Every command prints either a human report or, with `--json`, one
//! envelope object carrying `schema_version`, `command` and `status` plus
//! `data` on success or `error` on failure.

use std::fmt;

use serde::Serialize;

use crate::cli::group;
use crate::error::{exit_codes, Error, Result};
use crate::item::Item;

pub const SCHEMA_VERSION: &str = "taskboard.v1";

/// Global options that consume the following argument
const VALUE_FLAGS: [&str; 2] = ["--file", "--config"];

/// Commands whose first positional argument names a subcommand
const COMMAND_GROUPS: [&str; 3] = ["task", "epic", "sub"];

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human report: a header line, then `Summary`, `Details`, `Warnings` and
/// `Next steps` sections, each omitted when empty
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }

    /// Summary lines describing every field of one item
    pub fn push_item_summary(&mut self, item: &Item) {
        self.push_summary("id", item.id.to_string());
        self.push_summary("kind", item.kind().to_string());
        if let Some(epic_id) = item.epic_id() {
            self.push_summary("epic", epic_id.to_string());
        }
        self.push_summary("name", item.name.clone());
        if !item.description.is_empty() {
            self.push_summary("description", item.description.clone());
        }
        self.push_summary("status", item.status.to_string());
        if let Some(start) = item.start_time {
            self.push_summary("start", start.to_rfc3339());
        }
        if let Some(end) = item.end_time() {
            self.push_summary("end", end.to_rfc3339());
        }
        self.push_summary("duration", format!("{}m", item.duration.num_minutes()));
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;

        if !self.summary.is_empty() {
            f.write_str("\n\nSummary:")?;
            for (key, value) in &self.summary {
                if value.is_empty() {
                    write!(f, "\n- {key}")?;
                } else {
                    write!(f, "\n- {key}: {value}")?;
                }
            }
        }

        let sections = [
            ("Details", &self.details),
            ("Warnings", &self.warnings),
            ("Next steps", &self.next_steps),
        ];
        for (title, lines) in sections {
            if lines.is_empty() {
                continue;
            }
            write!(f, "\n\n{title}:")?;
            for line in lines {
                write!(f, "\n- {line}")?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl<T: Serialize> Envelope<'_, T> {
    fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        return Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: Some(data),
            error: None,
            warnings: human.map(|h| h.warnings.clone()).unwrap_or_default(),
            next_steps: human.map(|h| h.next_steps.clone()).unwrap_or_default(),
        }
        .print();
    }

    if let Some(human) = human.filter(|_| !options.quiet) {
        println!("{human}");
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if !json {
        eprintln!("error: {err}");
        if let Some(hint) = hint {
            eprintln!("hint: {hint}");
        }
        return Ok(());
    }

    Envelope::<()> {
        schema_version: SCHEMA_VERSION,
        command,
        status: "error",
        data: None,
        error: Some(ErrorBody {
            message: err.to_string(),
            code: err.exit_code(),
            kind: error_kind(err),
            details: err.details(),
        }),
        warnings: Vec::new(),
        next_steps: hint.into_iter().collect(),
    }
    .print()
}

pub fn format_human(output: &HumanOutput) -> String {
    output.to_string()
}

pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

/// Command label (`task add`, `prioritized`, ...) for an argument list
/// that excludes the program name.
pub fn infer_command_name<I>(args: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut words: Vec<String> = Vec::with_capacity(2);
    let mut skip_value = false;

    for arg in args {
        if std::mem::take(&mut skip_value) {
            continue;
        }
        if arg.starts_with('-') {
            skip_value = VALUE_FLAGS.contains(&arg.as_str());
            continue;
        }
        words.push(arg);
        if words.len() == 2 || !COMMAND_GROUPS.contains(&words[0].as_str()) {
            break;
        }
    }

    if words.is_empty() {
        "taskboard".to_string()
    } else {
        words.join(" ")
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        exit_codes::CONFLICT => "schedule_conflict",
        _ => "operation_failed",
    }
}

/// One follow-up command or action for a failed invocation
fn error_hint(err: &Error) -> Option<String> {
    let hint = match err {
        Error::NotFound { kind, .. } => format!("taskboard {} list", group(*kind)),
        Error::Overlap { .. } => "taskboard prioritized".to_string(),
        Error::LockFailed(_) => "wait for the other taskboard process to finish".to_string(),
        Error::InvalidConfig(_) => "fix .taskboard.toml then retry".to_string(),
        _ => return None,
    };
    Some(hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_name_includes_group_subcommand() {
        assert_eq!(infer_command_name(args(&["task", "add", "x"])), "task add");
        assert_eq!(infer_command_name(args(&["--json", "epic", "list"])), "epic list");
        assert_eq!(
            infer_command_name(args(&["--file", "board.csv", "sub", "rm", "3"])),
            "sub rm"
        );
        assert_eq!(infer_command_name(args(&["prioritized"])), "prioritized");
        assert_eq!(
            infer_command_name(args(&["task", "--config", "cfg.toml", "show", "1"])),
            "task show"
        );
        assert_eq!(infer_command_name(args(&["init", "--force"])), "init");
        assert_eq!(infer_command_name(args(&[])), "taskboard");
    }

    #[test]
    fn human_output_sections() {
        let mut human = HumanOutput::new("taskboard task add: 1");
        human.push_summary("name", "Write");
        human.push_warning("careful");
        human.push_next_step("taskboard task list");

        let text = format_human(&human);
        assert!(text.starts_with("taskboard task add: 1"));
        assert!(text.contains("Summary:\n- name: Write"));
        assert!(text.contains("Warnings:\n- careful"));
        assert!(text.contains("Next steps:\n- taskboard task list"));
        assert!(!text.contains("Details:"));
    }

    #[test]
    fn hints_point_at_the_right_group() {
        use crate::item::Kind;

        let missing = Error::not_found(Kind::Subtask, 4);
        assert_eq!(error_hint(&missing).as_deref(), Some("taskboard sub list"));
        assert_eq!(error_kind(&missing), "user_error");
        assert_eq!(error_hint(&Error::InvalidArgument("x".to_string())), None);
    }

    #[test]
    fn item_summary_lists_schedule() {
        use chrono::{Duration, TimeZone, Utc};

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let item = Item::subtask(2, "s", "")
            .with_id(3)
            .with_schedule(start, Duration::minutes(30));
        let mut human = HumanOutput::new("sub");
        human.push_item_summary(&item);

        let text = format_human(&human);
        assert!(text.contains("- epic: 2"));
        assert!(text.contains("- end: 2024-01-01T09:30:00+00:00"));
        assert!(text.contains("- duration: 30m"));
        assert!(!text.contains("- description"));
    }
}
