mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;

use support::Board;

fn taskboard(board: &Board) -> Command {
    let mut cmd = Command::cargo_bin("taskboard").expect("binary");
    cmd.current_dir(board.path())
        .env_remove("TASKBOARD_FILE")
        .env_remove("TASKBOARD_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn json_output(board: &Board, args: &[&str]) -> Value {
    let output = taskboard(board)
        .arg("--json")
        .args(args)
        .output()
        .expect("run taskboard");
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[test]
fn taskboard_help_works() {
    Command::cargo_bin("taskboard")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("tasks, epics and subtasks"));
}

#[test]
fn subcommand_help_works() {
    for cmd in ["init", "task", "epic", "sub", "prioritized", "history"] {
        Command::cargo_bin("taskboard")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn add_then_list_uses_default_file() {
    let board = Board::new();
    taskboard(&board)
        .args(["task", "add", "Write report", "-d", "quarterly"])
        .assert()
        .success()
        .stdout(contains("taskboard task add: 1"));

    assert!(board.file().exists());
    assert!(board.read().starts_with("1,REGULAR,Write report,NEW,quarterly"));

    taskboard(&board)
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(contains("Write report"));
}

#[test]
fn json_envelope_carries_item() {
    let board = Board::new();
    let value = json_output(
        &board,
        &[
            "task",
            "add",
            "Standup",
            "--start",
            "2024-01-01T09:00:00Z",
            "--duration",
            "15",
        ],
    );
    assert_eq!(value["schema_version"], "taskboard.v1");
    assert_eq!(value["command"], "task add");
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["id"], 1);
    assert_eq!(value["data"]["kind"], "task");
    assert_eq!(value["data"]["duration"], 15);
}

#[test]
fn overlap_exits_with_conflict_code() {
    let board = Board::new();
    taskboard(&board)
        .args(["task", "add", "a", "--start", "2024-01-01T09:00:00Z", "--duration", "60"])
        .assert()
        .success();

    taskboard(&board)
        .args(["task", "add", "b", "--start", "2024-01-01T09:30:00Z", "--duration", "60"])
        .assert()
        .code(3)
        .stderr(contains("intersects with 1"));

    let value = json_output(&board, &["prioritized"]);
    assert_eq!(value["data"]["count"], 1);
}

#[test]
fn unknown_id_exits_with_user_error() {
    let board = Board::new();
    taskboard(&board)
        .args(["--json", "epic", "show", "4"])
        .assert()
        .code(2)
        .stdout(contains("\"kind\": \"user_error\""));
}

#[test]
fn epic_and_subtasks_round_trip_through_file() {
    let board = Board::new();
    taskboard(&board).args(["epic", "add", "Release"]).assert().success();
    taskboard(&board)
        .args(["sub", "add", "1", "Tag build"])
        .assert()
        .success();
    taskboard(&board)
        .args(["sub", "update", "2", "--status", "done"])
        .assert()
        .success();

    let value = json_output(&board, &["epic", "show", "1"]);
    assert_eq!(value["data"]["status"], "DONE");

    let value = json_output(&board, &["epic", "subtasks", "1"]);
    assert_eq!(value["data"]["count"], 1);
    assert_eq!(value["data"]["items"][0]["epic_id"], 1);

    taskboard(&board).args(["epic", "rm", "1"]).assert().success();
    assert!(!board.file().exists());
}

#[test]
fn history_reports_viewed_items() {
    let board = Board::new();
    taskboard(&board).args(["task", "add", "a"]).assert().success();
    taskboard(&board).args(["task", "add", "b"]).assert().success();

    let value = json_output(&board, &["history", "2", "1", "2", "5"]);
    let history: Vec<u64> = value["data"]["history"]
        .as_array()
        .expect("history array")
        .iter()
        .filter_map(|item| item["id"].as_u64())
        .collect();
    assert_eq!(history, vec![1, 2]);
    assert_eq!(value["data"]["not_found"][0], 5);
}

#[test]
fn file_flag_and_config_pick_the_snapshot() {
    let board = Board::new();
    board.write_config("[storage]\npath = \"board.csv\"\n");
    taskboard(&board).args(["task", "add", "a"]).assert().success();
    assert!(board.path().join("board.csv").exists());
    assert!(!board.file().exists());

    let other = board.path().join("other.csv");
    taskboard(&board)
        .arg("--file")
        .arg(&other)
        .args(["task", "add", "b"])
        .assert()
        .success();
    assert!(other.exists());
}

#[test]
fn invalid_config_is_reported() {
    let board = Board::new();
    board.write_config("[storage]\nlock_timeout_ms = 0\n");
    taskboard(&board)
        .args(["task", "list"])
        .assert()
        .code(2)
        .stderr(contains("lock_timeout_ms").and(contains("hint: fix .taskboard.toml")));
}

#[test]
fn init_writes_default_config_once() {
    let board = Board::new();
    let config = board.path().join(".taskboard.toml");
    taskboard(&board)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("taskboard init: wrote"));
    let written = std::fs::read_to_string(&config).expect("config written");
    assert!(written.contains("path = \"tasks.csv\""));
    assert!(!board.file().exists());

    taskboard(&board)
        .arg("init")
        .assert()
        .code(2)
        .stderr(contains("already exists"));

    board.write_config("[storage]\npath = \"board.csv\"\n");
    let value = json_output(&board, &["init", "--force"]);
    assert_eq!(value["command"], "init");
    assert_eq!(value["data"]["replaced"], true);
    assert!(std::fs::read_to_string(&config)
        .expect("config rewritten")
        .contains("tasks.csv"));

    taskboard(&board)
        .args(["task", "add", "a"])
        .assert()
        .success();
    assert!(board.file().exists());
}

#[test]
fn summed_subtask_minutes_out_of_range_is_user_error() {
    let board = Board::new();
    taskboard(&board).args(["epic", "add", "Release"]).assert().success();
    taskboard(&board)
        .args(["sub", "add", "1", "a", "--duration", "153722867280912"])
        .assert()
        .success();
    taskboard(&board)
        .args(["sub", "add", "1", "b", "--duration", "153722867280912"])
        .assert()
        .code(2)
        .stderr(contains("duration of epic 1 out of range"));

    let value = json_output(&board, &["sub", "list"]);
    assert_eq!(value["data"]["count"], 1);
}
