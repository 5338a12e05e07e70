mod common;

use std::fs;

use assert_cmd::Command;
use common::{BOARD_CSV, TestWorkspace};
use predicates::prelude::*;
use predicates::str::contains;

fn rankboard(workspace: &TestWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("rankboard").expect("binary exists");
    cmd.current_dir(workspace.path())
        .env("RUST_LOG", "off")
        .args(["--prefs", "prefs.json"]);
    cmd
}

#[test]
fn show_renders_summary_table_and_chart() {
    let workspace = TestWorkspace::new();
    let board = workspace.write("board.csv", BOARD_CSV);

    rankboard(&workspace)
        .args(["show", "--theme", "plain", "-i"])
        .arg(&board)
        .assert()
        .success()
        .stdout(contains("Loaded upload: board.csv"))
        .stdout(contains("Total    1,500  (1st: Kim, 1,000)"))
        .stdout(contains("Refresh  2024-03-01 09:00"))
        .stdout(contains("66.7%"))
        .stdout(contains("Showing 2 of 2"))
        .stdout(contains("Top 10 by value"))
        .stdout(contains("\u{1b}[").not());
}

#[test]
fn show_search_keeps_shares_of_the_whole_dataset() {
    let workspace = TestWorkspace::new();
    let board = workspace.write("board.csv", BOARD_CSV);

    rankboard(&workspace)
        .args(["show", "--theme", "plain", "--search", "LEE", "--top", "0", "-i"])
        .arg(&board)
        .assert()
        .success()
        .stdout(contains("33.3%"))
        .stdout(contains("Showing 1 of 2"))
        .stdout(contains("All by value"));
}

#[test]
fn export_writes_rank_name_value_share() {
    let workspace = TestWorkspace::new();
    let board = workspace.write("board.csv", BOARD_CSV);
    let output = workspace.path().join("out.csv");

    rankboard(&workspace)
        .args(["export", "-i"])
        .arg(&board)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let contents = fs::read_to_string(&output).expect("read export");
    assert_eq!(
        contents,
        "rank,name,value,share\n1,Kim,1000,66.7%\n2,Lee,500,33.3%\n"
    );
}

#[test]
fn export_honours_sort_and_output_delimiter() {
    let workspace = TestWorkspace::new();
    let board = workspace.write(
        "board.csv",
        "name,score\nZed,\"1,250.5\"\namy,250\nBob,abc\n",
    );

    rankboard(&workspace)
        .args(["export", "--sort", "name", "--output-delimiter", ";", "-i"])
        .arg(&board)
        .assert()
        .success()
        .stdout(contains(
            "rank;name;value;share\n2;amy;250;16.7%\n3;Bob;0;0.0%\n1;Zed;1250.5;83.3%\n",
        ));
}

#[test]
fn export_rounds_share_ties_up() {
    let workspace = TestWorkspace::new();
    let board = workspace.write("ties.csv", "name,value\nKim,15\nLee,1\n");

    rankboard(&workspace)
        .args(["export", "-i"])
        .arg(&board)
        .assert()
        .success()
        .stdout(contains("1,Kim,15,93.8%\n2,Lee,1,6.3%\n"));
}

#[test]
fn notes_column_does_not_override_value_order() {
    let workspace = TestWorkspace::new();
    let board = workspace.write("notes.csv", "Name,Score,Notes\nKim,1000,\nLee,50,1\n");

    rankboard(&workspace)
        .args(["export", "-i"])
        .arg(&board)
        .assert()
        .success()
        .stdout(contains("1,Kim,1000,95.2%\n2,Lee,50,4.8%\n"));
}

#[test]
fn missing_default_source_shows_empty_board_with_hint() {
    let workspace = TestWorkspace::new();

    rankboard(&workspace)
        .args(["show", "--theme", "plain"])
        .assert()
        .success()
        .stdout(contains("Automatic load of data/YB.xlsx failed"))
        .stdout(contains("Records  0"))
        .stdout(contains("No data to display."));
}

#[test]
fn unreadable_upload_keeps_running_with_hint() {
    let workspace = TestWorkspace::new();

    rankboard(&workspace)
        .args(["show", "--theme", "plain", "-i", "missing.csv"])
        .assert()
        .success()
        .stdout(contains("Could not read the spreadsheet"));

    rankboard(&workspace)
        .args(["export", "-i", "missing.csv", "-o", "out.csv"])
        .assert()
        .success();
    assert!(!workspace.path().join("out.csv").exists());
}

#[test]
fn config_file_overrides_default_source_and_labels() {
    let workspace = TestWorkspace::new();
    workspace.write("league.csv", BOARD_CSV);
    let config = workspace.write(
        "rankboard.yaml",
        "default_source: league.csv\nexport:\n  labels:\n    rank: 순위\n    share: pct\n",
    );

    rankboard(&workspace)
        .arg("-c")
        .arg(&config)
        .arg("export")
        .assert()
        .success()
        .stdout(contains("순위,name,value,pct\n1,Kim,1000,66.7%\n"));
}

#[test]
fn unknown_encoding_is_an_error() {
    let workspace = TestWorkspace::new();
    let board = workspace.write("board.csv", BOARD_CSV);

    rankboard(&workspace)
        .args(["export", "--input-encoding", "klingon", "-i"])
        .arg(&board)
        .assert()
        .failure()
        .stderr(contains("error: Unknown encoding 'klingon'"));
}

#[test]
fn theme_toggles_and_persists() {
    let workspace = TestWorkspace::new();

    rankboard(&workspace)
        .args(["theme", "--show"])
        .assert()
        .success()
        .stdout("dark\n");
    rankboard(&workspace)
        .arg("theme")
        .assert()
        .success()
        .stdout("light\n");
    rankboard(&workspace)
        .args(["theme", "--show"])
        .assert()
        .success()
        .stdout("light\n");
    rankboard(&workspace)
        .args(["theme", "plain"])
        .assert()
        .success()
        .stdout("plain\n");

    let saved = fs::read_to_string(workspace.path().join("prefs.json")).expect("read prefs");
    assert!(saved.contains("\"plain\""));
}

#[test]
fn config_command_prints_defaults() {
    let workspace = TestWorkspace::new();

    rankboard(&workspace)
        .arg("config")
        .assert()
        .success()
        .stdout(contains("default_source: data/YB.xlsx"))
        .stdout(contains("top_n: 10"));
}

#[test]
fn inspect_lists_resolved_columns() {
    let workspace = TestWorkspace::new();
    let board = workspace.write("board.csv", BOARD_CSV);

    rankboard(&workspace)
        .args(["inspect", "-i"])
        .arg(&board)
        .assert()
        .success()
        .stdout(contains("name (#2)"))
        .stdout(contains("value (#3)"))
        .stdout(contains("updated (#4)"));
}
