// Integration tests for the qgrid binary: --json stdout contract and exit codes.
//
// stdout from --json commands must be exactly one JSON value; human output
// goes to stderr.
//
// Run with: cargo test -p questgrid-cli --test json_contract_tests -- --nocapture

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/class").join(name)
}

/// qgrid with a clean environment: no inherited config, no user config dir.
fn qgrid(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qgrid"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("QUESTGRID_CONFIG")
        .env_remove("RUST_LOG")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

fn run(args: &[&str]) -> Output {
    let home = tempfile::tempdir().unwrap();
    qgrid(home.path()).args(args).output().expect("run qgrid")
}

fn with_config(args: &[&str]) -> Output {
    let config = fixture("questgrid.toml");
    let mut all: Vec<&str> = args.to_vec();
    all.extend(["--config", config.to_str().unwrap()]);
    run(&all)
}

/// Assert stdout is a single, parseable JSON value.
fn assert_single_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        panic!("stdout must be valid JSON.\nParse error: {e}\nstdout:\n{trimmed}")
    })
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ===========================================================================
// qgrid lookup
// ===========================================================================

#[test]
fn lookup_json_resolved() {
    let output = with_config(&["lookup", "elarg", "--json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let val = assert_single_json(&output);
    assert_eq!(val["meta"]["engine_version"], env!("CARGO_PKG_VERSION"));
    assert!(val["meta"]["run_at"].is_string());
    assert_eq!(val["handle"], "elarg");

    let r = &val["resolution"];
    assert_eq!(r["outcome"], "resolved");
    assert_eq!(r["identity"]["handle"], "ElArg");
    assert_eq!(r["progress"]["xp"], 4349);
    assert_eq!(r["progress"]["level"], 11);
    assert_eq!(r["candidate_count"], 2);

    let completed: Vec<&str> = r["quests_completed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["definition"]["label"].as_str().unwrap())
        .collect();
    assert_eq!(completed, vec!["Bohrung", "Feile"]);
    assert_eq!(r["quests_completed"][1]["signal"], "checkbox");
}

#[test]
fn lookup_human_summary_goes_to_stderr() {
    let output = with_config(&["lookup", "Cobol"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty(), "human mode writes nothing to stdout");

    let err = stderr(&output);
    assert!(err.contains("Cobol (Grace Hopper)"), "{err}");
    assert!(err.contains("Lochblech (+25 XP)"), "{err}");
}

#[test]
fn lookup_unknown_handle_exits_3() {
    let output = with_config(&["lookup", "nobody", "--json"]);
    assert_eq!(output.status.code(), Some(3));
    let val = assert_single_json(&output);
    assert_eq!(val["resolution"]["outcome"], "handle_not_found");
    assert!(stderr(&output).contains("not found in sheet 'Gamertags'"));
}

#[test]
fn lookup_without_quest_row_exits_4_with_progress() {
    let output = with_config(&["lookup", "boli", "--json"]);
    assert_eq!(output.status.code(), Some(4));
    let val = assert_single_json(&output);
    assert_eq!(val["resolution"]["outcome"], "name_row_not_found");
    assert_eq!(val["resolution"]["progress"]["xp"], 12);
}

#[test]
fn lookup_zero_timeout_exits_6() {
    let output = with_config(&["lookup", "ElArg", "--timeout", "0", "--json"]);
    assert_eq!(output.status.code(), Some(6));
    let val = assert_single_json(&output);
    assert_eq!(val["resolution"]["outcome"], "timed_out");
    assert_eq!(val["resolution"]["stage"], "fetch_identity");
}

#[test]
fn lookup_missing_sheet_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        fixture("exports/Gamertags.csv"),
        dir.path().join("Gamertags.csv"),
    )
    .unwrap();
    let config = dir.path().join("questgrid.toml");
    std::fs::write(&config, "[source]\nkind = \"csv\"\npath = \".\"\n").unwrap();

    let output = run(&["lookup", "ElArg", "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("sheet 'Quests' not found"), "{}", stderr(&output));
}

#[test]
fn lookup_without_any_config_is_usage_error() {
    let output = run(&["lookup", "ElArg"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("no grid source configured"));
}

#[test]
fn config_from_environment_variable() {
    let home = tempfile::tempdir().unwrap();
    let output = qgrid(home.path())
        .env("QUESTGRID_CONFIG", fixture("questgrid.toml"))
        .args(["lookup", "enigma"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
}

// ===========================================================================
// qgrid candidates
// ===========================================================================

#[test]
fn candidates_json_marks_chosen_listing() {
    let output = with_config(&["candidates", "ElArg", "--json"]);
    assert_eq!(output.status.code(), Some(0));
    let val = assert_single_json(&output);

    let list = val["candidates"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["chosen"], true);
    assert_eq!(list[0]["is_terminal"], false);
    assert_eq!(list[1]["chosen"], false);
    assert_eq!(list[1]["xp"], 9000);
}

#[test]
fn candidates_none_exits_3() {
    let output = with_config(&["candidates", "ghost"]);
    assert_eq!(output.status.code(), Some(3));
}

// ===========================================================================
// qgrid level
// ===========================================================================

#[test]
fn level_json_uses_reference_table() {
    let output = run(&["level", "500", "--json"]);
    assert_eq!(output.status.code(), Some(0));
    let val = assert_single_json(&output);
    assert_eq!(val["xp"], 500);
    assert_eq!(val["level"], 4);
    assert_eq!(val["max_level"], 16);
    assert!(val["meta"].get("config").is_none());
}

#[test]
fn level_past_table_is_max() {
    let output = run(&["level", "25000"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("level 16"));
}

#[test]
fn level_rejects_negative_xp() {
    let output = run(&["level", "-5"]);
    assert_eq!(output.status.code(), Some(2));
}

// ===========================================================================
// qgrid config check
// ===========================================================================

#[test]
fn config_check_accepts_fixture() {
    let config = fixture("questgrid.toml");
    let output = run(&["config", "check", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("ok:"));
}

#[test]
fn config_check_rejects_descending_levels() {
    let config = fixture("invalid.toml");
    let output = run(&["config", "check", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(7));
    assert!(stderr(&output).contains("ascending"));
}

#[test]
fn config_check_rejects_http_source_without_url() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("questgrid.toml");
    std::fs::write(&config, "[source]\nkind = \"http\"\n").unwrap();

    let output = run(&["config", "check", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(7));
    assert!(stderr(&output).contains("source.url"), "{}", stderr(&output));
}

#[test]
fn config_check_missing_file_is_usage_error() {
    let output = run(&["config", "check", "does-not-exist.toml"]);
    assert_eq!(output.status.code(), Some(2));
}
