//! Integration tests for the non-interactive modes (--print, -c/--command)

use std::path::Path;
use std::process::Command;

fn run_in(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let config = dir.join("no-config.toml");
    std::fs::write(&config, "").expect("write empty config");

    let output = Command::new(env!("CARGO_BIN_EXE_gridfill"))
        // Tests must not depend on the user's config or stored grid.
        .arg("--config")
        .arg(&config)
        .arg("--storage-dir")
        .arg(dir)
        .args(args)
        .output()
        .expect("Failed to execute gridfill");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn seed(dir: &Path, key: &str, snapshot: &str) {
    std::fs::write(dir.join(format!("{}.json", key)), snapshot).expect("write snapshot");
}

#[test]
fn test_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_gridfill"))
        .arg("--help")
        .output()
        .expect("Failed to execute gridfill");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--storage-dir"));
}

#[test]
fn test_unknown_option_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_in(dir.path(), &["--bogus"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown option: --bogus"));
}

#[test]
fn test_basic_arithmetic() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_in(dir.path(), &["-c", "=5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_command_reads_stored_grid() {
    let dir = tempfile::tempdir().unwrap();
    seed(
        dir.path(),
        "spreadsheetData",
        r#"{"version":1,"cells":[[{"value":2}],[{"value":4}],[{"value":6,"formula":"=A1+A2"}]]}"#,
    );
    let (stdout, _, code) = run_in(dir.path(), &["--command", "SUM(A1:A3)"]);
    assert_eq!(stdout.trim(), "12");
    assert_eq!(code, 0);
}

#[test]
fn test_command_parse_error_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_in(dir.path(), &["-c", "=1 +"]);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Error: cannot evaluate"));
    assert_eq!(code, 1);
}

#[test]
fn test_print_lists_non_blank_cells() {
    let dir = tempfile::tempdir().unwrap();
    seed(
        dir.path(),
        "budget",
        r#"{"version":1,"cells":[[{"value":"rent"},{"value":1200}],[{"value":""},{"value":0,"formula":"=B1*2"}]]}"#,
    );
    let (stdout, _, code) = run_in(dir.path(), &["--key", "budget", "--print"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "A1\trent\t\nB1\t1200\t\nB2\t2400\t=B1*2\n");
}

#[test]
fn test_print_migrates_legacy_array() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "spreadsheetData", r#"[[1, null], [null, "x"]]"#);
    let (stdout, _, code) = run_in(dir.path(), &["--print"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "A1\t1\t\nB2\tx\t\n");
}

#[test]
fn test_print_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_in(dir.path(), &["--print"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
}
