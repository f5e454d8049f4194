//! End-to-end tests for the `wither-gen` binary.
//!
//! Each test builds a throwaway workspace under a temp directory, runs the
//! compiled binary against it, and asserts on both the process output and
//! the files left on disk.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const AUTHOR_SOURCE: &str = r#"#[wither]
pub struct Author {
    name: String,
    nationality: String,
    #[wither(skip)]
    date_of_birth: u32,
}
"#;

/// Create a workspace with a Cargo.toml and the given (relative path,
/// content) source files.
fn workspace_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();

    fs::write(
        dir.path().join("Cargo.toml"),
        r#"[package]
name = "demo"
version = "0.1.0"
edition = "2021"
"#,
    )
    .unwrap();

    for (relative, content) in files {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    dir
}

fn run_in(workspace: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_wither-gen"));
    command.args(args);
    command.args(["--workspace", workspace.to_str().unwrap()]);
    command.output().unwrap()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn generate_inserts_a_region_and_reports_it() {
    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);

    let output = run_in(workspace.path(), &["generate"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Author: inserted"));
    assert!(stdout.contains("1 rewritten"));

    let written = fs::read_to_string(workspace.path().join("src/lib.rs")).unwrap();
    assert!(written.starts_with(AUTHOR_SOURCE.trim_end()));
    assert!(written.contains("// region: wither Author (generated; do not edit by hand)"));
    assert!(written.contains("// endregion: wither Author"));
    assert!(written.contains("pub fn with(&self"));
    assert!(!written.contains("fn date_of_birth(&mut self"));
}

#[test]
fn second_generate_pass_changes_nothing() {
    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);

    let first = run_in(workspace.path(), &["generate"]);
    assert!(first.status.success());
    let after_first = fs::read_to_string(workspace.path().join("src/lib.rs")).unwrap();

    let second = run_in(workspace.path(), &["generate"]);
    assert!(second.status.success());
    let after_second = fs::read_to_string(workspace.path().join("src/lib.rs")).unwrap();

    assert_eq!(after_second, after_first);
    let stdout = stdout_of(&second);
    assert!(stdout.contains("0 rewritten"));
    assert!(stdout.contains("Author: up to date"));
}

#[test]
fn dry_run_reports_without_writing() {
    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);

    let output = run_in(workspace.path(), &["generate", "--dry-run"]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("[DRY RUN"));
    assert!(stdout.contains("1 rewritten"));

    let on_disk = fs::read_to_string(workspace.path().join("src/lib.rs")).unwrap();
    assert_eq!(on_disk, AUTHOR_SOURCE);
}

#[test]
fn diff_flag_prints_the_inserted_lines() {
    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);

    let output = run_in(workspace.path(), &["generate", "--dry-run", "--diff"]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("(regenerated)"));
    assert!(stdout.contains("+// region: wither Author"));
}

#[test]
fn explicit_paths_limit_the_pass_to_those_files() {
    let workspace = workspace_with(&[
        ("src/lib.rs", AUTHOR_SOURCE),
        ("src/other.rs", "#[wither]\nstruct Shelf {\n    label: String,\n}\n"),
    ]);

    let lib_path = workspace.path().join("src/lib.rs");
    let output = run_in(workspace.path(), &["generate", lib_path.to_str().unwrap()]);
    assert!(output.status.success());

    let lib = fs::read_to_string(&lib_path).unwrap();
    let other = fs::read_to_string(workspace.path().join("src/other.rs")).unwrap();
    assert!(lib.contains("// region: wither Author"));
    assert!(!other.contains("// region: wither Shelf"));
}

#[test]
fn excluded_directories_are_not_visited() {
    let workspace = workspace_with(&[
        ("src/lib.rs", AUTHOR_SOURCE),
        ("target/copied.rs", AUTHOR_SOURCE),
    ]);

    let output = run_in(workspace.path(), &["generate"]);
    assert!(output.status.success());

    let copied = fs::read_to_string(workspace.path().join("target/copied.rs")).unwrap();
    assert_eq!(copied, AUTHOR_SOURCE);
}

#[test]
fn config_file_renames_the_markers() {
    let workspace = workspace_with(&[
        (
            "wither.toml",
            "[markers]\nattribute = \"copy_with\"\nskip_argument = \"frozen\"\n",
        ),
        (
            "src/lib.rs",
            r#"#[copy_with]
pub struct Shelf {
    label: String,
    #[copy_with(frozen)]
    slots: u8,
}

#[wither]
pub struct Unrelated {
    x: u8,
}
"#,
        ),
    ]);

    let output = run_in(workspace.path(), &["generate"]);
    assert!(output.status.success());

    let written = fs::read_to_string(workspace.path().join("src/lib.rs")).unwrap();
    assert!(written.contains("// region: wither Shelf"));
    assert!(!written.contains("fn slots(&mut self"));
    // The default attribute no longer marks anything.
    assert!(!written.contains("// region: wither Unrelated"));
}

#[test]
fn broken_unit_fails_the_pass_and_is_left_untouched() {
    let broken = "#[wither]\nstruct Book {\n";
    let workspace = workspace_with(&[("src/lib.rs", broken)]);

    let output = run_in(workspace.path(), &["generate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("pre-existing syntax errors"));

    let on_disk = fs::read_to_string(workspace.path().join("src/lib.rs")).unwrap();
    assert_eq!(on_disk, broken);
}

#[test]
fn check_flags_out_of_date_units_then_passes_after_generate() {
    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);

    let before = run_in(workspace.path(), &["check"]);
    assert_eq!(before.status.code(), Some(1));
    assert!(stdout_of(&before).contains("out of date"));

    let generate = run_in(workspace.path(), &["generate"]);
    assert!(generate.status.success());

    let after = run_in(workspace.path(), &["check"]);
    assert!(after.status.success());
    assert!(stdout_of(&after).contains("All wither regions are up to date."));
}

#[test]
fn check_never_writes() {
    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);

    let _ = run_in(workspace.path(), &["check"]);

    let on_disk = fs::read_to_string(workspace.path().join("src/lib.rs")).unwrap();
    assert_eq!(on_disk, AUTHOR_SOURCE);
}

#[test]
fn check_json_is_machine_readable() {
    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);

    let output = run_in(workspace.path(), &["check", "--format", "json"]);
    assert_eq!(output.status.code(), Some(1));

    let entries: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["status"], "out_of_date");
    assert_eq!(entries[0]["file"], "src/lib.rs");
}

#[test]
fn check_reports_stale_regions_on_clean_units() {
    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);

    let generate = run_in(workspace.path(), &["generate"]);
    assert!(generate.status.success());

    // The declaration loses its marker; its region goes stale.
    let lib_path = workspace.path().join("src/lib.rs");
    let unmarked = fs::read_to_string(&lib_path)
        .unwrap()
        .replace("#[wither]\n", "");
    fs::write(&lib_path, unmarked).unwrap();

    let check = run_in(workspace.path(), &["check"]);
    assert!(check.status.success());
    assert!(stdout_of(&check).contains("stale region: Author"));
}

#[test]
fn list_shows_setters_and_exclusions() {
    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);

    let output = run_in(workspace.path(), &["list"]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Author"));
    assert!(stdout.contains("setters: name, nationality"));
    assert!(stdout.contains("excluded: date_of_birth"));
    assert!(stdout.contains("1 eligible declaration(s)"));
}

#[test]
fn library_pipeline_round_trips_through_disk() {
    use wither_gen::{atomic_write, generate_unit, GeneratorConfig, UnitOutcome};

    let workspace = workspace_with(&[("src/lib.rs", AUTHOR_SOURCE)]);
    let path = workspace.path().join("src/lib.rs");
    let config = GeneratorConfig::default();

    let source = fs::read_to_string(&path).unwrap();
    let (outcome, _) = generate_unit(&source, &config).unwrap();
    let UnitOutcome::Rewritten(text) = outcome else {
        panic!("expected a rewrite");
    };
    atomic_write(&path, &text).unwrap();

    let reread = fs::read_to_string(&path).unwrap();
    assert_eq!(reread, text);

    let (outcome, _) = generate_unit(&reread, &config).unwrap();
    assert_eq!(outcome, UnitOutcome::Unchanged);
}
