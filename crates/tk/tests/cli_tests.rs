//! Integration tests for the tk CLI.
//!
//! These tests drive the built binary against temporary ticket directories.

use rstest::{fixture, rstest};
use std::fs;
use std::io::Write;
use std::process::Stdio;
use tempfile::TempDir;

mod common;
use common::{read_record, run_tk_in_dir, tk_command, tk_err, tk_ok, write_record};

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// a-1111 depends on b-2222, which depends on c-3333
#[fixture]
fn chain_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    write_record(temp.path(), "a-1111", "open", &["b-2222"], "Ship it");
    write_record(temp.path(), "b-2222", "open", &["c-3333"], "Build");
    write_record(temp.path(), "c-3333", "open", &[], "Design");
    temp
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[rstest]
fn test_cli_help_lists_commands(temp_dir: TempDir) {
    let stdout = tk_ok(temp_dir.path(), &["--help"]);
    assert!(stdout.contains("Usage:"));
    for command in ["new", "show", "list", "dep", "undep", "link", "prune", "clean"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[rstest]
fn test_cli_no_args_succeeds(temp_dir: TempDir) {
    let stdout = tk_ok(temp_dir.path(), &[]);
    assert!(stdout.contains("--help"));
}

// ============================================================================
// Creating and showing tickets
// ============================================================================

#[rstest]
fn test_new_creates_record(temp_dir: TempDir) {
    fs::create_dir_all(temp_dir.path().join(".tickets")).unwrap();
    fs::write(
        temp_dir.path().join(".tickets/config.yaml"),
        "id-prefix: nw\n",
    )
    .unwrap();

    let id = tk_ok(
        temp_dir.path(),
        &[
            "new",
            "Write",
            "the",
            "parser",
            "-d",
            "Some context",
            "--design",
            "Recursive descent",
            "-p",
            "1",
            "-t",
            "feature",
            "-a",
            "alice",
        ],
    );
    let id = id.trim();

    assert!(id.starts_with("nw-"), "unexpected id {id}");
    let record = read_record(temp_dir.path(), id);
    assert!(record.starts_with(&format!("---\nid: {id}\nstatus: open\ndeps: []\nlinks: []\n")));
    assert!(record.contains("type: feature\npriority: 1\nassignee: alice\n"));
    assert!(record.ends_with("# Write the parser\n\nSome context\n\n## Design\n\nRecursive descent\n"));
}

#[rstest]
fn test_new_without_title_is_untitled(temp_dir: TempDir) {
    let id = tk_ok(temp_dir.path(), &["new", "-a", "bob"]);
    let record = read_record(temp_dir.path(), id.trim());
    assert!(record.contains("# Untitled\n"));
}

#[rstest]
fn test_new_quotes_header_values(temp_dir: TempDir) {
    let id = tk_ok(
        temp_dir.path(),
        &["new", "Quoting", "-a", "@alice", "--external-ref", "gh #12"],
    );
    let id = id.trim();

    let record = read_record(temp_dir.path(), id);
    assert!(record.contains("assignee: '@alice'\nexternal-ref: 'gh #12'\n"));

    let stdout = tk_ok(temp_dir.path(), &["--json", "show", id]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["assignee"], "@alice");
    assert_eq!(value["external-ref"], "gh #12");
}

#[rstest]
fn test_new_rejects_multiline_assignee(temp_dir: TempDir) {
    let stderr = tk_err(temp_dir.path(), &["new", "X", "-a", "alice\nstatus: closed"]);
    assert!(stderr.contains("newline"));
    assert!(!temp_dir.path().join(".tickets").exists());
}

#[rstest]
fn test_show_lists_relationships(chain_dir: TempDir) {
    let stdout = tk_ok(chain_dir.path(), &["show", "b-2222"]);

    assert!(stdout.starts_with("---\nid: b-2222\nstatus: open\ndeps: [c-3333]\n"));
    assert!(stdout.contains("# Build\n"));
    assert!(stdout.contains("## Blockers\n\n- c-3333 [open] Design\n"));
    assert!(stdout.contains("## Blocking\n\n- a-1111 [open] Ship it\n"));
}

#[rstest]
fn test_show_json(chain_dir: TempDir) {
    let stdout = tk_ok(chain_dir.path(), &["--json", "show", "a-1111"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["id"], "a-1111");
    assert_eq!(value["deps"][0], "b-2222");
}

// ============================================================================
// Partial IDs
// ============================================================================

#[rstest]
fn test_partial_id_resolves(chain_dir: TempDir) {
    let stdout = tk_ok(chain_dir.path(), &["close", "333"]);
    assert_eq!(stdout, "Updated c-3333 -> closed\n");
    assert!(read_record(chain_dir.path(), "c-3333").contains("status: closed\n"));
}

#[rstest]
fn test_ambiguous_id_fails(chain_dir: TempDir) {
    let stderr = tk_err(chain_dir.path(), &["show", "-"]);
    assert!(stderr.contains("ambiguous ID '-'"), "stderr: {stderr}");
}

#[rstest]
fn test_unknown_id_fails(chain_dir: TempDir) {
    let stderr = tk_err(chain_dir.path(), &["show", "zzz"]);
    assert!(stderr.contains("ticket 'zzz' not found"), "stderr: {stderr}");
}

// ============================================================================
// Listing
// ============================================================================

#[rstest]
fn test_list_sorted_by_id(chain_dir: TempDir) {
    let stdout = tk_ok(chain_dir.path(), &["ls"]);
    assert_eq!(
        stdout,
        "a-1111   [open] - Ship it <- [b-2222]\n\
         b-2222   [open] - Build <- [c-3333]\n\
         c-3333   [open] - Design\n"
    );
}

#[rstest]
fn test_list_status_filter(chain_dir: TempDir) {
    tk_ok(chain_dir.path(), &["start", "b-2222"]);
    let stdout = tk_ok(chain_dir.path(), &["list", "--status", "in-progress"]);
    assert_eq!(stdout, "b-2222   [in_progress] - Build <- [c-3333]\n");
}

#[rstest]
fn test_ready_and_blocked(chain_dir: TempDir) {
    assert_eq!(
        tk_ok(chain_dir.path(), &["ready"]),
        "c-3333   [P2][open] - Design\n"
    );
    assert_eq!(
        tk_ok(chain_dir.path(), &["blocked"]),
        "a-1111   [P2][open] - Ship it <- [b-2222]\n\
         b-2222   [P2][open] - Build <- [c-3333]\n"
    );

    tk_ok(chain_dir.path(), &["close", "c-3333"]);
    assert_eq!(
        tk_ok(chain_dir.path(), &["ready"]),
        "b-2222   [P2][open] - Build\n"
    );
}

#[rstest]
#[case::start(&["start", "b-2222"], "in_progress")]
#[case::close(&["close", "2222"], "closed")]
#[case::reopen(&["reopen", "b-2222"], "open")]
#[case::status(&["status", "b-22", "closed"], "closed")]
fn test_status_commands_patch_header(
    chain_dir: TempDir,
    #[case] args: &[&str],
    #[case] expected: &str,
) {
    let before = read_record(chain_dir.path(), "b-2222");

    assert_eq!(
        tk_ok(chain_dir.path(), args),
        format!("Updated b-2222 -> {expected}\n")
    );
    assert_eq!(
        read_record(chain_dir.path(), "b-2222"),
        before.replacen("status: open", &format!("status: {expected}"), 1)
    );
}

#[rstest]
fn test_closed_lists_closed_only(chain_dir: TempDir) {
    tk_ok(chain_dir.path(), &["close", "c-3333"]);
    assert_eq!(
        tk_ok(chain_dir.path(), &["closed"]),
        "c-3333   [closed] - Design\n"
    );
}

#[rstest]
fn test_query_emits_json_lines(chain_dir: TempDir) {
    let stdout = tk_ok(chain_dir.path(), &["query"]);
    let ids: Vec<String> = stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["id"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(ids, ["a-1111", "b-2222", "c-3333"]);
}

// ============================================================================
// Dependencies and the dependency tree
// ============================================================================

#[rstest]
fn test_dep_tree_chain(chain_dir: TempDir) {
    let stdout = tk_ok(chain_dir.path(), &["dep", "tree", "a-1111"]);
    assert_eq!(
        stdout,
        "a-1111 [open] Ship it\n\
         └── b-2222 [open] Build\n\
        \x20   └── c-3333 [open] Design\n"
    );
}

#[rstest]
fn test_dep_tree_ascii(chain_dir: TempDir) {
    let output = tk_command(chain_dir.path())
        .env("TK_ASCII", "1")
        .args(["dep", "tree", "1111"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("`-- b-2222"));
}

#[rstest]
fn test_dep_tree_without_tickets_fails(temp_dir: TempDir) {
    let stderr = tk_err(temp_dir.path(), &["dep", "tree", "a"]);
    assert!(stderr.contains("no tickets found"));
}

#[rstest]
fn test_dep_and_undep(chain_dir: TempDir) {
    assert_eq!(
        tk_ok(chain_dir.path(), &["dep", "c-3333", "a-1111"]),
        "Added dependency: c-3333 -> a-1111\n"
    );
    assert_eq!(
        tk_ok(chain_dir.path(), &["dep", "c-3333", "a-1111"]),
        "Dependency already exists\n"
    );
    assert!(read_record(chain_dir.path(), "c-3333").contains("deps: [a-1111]\n"));

    // The cycle a -> b -> c -> a still renders.
    let tree = tk_ok(chain_dir.path(), &["dep", "tree", "--full", "a-1111"]);
    assert_eq!(tree.lines().count(), 3);

    assert_eq!(
        tk_ok(chain_dir.path(), &["undep", "c-3333", "a-1111"]),
        "Removed dependency: c-3333 -/-> a-1111\n"
    );
    assert!(read_record(chain_dir.path(), "c-3333").contains("deps: []\n"));

    let stderr = tk_err(chain_dir.path(), &["undep", "c-3333", "a-1111"]);
    assert!(stderr.contains("dependency not found"));
}

// ============================================================================
// Links
// ============================================================================

#[rstest]
fn test_link_and_unlink(chain_dir: TempDir) {
    assert_eq!(
        tk_ok(chain_dir.path(), &["link", "a-1111", "b-2222", "c-3333"]),
        "Added 6 link(s) between 3 tickets\n"
    );
    assert!(read_record(chain_dir.path(), "a-1111").contains("links: [b-2222, c-3333]\n"));
    assert_eq!(
        tk_ok(chain_dir.path(), &["link", "a-1111", "b-2222"]),
        "All links already exist\n"
    );

    assert_eq!(
        tk_ok(chain_dir.path(), &["unlink", "a-1111", "b-2222"]),
        "Removed link: a-1111 <-> b-2222\n"
    );
    assert!(read_record(chain_dir.path(), "a-1111").contains("links: [c-3333]\n"));
    assert!(read_record(chain_dir.path(), "b-2222").contains("links: [c-3333]\n"));

    let stderr = tk_err(chain_dir.path(), &["unlink", "a-1111", "b-2222"]);
    assert!(stderr.contains("link not found"));
}

// ============================================================================
// Deleting
// ============================================================================

#[rstest]
fn test_rm_refuses_with_dependants(chain_dir: TempDir) {
    let stderr = tk_err(chain_dir.path(), &["rm", "c-3333"]);
    assert!(stderr.contains("cannot delete c-3333: ticket has dependants"));
    assert!(stderr.contains("  - b-2222 [open] Build"));
}

#[rstest]
fn test_rm_with_links_needs_force(chain_dir: TempDir) {
    tk_ok(chain_dir.path(), &["link", "a-1111", "b-2222"]);

    let stderr = tk_err(chain_dir.path(), &["rm", "a-1111"]);
    assert!(stderr.contains("ticket has links"));
    assert!(stderr.contains("Use --force"));

    assert_eq!(
        tk_ok(chain_dir.path(), &["rm", "--force", "a-1111"]),
        "Removed 1 link(s) and deleted ticket: a-1111\n"
    );
    assert!(!chain_dir.path().join(".tickets/a-1111.md").exists());
    assert!(read_record(chain_dir.path(), "b-2222").contains("links: []\n"));
}

#[rstest]
fn test_prune_reports_then_fixes(chain_dir: TempDir) {
    fs::remove_file(chain_dir.path().join(".tickets/c-3333.md")).unwrap();

    let report = tk_ok(chain_dir.path(), &["prune"]);
    assert!(report.contains("b-2222 [open] Build\n  deps: c-3333 (do not exist)\n"));
    assert!(report.contains("  1 total dangling references\n"));
    assert!(read_record(chain_dir.path(), "b-2222").contains("deps: [c-3333]\n"));

    let fixed = tk_ok(chain_dir.path(), &["prune", "--fix"]);
    assert!(fixed.contains("b-2222: Removed deps: c-3333\n"));
    assert!(fixed.contains("Pruned 1 dangling reference(s) from 1 ticket(s).\n"));
    assert!(read_record(chain_dir.path(), "b-2222").contains("deps: []\n"));

    assert_eq!(
        tk_ok(chain_dir.path(), &["prune"]),
        "No dangling references found.\n"
    );
}

#[rstest]
fn test_clean_deletes_unreferenced_closed_tickets(temp_dir: TempDir) {
    write_record(temp_dir.path(), "a-1111", "closed", &[], "Old");
    write_record(temp_dir.path(), "b-2222", "closed", &[], "Needed");
    write_record(temp_dir.path(), "c-3333", "open", &["b-2222"], "Current");

    let report = tk_ok(temp_dir.path(), &["clean"]);
    assert!(report.starts_with("Found 2 closed ticket(s):\n  1 deletable\n  1 blocked\n"));
    assert!(report.contains("  b-2222 [closed] Needed - has dependants\n"));

    let fixed = tk_ok(temp_dir.path(), &["clean", "--fix"]);
    assert!(fixed.contains("Deleted: a-1111\n"));
    assert!(fixed.contains("Deleted 1 ticket(s), skipped 1 blocked ticket(s).\n"));
    assert!(!temp_dir.path().join(".tickets/a-1111.md").exists());
    assert!(temp_dir.path().join(".tickets/b-2222.md").exists());
}

// ============================================================================
// Notes
// ============================================================================

#[rstest]
fn test_note_from_args(chain_dir: TempDir) {
    assert_eq!(
        tk_ok(chain_dir.path(), &["note", "a-1111", "first", "note"]),
        "Note added to a-1111\n"
    );
    tk_ok(chain_dir.path(), &["note", "a-1111", "second"]);

    let record = read_record(chain_dir.path(), "a-1111");
    assert_eq!(record.matches("## Notes").count(), 1);
    assert!(record.contains("\n\nfirst note\n"));
    assert!(record.ends_with("\n\nsecond\n"));
}

#[rstest]
fn test_note_from_stdin(chain_dir: TempDir) {
    let mut child = tk_command(chain_dir.path())
        .args(["note", "b-2222"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"line one\nline two\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert!(read_record(chain_dir.path(), "b-2222").ends_with("\n\nline one\nline two\n"));
}

#[rstest]
fn test_edit_without_terminal_prints_path(chain_dir: TempDir) {
    let stdout = tk_ok(chain_dir.path(), &["edit", "222"]);

    assert!(stdout.starts_with("Edit ticket file: "));
    assert!(stdout.trim_end().ends_with("b-2222.md"));
}

// ============================================================================
// Directory selection
// ============================================================================

#[rstest]
fn test_dir_flag_and_env(temp_dir: TempDir) {
    let elsewhere = temp_dir.path().join("elsewhere");
    write_record(&elsewhere, "x-0001", "open", &[], "Far away");
    let tickets = elsewhere.join(".tickets");
    let tickets_arg = tickets.to_str().unwrap();

    let stdout = tk_ok(temp_dir.path(), &["--dir", tickets_arg, "ls"]);
    assert!(stdout.contains("x-0001"));

    let output = tk_command(temp_dir.path())
        .env("TK_DIR", &tickets)
        .arg("ls")
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("x-0001"));

    let stdout = run_tk_in_dir(temp_dir.path(), &["ls"]);
    assert!(stdout.status.success());
    assert!(stdout.stdout.is_empty());
}

#[rstest]
fn test_nested_working_dir_finds_tickets(chain_dir: TempDir) {
    let nested = chain_dir.path().join("src/deep");
    fs::create_dir_all(&nested).unwrap();
    let stdout = tk_ok(&nested, &["show", "c-3333"]);
    assert!(stdout.contains("# Design"));
}
