use std::path::Path;
use std::process::{Command, Output};

use relgate_vcs::contract::{build_release_branch, standard_release_steps, BranchStep, CHECKSUMS, INDEX_HTML};
use tempfile::tempdir;

fn relgate(repo: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_relgate"))
        .arg("--repo")
        .arg(repo)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn valid_branch_exits_zero() {
    let dir = tempdir().unwrap();
    build_release_branch(dir.path(), &standard_release_steps()).unwrap();

    let out = relgate(dir.path(), &["verify", "--base", "main", "--head", "release"]);
    let text = stdout(&out);
    assert_eq!(out.status.code(), Some(0), "{text}");
    assert!(text.contains("[PASS] commit count: 3 commits"));
    assert!(text.contains("[PASS] slot 1"));
    assert!(text.contains("merge commit (2 parents)"));
    assert!(text.contains("[PASS] slot 2"));
    assert!(text.contains("[PASS] slot 3"));
    assert!(text.contains("OK: release branch structure is valid"));
}

#[test]
fn non_merge_first_commit_stops_at_slot_one() {
    let dir = tempdir().unwrap();
    let steps = [
        BranchStep::touch(&["src/app.js"]),
        BranchStep::touch(&[INDEX_HTML]),
        BranchStep::touch(&[CHECKSUMS]),
    ];
    build_release_branch(dir.path(), &steps).unwrap();

    let out = relgate(dir.path(), &["verify", "--base", "main", "--head", "release"]);
    let text = stdout(&out);
    assert_eq!(out.status.code(), Some(1), "{text}");
    assert!(text.contains("[FAIL] slot 1"));
    assert!(text.contains("first commit is not a merge"));
    assert!(text.contains("remedy: merge the base-of-truth branch"));
    assert!(!text.contains("slot 2"));
}

#[test]
fn reordered_commits_fail_at_slot_two() {
    let dir = tempdir().unwrap();
    let steps = [
        BranchStep::MergeBase,
        BranchStep::touch(&[CHECKSUMS]),
        BranchStep::touch(&[INDEX_HTML]),
    ];
    build_release_branch(dir.path(), &steps).unwrap();

    let out = relgate(dir.path(), &["verify", "--base", "main", "--head", "release"]);
    let text = stdout(&out);
    assert_eq!(out.status.code(), Some(1), "{text}");
    assert!(text.contains("[PASS] slot 1"));
    assert!(text.contains("[FAIL] slot 2"));
    assert!(text.contains("changed: CHECKSUMS.json"));
    assert!(!text.contains("slot 3"));
}

#[test]
fn empty_range_is_a_count_failure() {
    let dir = tempdir().unwrap();
    build_release_branch(dir.path(), &[]).unwrap();

    let out = relgate(dir.path(), &["verify", "--base", "main", "--head", "release"]);
    let text = stdout(&out);
    assert_eq!(out.status.code(), Some(1), "{text}");
    assert!(text.contains("[FAIL] commit count: wrong commit count"));
    assert!(text.contains("found 0 commit(s), expected 3"));
}

#[test]
fn unknown_ref_is_an_error() {
    let dir = tempdir().unwrap();
    build_release_branch(dir.path(), &standard_release_steps()).unwrap();

    // Default base is origin/main, which the fixture does not have.
    let out = relgate(dir.path(), &["verify"]);
    let text = stdout(&out);
    assert_eq!(out.status.code(), Some(2), "{text}");
    assert!(text.contains("cannot resolve reference 'origin/main'"));
    assert!(text.contains("remedy: supply valid references"));
}

#[test]
fn config_file_supplies_refs() {
    let dir = tempdir().unwrap();
    build_release_branch(dir.path(), &standard_release_steps()).unwrap();

    let cfg = dir.path().join("gate.toml");
    std::fs::write(&cfg, "[refs]\nbase = \"main\"\nhead = \"release\"\n").unwrap();

    // No subcommand means verify.
    let out = relgate(dir.path(), &["--config", cfg.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0), "{}", stdout(&out));
}

#[test]
fn doctor_and_init() {
    let dir = tempdir().unwrap();
    build_release_branch(dir.path(), &standard_release_steps()).unwrap();

    let out = relgate(dir.path(), &["doctor", "--base", "main"]);
    let text = stdout(&out);
    assert_eq!(out.status.code(), Some(0), "{text}");
    assert!(text.trim_end().ends_with("OK"));

    let out = relgate(dir.path(), &["init"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(dir.path().join(".relgate").join("relgate.toml").exists());
}

#[test]
fn ref_flags_work_without_a_subcommand() {
    let dir = tempdir().unwrap();
    build_release_branch(dir.path(), &standard_release_steps()).unwrap();

    let out = relgate(dir.path(), &["--base", "main", "--head", "release"]);
    let text = stdout(&out);
    assert_eq!(out.status.code(), Some(0), "{text}");
    assert!(text.starts_with("verifying release against main\n"));
}

#[test]
fn run_from_a_subdirectory_finds_the_repo_config() {
    let dir = tempdir().unwrap();
    build_release_branch(dir.path(), &standard_release_steps()).unwrap();
    let cfg_dir = dir.path().join(".relgate");
    std::fs::create_dir_all(&cfg_dir).unwrap();
    std::fs::write(cfg_dir.join("relgate.toml"), "[refs]\nbase = \"main\"\nhead = \"release\"\n").unwrap();
    let sub = dir.path().join("frontend");
    std::fs::create_dir_all(&sub).unwrap();

    // No --repo: the work tree root is discovered from the current directory.
    let out = Command::new(env!("CARGO_BIN_EXE_relgate"))
        .current_dir(&sub)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    let text = stdout(&out);
    assert_eq!(out.status.code(), Some(0), "{text}");
    assert!(text.contains("OK: release branch structure is valid"));
}
