//! E2E tests for the `completions` and `version` commands.

mod common;

use common::cli::{TbWorkspace, extract_json_payload, run_tailbench};
use serde_json::Value;

fn assert_contains_subcommands(output: &str, shell_name: &str) {
    for cmd in ["merge", "report", "run", "completions", "version"] {
        assert!(
            output.contains(cmd),
            "{shell_name} completions should contain '{cmd}' subcommand"
        );
    }
}

#[test]
fn e2e_completions_for_each_shell() {
    let _log = common::test_log("e2e_completions_for_each_shell");
    let workspace = TbWorkspace::new();

    for shell in ["bash", "zsh", "fish", "powershell", "elvish"] {
        let run = run_tailbench(&workspace, ["completions", shell], &format!("completions_{shell}"));
        assert!(run.status.success(), "{shell} completions failed: {}", run.stderr);
        assert!(!run.stdout.is_empty(), "{shell} completions empty");
        assert_contains_subcommands(&run.stdout, shell);
    }
}

#[test]
fn e2e_completions_unknown_shell() {
    let _log = common::test_log("e2e_completions_unknown_shell");
    let workspace = TbWorkspace::new();
    let run = run_tailbench(&workspace, ["completions", "tcsh"], "completions_unknown");
    assert!(!run.status.success());
}

#[test]
fn e2e_version_json() {
    let _log = common::test_log("e2e_version_json");
    let workspace = TbWorkspace::new();
    let run = run_tailbench(&workspace, ["version", "--json"], "version_json");
    assert!(run.status.success(), "version failed: {}", run.stderr);
    let json: Value = serde_json::from_str(&extract_json_payload(&run.stdout)).expect("json");
    assert_eq!(json["name"], "tailbench");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
