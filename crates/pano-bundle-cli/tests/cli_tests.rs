use assert_cmd::Command;
use pano_bundle_test_helpers::{fixtures, DeclarationTree};
use predicates::prelude::*;

fn pano_bundle_cmd(tree: &DeclarationTree) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pano-bundle"));
    cmd.current_dir(tree.root())
        .env("npm_package_version", "1.2.3")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// ARGUMENT VALIDATION
// ============================================================================

#[test]
fn test_no_arguments_fails_without_output() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected <MODULES> <OUTPUT_NAME>"));

    assert!(!tree.path("dist").exists());
}

#[test]
fn test_single_argument_fails_without_output() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree).arg("shared").assert().failure();

    assert!(!tree.path("dist").exists());
}

#[test]
fn test_three_arguments_fail_without_output() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .args(["shared", "p2ce", "extra"])
        .assert()
        .failure();

    assert!(!tree.path("dist").exists());
}

#[test]
fn test_missing_version_fails_without_output() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .env_remove("npm_package_version")
        .args(["shared", "shared"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No version string available"));

    assert!(!tree.path("dist").exists());
}

#[test]
fn test_malformed_rewrite_rule() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .args(["shared", "csgo", "--rewrite", "Chaos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FROM=TO"));

    assert!(!tree.path("dist").exists());
}

// ============================================================================
// SINGLE BUNDLE
// ============================================================================

#[test]
fn test_end_to_end_example() {
    let tree = DeclarationTree::with_header("/* v$npm_package_version$ */\n");
    tree.write("src/shared/x.d.ts", "type X = number;\n");

    pano_bundle_cmd(&tree).args(["shared", "demo"]).assert().success();

    assert_eq!(tree.read("dist/demo.d.ts"), "/* v1.2.3 */\ntype X = number;\n");
}

#[test]
fn test_pkg_version_flag_overrides_env() {
    let tree = DeclarationTree::with_header("// $npm_package_version$\n");

    pano_bundle_cmd(&tree)
        .args(["--pkg-version", "9.9.9", "shared", "demo"])
        .assert()
        .success();

    assert_eq!(tree.read("dist/demo.d.ts"), "// 9.9.9\n");
}

#[test]
fn test_explicit_rewrite() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .args(["shared", "csgo", "--rewrite", "Chaos=CSGO"])
        .assert()
        .success();

    let bundle = tree.read("dist/csgo.d.ts");
    assert!(bundle.contains("CSGOEventNameMap"));
    assert!(!bundle.contains("Chaos"));
}

#[test]
fn test_output_named_after_target_applies_its_rewrite() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree).args(["shared", "csgo"]).assert().success();

    let bundle = tree.read("dist/csgo.d.ts");
    assert!(bundle.contains("CSGOEventNameMap"));
    assert!(!bundle.contains("Chaos"));
}

#[test]
fn test_explicit_rewrite_replaces_target_rewrite() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .args(["shared", "csgo", "--rewrite", "Chaos=Source2"])
        .assert()
        .success();

    let bundle = tree.read("dist/csgo.d.ts");
    assert!(bundle.contains("Source2EventNameMap"));
    assert!(!bundle.contains("CSGO"));
}

#[test]
fn test_non_utf8_module_bytes_preserved() {
    let tree = DeclarationTree::upstream();
    std::fs::write(tree.path("src/momentum/legacy.d.ts"), b"// caf\xe9\n").unwrap();

    pano_bundle_cmd(&tree)
        .args(["momentum", "momentum"])
        .assert()
        .success();

    let bundle = std::fs::read(tree.path("dist/momentum.d.ts")).unwrap();
    assert!(bundle.ends_with(b"// caf\xe9\n"));
}

#[test]
fn test_rust_log_debug_shows_per_file_logs() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .env("RUST_LOG", "debug")
        .args(["shared", "shared"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Appended:"));
}

#[test]
fn test_default_log_level_hides_per_file_logs() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .args(["shared", "shared"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Generated:"))
        .stderr(predicate::str::contains("Appended:").not());
}

#[test]
fn test_no_recursive_flag() {
    let tree = DeclarationTree::upstream();
    tree.write("src/shared/nested/deep.d.ts", "interface Deep {}\n");

    pano_bundle_cmd(&tree)
        .args(["--no-recursive", "shared", "flat"])
        .assert()
        .success();
    pano_bundle_cmd(&tree).args(["shared", "deep"]).assert().success();

    assert!(!tree.read("dist/flat.d.ts").contains("interface Deep"));
    assert!(tree.read("dist/deep.d.ts").contains("interface Deep"));
}

#[test]
fn test_out_dir_override() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .args(["--out-dir", "types", "momentum", "momentum"])
        .assert()
        .success();

    assert!(tree.path("types/momentum.d.ts").exists());
    assert!(!tree.path("dist").exists());
}

#[test]
fn test_dry_run_prints_and_writes_nothing() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .args(["--dry-run", "momentum", "momentum"])
        .assert()
        .success()
        .stdout(predicate::str::contains(fixtures::momentum_index()))
        .stdout(predicate::str::starts_with("/**\n * @version 1.2.3"));

    assert!(!tree.path("dist").exists());
}

// ============================================================================
// PRESET TARGETS
// ============================================================================

#[test]
fn test_all_targets() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree).arg("--all").assert().success();

    for name in ["panorama", "csgo", "p2ce", "momentum"] {
        let bundle = tree.read(&format!("dist/{}.d.ts", name));
        assert!(bundle.starts_with("/**\n * @version 1.2.3\n */\n\n"));
    }
    assert!(tree.read("dist/csgo.d.ts").contains("CSGOSettings"));
    assert!(tree.read("dist/panorama.d.ts").contains("ChaosSettings"));
}

#[test]
fn test_duplicate_target_built_once() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .args(["-t", "p2ce", "-t", "p2ce"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping duplicate bundle 'p2ce'"));

    assert!(tree.read("dist/p2ce.d.ts").contains("CampaignAPI"));
}

#[test]
fn test_unknown_target_fails() {
    let tree = DeclarationTree::upstream();

    pano_bundle_cmd(&tree)
        .args(["--target", "dota"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown bundle target 'dota'"));
}

#[test]
fn test_targets_from_project_file() {
    let tree = DeclarationTree::upstream();
    tree.write(
        "bundles.yaml",
        r#"
layout:
  outDir: out
  separator: "\n"
targets:
  - name: game
    modules: [p2ce, momentum]
    rewrite:
      from: API
      to: Api
"#,
    );

    pano_bundle_cmd(&tree)
        .args(["--project", "bundles.yaml", "--target", "game"])
        .assert()
        .success();

    let bundle = tree.read("out/game.d.ts");
    assert!(bundle.contains("CampaignApi"));
    assert!(bundle.contains("MomentumTimerApi"));
    assert!(bundle.contains("}\n\ndeclare namespace MomentumTimerApi"));
}

#[test]
fn test_failing_target_reports_error() {
    let tree = DeclarationTree::upstream();
    // A file where the output directory should be makes every write fail
    tree.write("dist", "not a directory");

    pano_bundle_cmd(&tree)
        .args(["--target", "p2ce", "--target", "momentum"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 of 2 bundle(s) failed"));
}

// ============================================================================
// INIT
// ============================================================================

#[test]
fn test_init_then_build() {
    let tree = DeclarationTree::empty();

    pano_bundle_cmd(&tree).arg("--init").assert().success();

    assert!(tree.path("pano-bundle.yaml").exists());
    assert!(tree.path("src/header.d.ts").exists());
    assert!(tree.path("src/shared").is_dir());

    tree.write("src/shared/apis.d.ts", fixtures::shared_apis());
    pano_bundle_cmd(&tree).arg("--all").assert().success();

    let bundle = tree.read("dist/p2ce.d.ts");
    assert!(bundle.contains("@version 1.2.3"));
    assert!(bundle.ends_with(fixtures::shared_apis()));
}
