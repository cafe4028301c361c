use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn harness() -> Command {
    let mut cmd = Command::cargo_bin("frame337-harness").unwrap();
    for var in [
        "FRAME337_ROOT",
        "FRAME337_REF_BIN",
        "FRAME337_REF_AC4_BIN",
        "FRAME337_DUT_BIN",
        "FRAME337_TIMEOUT_SECS",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Output is the flags line followed by the input bytes
const FAKE_FRAMER: &str = r#"
flags=""
for a in "$@"; do
  case "$a" in
    -i*) src="${a#-i}" ;;
    -o*) dst="${a#-o}" ;;
    *) flags="$flags$a;" ;;
  esac
done
{ printf '%s\n' "$flags"; cat "$src"; } > "$dst"
"#;

/// FAKE_FRAMER, except inputs named `*bad*` fail without output
const PICKY_FRAMER: &str = r#"
flags=""
for a in "$@"; do
  case "$a" in
    -i*) src="${a#-i}" ;;
    -o*) dst="${a#-o}" ;;
    *) flags="$flags$a;" ;;
  esac
done
case "${src##*/}" in *bad*) echo "unsupported frame" >&2; exit 1 ;; esac
{ printf '%s\n' "$flags"; cat "$src"; } > "$dst"
"#;

fn ac3_seeds(root: &Path, names: &[&str]) {
    let dir = root.join("sources").join("dd_pcm");
    fs::create_dir_all(&dir).unwrap();
    for name in names {
        fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}

fn ac3_corpus(root: &Path) {
    for (dir, name) in [("dd_es", "tone.ac3"), ("dd_wav", "tone.wav")] {
        let dir = root.join("sources").join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}

fn script(root: &Path, name: &str, body: &str) -> String {
    let path = root.join(name);
    fs::write(&path, body).unwrap();
    path.to_str().unwrap().to_string()
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    harness()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    harness()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("frame337-harness"));
}

#[test]
fn test_help_flag() {
    harness()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("references"))
        .stdout(predicate::str::contains("sources"));
}

#[test]
fn test_unknown_mode_is_usage_error() {
    harness().arg("generate").assert().failure().code(2);
}

// =============================================================================
// INFO SUBCOMMAND
// =============================================================================

#[test]
fn test_info_json() {
    let tmp = tempfile::tempdir().unwrap();
    let output = harness()
        .args(["info", "--json", "--root"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(info["cli_version"].is_string());
    assert_eq!(info["manifest_exists"], false);
    assert!(info["timeout_secs"].is_null());
    let binaries = info["binaries"].as_array().unwrap();
    assert_eq!(binaries.len(), 3);
    assert_eq!(binaries[2]["env_var"], "FRAME337_DUT_BIN");
    assert_eq!(binaries[2]["found"], false);
}

// =============================================================================
// TEST SUBCOMMAND
// =============================================================================

#[test]
fn test_missing_candidate_binary() {
    let tmp = tempfile::tempdir().unwrap();
    harness()
        .args(["test", "--candidate-bin", "/nonexistent/frame337", "--root"])
        .arg(tmp.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_missing_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let dut = script(tmp.path(), "dut.sh", FAKE_FRAMER);
    harness()
        .args(["test", "--shell-wrapper", "--candidate-bin", &dut, "--root"])
        .arg(tmp.path())
        .assert()
        .code(2);
}

// =============================================================================
// SOURCES SUBCOMMAND
// =============================================================================

#[test]
fn test_sources_continue_on_error_partial_failure() {
    let tmp = tempfile::tempdir().unwrap();
    ac3_seeds(tmp.path(), &["a_bad.pcm", "b.pcm"]);
    let reference = script(tmp.path(), "reference.sh", PICKY_FRAMER);

    harness()
        .args(["sources", "--continue-on-error", "--shell-wrapper", "--reference-bin"])
        .arg(&reference)
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .code(4)
        .stdout(predicate::str::contains("Created sources/dd_es/b.ac3"))
        .stdout(predicate::str::contains("Created sources/dd_wav/b.wav"))
        .stderr(predicate::str::contains("Creation of").count(1));

    assert!(!tmp.path().join("sources/dd_es/a_bad.ac3").exists());
}

#[test]
fn test_sources_all_failed_is_execution_error() {
    let tmp = tempfile::tempdir().unwrap();
    ac3_seeds(tmp.path(), &["a_bad.pcm", "c_bad.pcm"]);
    let reference = script(tmp.path(), "reference.sh", PICKY_FRAMER);

    harness()
        .args(["sources", "--continue-on-error", "--shell-wrapper", "--reference-bin"])
        .arg(&reference)
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Created").not())
        .stderr(predicate::str::contains("Creation of").count(2));
}

#[test]
fn test_sources_aborts_at_first_failure_by_default() {
    let tmp = tempfile::tempdir().unwrap();
    ac3_seeds(tmp.path(), &["a_bad.pcm", "b.pcm"]);
    let reference = script(tmp.path(), "reference.sh", PICKY_FRAMER);

    harness()
        .args(["sources", "--shell-wrapper", "--reference-bin"])
        .arg(&reference)
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Asset derivation failed"));

    assert!(!tmp.path().join("sources/dd_es/b.ac3").exists());
}

#[test]
fn test_sources_without_sources_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let reference = script(tmp.path(), "reference.sh", PICKY_FRAMER);
    harness()
        .args(["sources", "--shell-wrapper", "--reference-bin"])
        .arg(&reference)
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .code(2);
}

// =============================================================================
// REFERENCES + TEST FLOW
// =============================================================================

#[test]
fn test_references_dry_run_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    ac3_corpus(tmp.path());

    harness()
        .args(["references", "--dry-run", "--root"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "sources/dd_es/tone.ac3 reference_output/tid001_tone.wav",
        ))
        .stdout(predicate::str::contains(
            "sources/dd_wav/tone.wav reference_output/tid002_tone.ac3 -d",
        ))
        .stdout(predicate::str::contains("reference_output/tid003_tone.wav -a"));

    assert!(!tmp.path().join("run_test_cases.txt").exists());
    assert!(!tmp.path().join("reference_output").exists());
}

#[test]
fn test_references_on_empty_corpus() {
    let tmp = tempfile::tempdir().unwrap();
    harness()
        .args(["references", "--dry-run", "--root"])
        .arg(tmp.path())
        .assert()
        .code(2);
}

#[test]
fn test_references_then_test() {
    let tmp = tempfile::tempdir().unwrap();
    ac3_corpus(tmp.path());
    let reference = script(tmp.path(), "reference.sh", FAKE_FRAMER);

    harness()
        .args(["references", "--shell-wrapper", "--reference-bin", &reference, "--root"])
        .arg(tmp.path())
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("run_test_cases.txt")).unwrap();
    assert_eq!(manifest.lines().count(), 3);
    assert!(tmp
        .path()
        .join("reference_output/tid002_tone.ac3")
        .exists());

    let candidate = script(tmp.path(), "candidate.sh", FAKE_FRAMER);
    harness()
        .args(["test", "--shell-wrapper", "--candidate-bin", &candidate, "--root"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "sources/dd_es/tone.ac3 -> dut_output/tid001_tone.wav Passed",
        ))
        .stdout(predicate::str::contains("dut_output/tid003_tone.wav Passed"))
        .stdout(predicate::str::contains("Number of tests completed: 3"))
        .stdout(predicate::str::contains("Number of tests failed: 0"))
        .stderr(predicate::str::contains("Passed").not());

    harness()
        .args(["test", "--quiet", "--shell-wrapper", "--candidate-bin", &candidate, "--root"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Passed").not())
        .stdout(predicate::str::contains("Number of tests passed: 3"));

    let broken = script(tmp.path(), "broken.sh", "echo boom >&2\nexit 1\n");
    let output = harness()
        .args(["test", "--json", "--shell-wrapper", "--candidate-bin", &broken, "--root"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["failed"], 3);
    assert_eq!(report["cases"][0]["failure"], "candidate_crash");
}

#[test]
fn test_corrupt_manifest_line_is_partial_failure() {
    let tmp = tempfile::tempdir().unwrap();
    ac3_corpus(tmp.path());
    let reference = script(tmp.path(), "reference.sh", FAKE_FRAMER);

    harness()
        .args(["references", "--shell-wrapper", "--reference-bin", &reference, "--root"])
        .arg(tmp.path())
        .assert()
        .success();

    let manifest_path = tmp.path().join("run_test_cases.txt");
    let mut manifest = fs::read_to_string(&manifest_path).unwrap();
    manifest.push_str("sources/dd_es/truncated.ac3\n");
    fs::write(&manifest_path, manifest).unwrap();

    harness()
        .args(["test", "--shell-wrapper", "--candidate-bin", &reference, "--root"])
        .arg(tmp.path())
        .assert()
        .code(4)
        .stdout(predicate::str::contains("Number of corrupt manifest lines: 1"));
}
