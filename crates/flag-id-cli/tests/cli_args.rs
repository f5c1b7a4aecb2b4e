//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

mod common;

use common::{json_lines, red, Fixture};
use flag_id_test_support::{colors, save_png, SyntheticFlagBuilder};
use predicates::prelude::*;

// === Missing/Invalid Path Tests ===

#[test]
fn test_missing_path_shows_error() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No paths specified"));
}

#[test]
fn test_missing_corpus_is_fatal() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .arg(query)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No reference corpus"));
}

#[test]
fn test_nonexistent_corpus_is_fatal() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .arg("--corpus")
        .arg(fixture.root().join("no-such-dir"))
        .arg(query)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Corpus directory not found"));
}

#[test]
fn test_nonexistent_query_warns_but_continues() {
    let fixture = Fixture::new();

    fixture
        .cmd()
        .arg("--corpus")
        .arg(fixture.corpus())
        .arg("/nonexistent/path/to/flag.png")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_empty_query_directory() {
    let fixture = Fixture::new();

    fixture
        .cmd()
        .arg("--corpus")
        .arg(fixture.corpus())
        .arg(fixture.queries())
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

// === Format Validation Tests ===

#[test]
fn test_invalid_format_rejected() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .args(["--format", "xml"])
        .arg(query)
        .assert()
        .failure()
        .stderr(predicate::str::contains("json").or(predicate::str::contains("jsonl")));
}

// === Matching Option Validation ===

#[test]
fn test_bucket_count_must_be_power_of_two() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .args(["--buckets", "12"])
        .arg(query)
        .assert()
        .failure()
        .stderr(predicate::str::contains("power of two"));
}

#[test]
fn test_negative_tolerance_rejected() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .arg("--ratio-tolerance=-0.5")
        .arg(query)
        .assert()
        .failure()
        .stderr(predicate::str::contains(">= 0"));
}

#[test]
fn test_non_numeric_tolerance_rejected() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .args(["--edge-tolerance", "wide"])
        .arg(query)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid number"));
}

#[test]
fn test_exact_conflicts_with_radius() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .args(["--exact", "--neighbor-radius", "2"])
        .arg(query)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_zero_normalize_height_rejected() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .args(["--normalize-height", "0"])
        .arg(query)
        .assert()
        .failure();
}

// === Help and Subcommands ===

#[test]
fn test_help_lists_subcommands() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("identify").and(predicate::str::contains("index")));
}

#[test]
fn test_identify_subcommand_matches_default() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .arg("identify")
        .arg("--corpus")
        .arg(fixture.corpus())
        .arg(query)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"candidates\":[\"Red\"]"));
}

#[test]
fn test_verbose_flag_logs_engine() {
    let fixture = Fixture::new();
    let query = fixture.query(&red(), "q");

    fixture
        .cmd()
        .arg("-v")
        .arg("--corpus")
        .arg(fixture.corpus())
        .arg(query)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Match engine ready"));
}

#[test]
fn test_corpus_recursive_reads_nested_flags() {
    let fixture = Fixture::new();
    let nested = fixture.corpus().join("blues");
    std::fs::create_dir(&nested).unwrap();
    save_png(&SyntheticFlagBuilder::solid("Blue", 30, 20, colors::BLUE), &nested).unwrap();
    let query = fixture.query(&SyntheticFlagBuilder::solid("q", 30, 20, colors::BLUE), "q");

    let flat = fixture
        .cmd()
        .arg("--corpus")
        .arg(fixture.corpus())
        .arg(&query)
        .output()
        .unwrap();
    assert_eq!(flat.status.code(), Some(1));
    assert_eq!(json_lines(&flat.stdout)[0]["status"], "unmatched");

    let nested_run = fixture
        .cmd()
        .arg("--corpus")
        .arg(fixture.corpus())
        .arg("--corpus-recursive")
        .arg(&query)
        .output()
        .unwrap();
    assert_eq!(nested_run.status.code(), Some(0));
    assert_eq!(json_lines(&nested_run.stdout)[0]["candidates"][0], "Blue");
}

#[test]
fn test_query_recursion_does_not_recurse_corpus() {
    let fixture = Fixture::new();
    let nested = fixture.corpus().join("blues");
    std::fs::create_dir(&nested).unwrap();
    save_png(&SyntheticFlagBuilder::solid("Blue", 30, 20, colors::BLUE), &nested).unwrap();
    let query = fixture.query(&SyntheticFlagBuilder::solid("q", 30, 20, colors::BLUE), "q");

    fixture
        .cmd()
        .arg("--corpus")
        .arg(fixture.corpus())
        .arg("-r")
        .arg(&query)
        .assert()
        .code(1);
}

#[test]
fn test_corpus_recursive_from_config_in_index() {
    let fixture = Fixture::new();
    let nested = fixture.corpus().join("blues");
    std::fs::create_dir(&nested).unwrap();
    save_png(&SyntheticFlagBuilder::solid("Blue", 30, 20, colors::BLUE), &nested).unwrap();
    fixture.project_config("[corpus]\ndir = \"flags\"\nrecursive = true\n");

    let output = fixture.cmd().arg("index").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let flags: Vec<_> = json_lines(&output.stdout)
        .iter()
        .map(|r| r["flag"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(flags, ["Blue", "Green", "Red", "Split", "Stripes"]);
}

#[test]
fn test_corpus_recursive_rejects_duplicate_names() {
    let fixture = Fixture::new();
    let nested = fixture.corpus().join("copies");
    std::fs::create_dir(&nested).unwrap();
    save_png(&red(), &nested).unwrap();

    fixture
        .cmd()
        .args(["index", "--corpus-recursive", "--corpus"])
        .arg(fixture.corpus())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Duplicate flag identifier"));
}
