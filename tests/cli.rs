use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn setup_docs() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let old = tmp.path().join("old.txt");
    let new = tmp.path().join("new.txt");
    fs::write(
        &old,
        "Quarterly report\nRevenue grew strongly.\nThe audit is complete.\n",
    )
    .unwrap();
    fs::write(
        &new,
        "Quarterly report\nRevenue declined sharply.\nThe audit is complete.\nNew risks were found.\n",
    )
    .unwrap();
    (tmp, old, new)
}

fn run_dcmp(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_dcmp"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run dcmp");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_diff_unified() {
    let (_tmp, old, new) = setup_docs();
    let (stdout, _, ok) = run_dcmp(&["diff", path_str(&old), path_str(&new)]);
    assert!(ok);
    assert!(stdout.contains("--- Document 1"));
    assert!(stdout.contains("+++ Document 2"));
    assert!(stdout.contains("-Revenue grew strongly."));
    assert!(stdout.contains("+New risks were found."));
}

#[test]
fn test_diff_identical_reports_no_changes() {
    let (_tmp, old, _) = setup_docs();
    let (stdout, _, ok) = run_dcmp(&["diff", path_str(&old), path_str(&old)]);
    assert!(ok);
    assert_eq!(stdout.trim(), "No changes detected.");
}

#[test]
fn test_diff_json_stats() {
    let (_tmp, old, new) = setup_docs();
    let (stdout, _, ok) = run_dcmp(&["--json", "diff", path_str(&old), path_str(&new)]);
    assert!(ok);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["stats"]["total_doc1"], 3);
    assert_eq!(value["stats"]["total_doc2"], 4);
    assert_eq!(value["stats"]["unchanged"], 2);
}

#[test]
fn test_compare_json_without_config() {
    let (_tmp, old, new) = setup_docs();
    let (stdout, _, ok) = run_dcmp(&["compare", path_str(&old), path_str(&new), "--json"]);
    assert!(ok);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["languages"]["doc1"], "undetermined");
    assert!(value["diff"]["similarity_ratio"].as_f64().unwrap() > 0.5);
    assert!(value["semantic"]["similarity_score"].is_number());
    assert!(value["compliance_flags"]["doc1"][0]
        .as_str()
        .unwrap()
        .contains("audit"));
}

#[test]
fn test_keywords_line_numbers() {
    let (_tmp, old, new) = setup_docs();
    let (stdout, _, ok) = run_dcmp(&[
        "--json",
        "keywords",
        path_str(&old),
        path_str(&new),
        "-k",
        "REVENUE",
        "-k",
        "risks",
    ]);
    assert!(ok);
    let hits: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(hits[0]["keyword"], "REVENUE");
    assert_eq!(hits[0]["lines_in_doc1"], serde_json::json!([2]));
    assert_eq!(hits[1]["in_doc1"], false);
    assert_eq!(hits[1]["lines_in_doc2"], serde_json::json!([4]));
}

#[test]
fn test_corpus_with_reference() {
    let (tmp, old, new) = setup_docs();
    let third = tmp.path().join("third.txt");
    fs::write(&third, "Completely unrelated gardening notes.\n").unwrap();
    let (stdout, _, ok) = run_dcmp(&[
        "--json",
        "corpus",
        path_str(&old),
        path_str(&new),
        path_str(&third),
        "--reference",
        "0",
    ]);
    assert!(ok);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["similarity_matrix"][1][1], 1.0);
    assert_eq!(value["ranking"].as_array().unwrap().len(), 2);
}

#[test]
fn test_translate_passthrough() {
    let tmp = TempDir::new().unwrap();
    let doc = tmp.path().join("es.txt");
    fs::write(&doc, "hola").unwrap();
    let (stdout, _, ok) = run_dcmp(&["translate", path_str(&doc), "--to", "en"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "hola");

    let (stdout, _, ok) = run_dcmp(&["detect", path_str(&doc)]);
    assert!(ok);
    assert_eq!(stdout.trim(), "undetermined");
}

#[test]
fn test_metrics_json() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.txt");
    fs::write(&a, "apple banana").unwrap();
    fs::write(&b, "car truck").unwrap();
    let (stdout, _, ok) = run_dcmp(&["--json", "metrics", path_str(&a), path_str(&b)]);
    assert!(ok);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["jaccard_similarity"], 0.0);
    assert!(value.get("keyword_coverage").is_none());
}

#[test]
fn test_invalid_config_is_rejected() {
    let (tmp, old, new) = setup_docs();
    let config = tmp.path().join("dcmp.toml");
    fs::write(&config, "[thresholds]\ncontroversy = 3.0\n").unwrap();
    let (_, stderr, ok) = run_dcmp(&[
        "--config",
        path_str(&config),
        "diff",
        path_str(&old),
        path_str(&new),
    ]);
    assert!(!ok);
    assert!(stderr.contains("thresholds.controversy"));
}

#[test]
fn test_config_sets_diff_context() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.txt");
    fs::write(&a, "1\n2\n3\n4\n5\n6\nx\n").unwrap();
    fs::write(&b, "1\n2\n3\n4\n5\n6\ny\n").unwrap();
    let config = tmp.path().join("dcmp.toml");
    fs::write(&config, "[diff]\ncontext_lines = 0\n").unwrap();
    let (stdout, _, ok) = run_dcmp(&[
        "--config",
        path_str(&config),
        "diff",
        path_str(&a),
        path_str(&b),
    ]);
    assert!(ok);
    assert!(!stdout.contains(" 6"));
    assert!(stdout.contains("-x"));
    assert!(stdout.contains("+y"));
}

#[test]
fn test_missing_document_fails() {
    let (_, stderr, ok) = run_dcmp(&["diff", "/nonexistent/a.txt", "/nonexistent/b.txt"]);
    assert!(!ok);
    assert!(stderr.contains("Failed to read document"));
}
