//! Integration tests for the educhunk CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to a test fixture
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

fn educhunk() -> Command {
    let mut cmd = Command::cargo_bin("educhunk").unwrap();
    cmd.env_remove("EDUCHUNK_ENRICH_ENDPOINT");
    cmd
}

fn json_output(args: &[&str]) -> serde_json::Value {
    let output = educhunk()
        .arg("process")
        .args(args)
        .arg("-f")
        .arg("json")
        .arg("-q")
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_process_text_output() {
    educhunk()
        .arg("process")
        .arg("-i")
        .arg(fixture_path("force.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("force ("))
        .stdout(predicate::str::contains("quality="));
}

#[test]
fn test_json_chunks_tile_the_chapter() {
    let text = fs::read_to_string(fixture_path("force.txt")).unwrap();
    let value = json_output(&["-i", &fixture_path("force.txt")]);

    let documents = value.as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["document_id"], "force");

    let chunks = documents[0]["chunks"].as_array().unwrap();
    assert!(chunks.len() >= 3);

    let mut expected_start = chunks[0]["position_range"]["start"].as_u64().unwrap();
    for chunk in chunks {
        let start = chunk["position_range"]["start"].as_u64().unwrap();
        let end = chunk["position_range"]["end"].as_u64().unwrap();
        assert_eq!(start, expected_start);
        assert!(end > start);
        expected_start = end;

        let quality = chunk["aggregate_quality"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&quality));
    }
    assert!(expected_start as usize <= text.len());

    let all_text: String = chunks
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(all_text.matches("Activity 8.1").count(), 1);
}

#[test]
fn test_markdown_output() {
    educhunk()
        .arg("process")
        .arg("-i")
        .arg(fixture_path("force.txt"))
        .arg("-f")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("# force"))
        .stdout(predicate::str::contains("| Dimension | Score |"))
        .stdout(predicate::str::contains("*Total chunks:"));
}

#[test]
fn test_metadata_flag_shows_scores() {
    educhunk()
        .arg("process")
        .arg("-i")
        .arg(fixture_path("force.txt"))
        .arg("--metadata")
        .assert()
        .success()
        .stdout(predicate::str::contains("scores: "))
        .stdout(predicate::str::contains("difficulty: "));
}

#[test]
fn test_hindi_activity_is_detected() {
    let value = json_output(&["-i", &fixture_path("hindi.txt"), "--language", "hi"]);
    let chunks = value[0]["chunks"].as_array().unwrap();
    let activities: u64 = chunks
        .iter()
        .filter_map(|c| c["category_counts"]["activity"].as_u64())
        .sum();
    assert_eq!(activities, 1);
}

#[test]
fn test_marker_sidecar_defines_units() {
    let dir = TempDir::new().unwrap();
    let text = "8.1 Force\nIntro text. Activity 8.1: push a box. More text.\n\
                8.2 Friction\nFriction opposes motion.";
    let chapter = dir.path().join("ch8.txt");
    fs::write(&chapter, text).unwrap();
    let second = text.find("8.2 Friction").unwrap();
    fs::write(
        dir.path().join("ch8.txt.markers.json"),
        format!(r#"[{{"offset": 0, "label": "8.1"}}, {{"offset": {second}, "label": "8.2"}}]"#),
    )
    .unwrap();

    let pattern = dir.path().join("*").to_string_lossy().into_owned();
    let value = json_output(&["-i", &pattern]);

    let documents = value.as_array().unwrap();
    assert_eq!(documents.len(), 1);
    let chunks = documents[0]["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0]["position_range"]["end"], second);
    assert_eq!(chunks[1]["text"], &text[second..]);
}

#[test]
fn test_invalid_marker_fails_with_nonzero_exit() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.txt");
    let bad = dir.path().join("bad.txt");
    fs::write(&good, "8.1 Force\nA push or a pull is called force.").unwrap();
    fs::write(&bad, "Short text.").unwrap();
    fs::write(
        dir.path().join("bad.txt.markers.json"),
        r#"[{"offset": 999, "label": "9.9"}]"#,
    )
    .unwrap();

    educhunk()
        .arg("process")
        .arg("-i")
        .arg(dir.path().join("*.txt").to_string_lossy().as_ref())
        .arg("-q")
        .assert()
        .failure()
        .stdout(predicate::str::contains("good ("))
        .stderr(predicate::str::contains("1 of 2 documents failed"));
}

#[test]
fn test_store_writes_records() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("chunks");

    educhunk()
        .arg("process")
        .arg("-i")
        .arg(fixture_path("force.txt"))
        .arg("--store")
        .arg(&store)
        .arg("-q")
        .assert()
        .success();

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.join("force.json")).unwrap()).unwrap();
    assert_eq!(record["document_id"], "force");
    assert!(!record["chunks"].as_array().unwrap().is_empty());
}

#[test]
fn test_same_file_name_in_two_directories() {
    let dir = TempDir::new().unwrap();
    for (subject, body) in [("physics", "Force is a push."), ("biology", "Cells divide.")] {
        fs::create_dir(dir.path().join(subject)).unwrap();
        fs::write(dir.path().join(subject).join("ch8.txt"), body).unwrap();
    }
    let store = dir.path().join("chunks");
    let pattern = dir.path().join("*/ch8.txt").to_string_lossy().into_owned();

    let value = json_output(&["-i", &pattern, "--store", store.to_str().unwrap()]);
    let mut ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["document_id"].as_str().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, ["biology/ch8", "physics/ch8"]);

    let mut stored: Vec<String> = fs::read_dir(&store)
        .unwrap()
        .map(|entry| {
            let record: serde_json::Value =
                serde_json::from_str(&fs::read_to_string(entry.unwrap().path()).unwrap())
                    .unwrap();
            record["chunks"][0]["text"].as_str().unwrap().to_string()
        })
        .collect();
    stored.sort();
    assert_eq!(stored, ["Cells divide.", "Force is a push."]);
}

#[test]
fn test_output_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("chunks.json");

    educhunk()
        .arg("process")
        .arg("-i")
        .arg(fixture_path("force.txt"))
        .arg("-f")
        .arg("json")
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value[0]["document_id"], "force");
}

#[test]
fn test_sequential_and_parallel_agree() {
    let file = fixture_path("force.txt");
    let sequential = json_output(&["-i", &file, "--sequential"]);
    let parallel = json_output(&["-i", &file, "--parallel", "--threads", "2"]);
    assert_eq!(sequential[0]["chunks"], parallel[0]["chunks"]);
}

#[test]
fn test_generated_config_is_usable() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("educhunk.toml");

    educhunk()
        .arg("generate-config")
        .arg("-o")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("generated successfully"));

    educhunk()
        .arg("process")
        .arg("-i")
        .arg(fixture_path("force.txt"))
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn test_config_file_sets_default_format() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("educhunk.toml");
    fs::write(&config, "[output]\ndefault_format = \"markdown\"\n").unwrap();

    educhunk()
        .arg("process")
        .arg("-i")
        .arg(fixture_path("force.txt"))
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("*Total chunks:"));
}

#[test]
fn test_invalid_config_value() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("educhunk.toml");
    fs::write(&config, "[processing]\nmax_unit_len = 0\n").unwrap();

    educhunk()
        .arg("process")
        .arg("-i")
        .arg(fixture_path("force.txt"))
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unreachable_enrichment_does_not_fail() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    educhunk()
        .arg("process")
        .arg("-i")
        .arg(fixture_path("force.txt"))
        .arg("--enrich-endpoint")
        .arg(format!("http://127.0.0.1:{port}/enrich"))
        .arg("-q")
        .assert()
        .success();
}

#[test]
fn test_nonexistent_file() {
    educhunk()
        .arg("process")
        .arg("-i")
        .arg("nonexistent-file.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_list_commands() {
    educhunk()
        .args(["list", "tables"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ncert"));

    educhunk()
        .args(["list", "categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("special_box"));

    educhunk()
        .args(["list", "formats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("markdown"));
}

#[test]
fn test_validate_embedded_table() {
    educhunk()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pattern table is valid"));
}

#[test]
fn test_validate_broken_table() {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("patterns.toml");
    fs::write(
        &table,
        "[metadata]\nname = \"t\"\n\n[[rules]]\nid = \"q\"\ncategory = \"question\"\n\
         pattern = 'Q\\d+'\nexamples = [\"Question 1\"]\n",
    )
    .unwrap();

    educhunk()
        .arg("validate")
        .arg("--patterns")
        .arg(&table)
        .assert()
        .failure()
        .stdout(predicate::str::contains("q: \"Question 1\""));
}

#[test]
fn test_help_and_version() {
    educhunk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("generate-config"));

    educhunk().arg("--version").assert().success();
}
