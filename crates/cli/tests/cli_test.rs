//! # CLI Generate Command Tests
//!
//! This file contains tests for the `generate` command of the `artmeta` binary.

use artmeta_test_utils::{sample_png_data_uri, sample_raw_result, SAMPLE_PNG};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::process::Command;
use tempfile::tempdir;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Helper to create a temporary fixture file within a given directory.
fn create_fixture_file(dir: &std::path::Path, name: &str, content: &[u8]) -> std::path::PathBuf {
    let file_path = dir.join(name);
    fs::write(&file_path, content).expect("Failed to write fixture file");
    file_path
}

fn artmeta() -> Command {
    let mut cmd = Command::cargo_bin("artmeta").unwrap();
    cmd.env_remove("ARTMETA_SERVER_URL").env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_generate_no_file() {
    artmeta()
        .arg("generate")
        .arg("--image")
        .arg("a/non/existent/art.png")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Generate failed"))
        .stderr(predicate::str::contains("Failed to read image file"));
}

#[test]
fn test_generate_rejects_non_image_file() {
    let temp_dir = tempdir().unwrap();
    let fixture_path = create_fixture_file(temp_dir.path(), "notes.png", b"plain text");

    artmeta()
        .arg("generate")
        .arg("--image")
        .arg(&fixture_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unrecognized image format"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_prints_export_block() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-metadata"))
        .and(body_json(json!({ "artworkDataUri": sample_png_data_uri() })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "success", "data": sample_raw_result() })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = tempdir().unwrap();
    let fixture_path = create_fixture_file(temp_dir.path(), "fox.png", SAMPLE_PNG);

    // Act & Assert
    artmeta()
        .arg("generate")
        .arg("--image")
        .arg(&fixture_path)
        .arg("--server")
        .arg(server.uri())
        .arg("--title")
        .arg("Fox Under a Silver Moon")
        .arg("--category")
        .arg("Digital Art")
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Fox Under a Silver Moon"))
        .stdout(predicate::str::contains(format!(
            "Tags: {}",
            sample_raw_result().tags
        )))
        .stdout(predicate::str::contains("Categories: Digital Art"))
        .stderr(predicate::str::contains("Metadata Generated"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_reports_server_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-metadata"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "message": "The metadata generation service is currently unavailable."
        })))
        .mount(&server)
        .await;

    let temp_dir = tempdir().unwrap();
    let fixture_path = create_fixture_file(temp_dir.path(), "fox.png", SAMPLE_PNG);

    artmeta()
        .arg("generate")
        .arg("--image")
        .arg(&fixture_path)
        .arg("--server")
        .arg(server.uri())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Failed to generate metadata: The metadata generation service is currently unavailable.",
        ));
}

#[test]
fn test_generate_unreachable_server() {
    let temp_dir = tempdir().unwrap();
    let fixture_path = create_fixture_file(temp_dir.path(), "fox.png", SAMPLE_PNG);

    artmeta()
        .arg("generate")
        .arg("--image")
        .arg(&fixture_path)
        .arg("--server")
        .arg("http://127.0.0.1:9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not reach the server"));
}
