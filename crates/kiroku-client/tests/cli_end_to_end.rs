use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn token_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    file.write_all(contents.as_bytes()).expect("write token");
    file
}

fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kiroku-cli"));
    cmd.env_remove("KIROKU_SITE_URL")
        .env_remove("KIROKU_TOKEN")
        .env_remove("KIROKU_TOKEN_FILE")
        .env_remove("KIROKU_STORAGE_URL");
    cmd
}

#[test]
fn categories_list_works_end_to_end() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/admin/categories")
            .header("authorization", "cli-token");
        then.status(200).json_body(json!({
            "categories": [{
                "id": 1,
                "name": "Rust",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }]
        }));
    });

    let token = token_file("cli-token");
    let assert = cli()
        .env("KIROKU_SITE_URL", server.base_url())
        .env("KIROKU_TOKEN_FILE", token.path())
        .args(["categories", "list"])
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("\"name\": \"Rust\""));
    mock.assert();
}

#[test]
fn public_show_prints_server_message_on_404() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/posts/99");
        then.status(404)
            .json_body(json!({ "message": "記事が見つかりません。" }));
    });

    cli()
        .env("KIROKU_SITE_URL", server.base_url())
        .args(["public", "show", "99"])
        .assert()
        .failure()
        .stderr(contains("記事が見つかりません。"));
}

#[test]
fn thumbnail_resolves_without_network() {
    cli()
        .args([
            "--site",
            "https://blog.example.com",
            "thumbnail",
            "private/a.png",
        ])
        .assert()
        .success()
        .stdout(contains(
            "https://blog.example.com/storage/post_thumbnail/private/a.png",
        ));
}

#[test]
fn missing_site_fails_fast() {
    cli()
        .args(["categories", "list"])
        .assert()
        .failure()
        .stderr(contains("MissingSite"));
}
