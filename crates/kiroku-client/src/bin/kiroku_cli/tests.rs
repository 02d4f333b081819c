use clap::Parser;
use httpmock::MockServer;
use serde_json::json;
use tempfile::NamedTempFile;

use crate::args::{CategoriesCmd, Cli, Commands, PostFields, PostsCmd};
use crate::client::{CliError, Ctx, build_ctx_from_cli};
use crate::handlers::{categories, posts};

fn ctx(server: &MockServer) -> Ctx {
    Ctx::new(&server.base_url(), Some("tok".into())).expect("ctx")
}

fn tmp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    std::io::Write::write_all(&mut file, contents.as_bytes()).expect("write tmp");
    file
}

#[tokio::test]
async fn token_file_wins_over_env() -> Result<(), CliError> {
    let file = tmp_file("file-token\n");
    let cli = Cli {
        site: Some("https://example.com".to_string()),
        token_file: Some(file.path().to_path_buf()),
        token_env: Some("env-token".to_string()),
        command: Commands::Categories(crate::args::CategoriesArgs {
            action: CategoriesCmd::List,
        }),
    };

    let ctx = build_ctx_from_cli(&cli)?;
    assert_eq!(ctx.token().await?, "file-token");
    Ok(())
}

#[tokio::test]
async fn admin_commands_need_a_token() {
    let ctx = Ctx::new("https://example.com", None).expect("ctx");
    let err = ctx.token().await.unwrap_err();
    assert!(matches!(err, CliError::MissingToken));
}

#[test]
fn missing_site_is_reported() {
    let cli = Cli::parse_from(["kiroku-cli", "public", "list"]);
    let cli = Cli { site: None, ..cli };
    assert!(matches!(
        build_ctx_from_cli(&cli),
        Err(CliError::MissingSite)
    ));
}

#[test]
fn category_and_no_category_conflict() {
    let parsed = Cli::try_parse_from([
        "kiroku-cli",
        "posts",
        "create",
        "--category",
        "1",
        "--no-category",
    ]);
    assert!(parsed.is_err());
}

#[tokio::test]
async fn categories_create_validates_before_sending() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/api/admin/categories");
        then.status(201).json_body(json!({ "id": 1 }));
    });

    let err = categories::handle(
        &ctx(&server),
        &CategoriesCmd::Create {
            name: "  ".into(),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "カテゴリー名を入力してください");
    mock.assert_calls(0);
}

#[tokio::test]
async fn posts_update_keeps_unspecified_fields() -> Result<(), CliError> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/admin/posts/4");
        then.status(200).json_body(json!({
            "post": {
                "id": 4,
                "title": "Old",
                "content": "<p>kept</p>",
                "thumbnailImageKey": "private/k.png",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z",
                "postCategories": [{ "category": { "id": 2, "name": "Rust" } }]
            }
        }));
    });
    let put = server.mock(|when, then| {
        when.method("PUT")
            .path("/api/admin/posts/4")
            .header("authorization", "tok")
            .json_body(json!({
                "title": "New",
                "content": "<p>kept</p>",
                "thumbnailImageKey": "private/k.png",
                "categories": []
            }));
        then.status(200).json_body(json!({ "message": "OK" }));
    });

    posts::handle(
        &ctx(&server),
        &PostsCmd::Update {
            id: 4,
            fields: PostFields {
                title: Some("New".into()),
                no_category: true,
                ..Default::default()
            },
        },
    )
    .await?;
    put.assert();
    Ok(())
}

#[tokio::test]
async fn posts_create_reads_content_file() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/api/admin/posts").json_body(json!({
            "title": "T",
            "content": "<p>from file</p>",
            "thumbnailImageKey": "",
            "categories": [{ "id": 3 }]
        }));
        then.status(201).json_body(json!({ "id": 10 }));
    });

    let file = tmp_file("<p>from file</p>");
    posts::handle(
        &ctx(&server),
        &PostsCmd::Create {
            fields: PostFields {
                title: Some("T".into()),
                content_file: Some(file.path().to_path_buf()),
                category: Some(3),
                ..Default::default()
            },
        },
    )
    .await?;
    mock.assert();
    Ok(())
}
