#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;

use kiroku::application::admin::categories::AdminCategoryService;
use kiroku::application::admin::posts::AdminPostService;
use kiroku::application::feed::FeedService;
use kiroku::application::identity::{IdentityProvider, StaticTokenIdentity};
use kiroku::application::repos::{CategoriesRepo, CategoriesWriteRepo, PostsRepo, PostsWriteRepo};
use kiroku::application::uploads::{ObjectStorage, ThumbnailUploadService};
use kiroku::infra::db::SqliteRepositories;
use kiroku::infra::http::{AdminState, HttpState, RouterState, build_router};
use kiroku::infra::uploads::UploadStorage;

pub const ADMIN_TOKEN: &str = "admin-token";

pub struct Repos {
    pub posts: Arc<dyn PostsRepo>,
    pub posts_write: Arc<dyn PostsWriteRepo>,
    pub categories: Arc<dyn CategoriesRepo>,
    pub categories_write: Arc<dyn CategoriesWriteRepo>,
}

pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
}

pub async fn sqlite() -> (Arc<SqliteRepositories>, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("blog.db").display());
    let pool = SqliteRepositories::connect(&url, 1)
        .await
        .expect("connect sqlite");
    SqliteRepositories::run_migrations(&pool)
        .await
        .expect("run migrations");
    (Arc::new(SqliteRepositories::new(pool)), dir)
}

/// Router over a temporary SQLite database, accepting [`ADMIN_TOKEN`].
pub async fn sqlite_app() -> TestApp {
    let (db, dir) = sqlite().await;
    let repos = Repos {
        posts: db.clone(),
        posts_write: db.clone(),
        categories: db.clone(),
        categories_write: db.clone(),
    };
    let router = app_with(db, repos, &dir);
    TestApp { router, dir }
}

pub fn app_with(db: Arc<SqliteRepositories>, repos: Repos, dir: &TempDir) -> Router {
    let storage = Arc::new(
        UploadStorage::new(
            dir.path().join("storage"),
            "post_thumbnail",
            Url::parse("http://blog.test").expect("url"),
        )
        .expect("storage"),
    );
    let object_storage: Arc<dyn ObjectStorage> = storage.clone();
    let identity: Arc<dyn IdentityProvider> = Arc::new(StaticTokenIdentity::new([ADMIN_TOKEN]));

    let state = RouterState {
        http: HttpState {
            feed: Arc::new(FeedService::new(repos.posts.clone())),
            db,
            upload_storage: storage,
        },
        admin: AdminState {
            identity,
            posts: Arc::new(AdminPostService::new(repos.posts, repos.posts_write)),
            categories: Arc::new(AdminCategoryService::new(
                repos.categories,
                repos.categories_write,
            )),
            uploads: Arc::new(ThumbnailUploadService::new(object_storage)),
            upload_body_limit: 1024 * 1024,
        },
    };
    build_router(state)
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn admin(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send(router, method, uri, Some(ADMIN_TOKEN), body).await
}
