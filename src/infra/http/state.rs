use std::sync::Arc;

use axum::extract::FromRef;

use crate::application::admin::categories::AdminCategoryService;
use crate::application::admin::posts::AdminPostService;
use crate::application::feed::FeedService;
use crate::application::identity::IdentityProvider;
use crate::application::uploads::ThumbnailUploadService;
use crate::infra::db::SqliteRepositories;
use crate::infra::uploads::UploadStorage;

/// State for anonymous routes.
#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub db: Arc<SqliteRepositories>,
    pub upload_storage: Arc<UploadStorage>,
}

/// State for token-gated admin routes.
#[derive(Clone)]
pub struct AdminState {
    pub identity: Arc<dyn IdentityProvider>,
    pub posts: Arc<AdminPostService>,
    pub categories: Arc<AdminCategoryService>,
    pub uploads: Arc<ThumbnailUploadService>,
    pub upload_body_limit: usize,
}

#[derive(Clone)]
pub struct RouterState {
    pub http: HttpState,
    pub admin: AdminState,
}

impl FromRef<RouterState> for HttpState {
    fn from_ref(state: &RouterState) -> Self {
        state.http.clone()
    }
}

impl FromRef<RouterState> for AdminState {
    fn from_ref(state: &RouterState) -> Self {
        state.admin.clone()
    }
}
