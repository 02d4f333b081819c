use std::sync::Arc;

use thiserror::Error;

use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::entities::{PostId, PostWithCategories};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Read-only access to posts for anonymous visitors.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostsRepo>) -> Self {
        Self { posts }
    }

    pub async fn list_posts(&self) -> Result<Vec<PostWithCategories>, FeedError> {
        Ok(self.posts.list_posts().await?)
    }

    pub async fn find_post(&self, id: PostId) -> Result<Option<PostWithCategories>, FeedError> {
        Ok(self.posts.find_post(id).await?)
    }
}
