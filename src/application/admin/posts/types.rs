use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::entities::{CategoryId, PostId};

#[derive(Debug, Error)]
pub enum AdminPostError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub title: String,
    pub content: String,
    pub thumbnail_image_key: String,
    pub category_ids: Vec<CategoryId>,
}

/// Full replacement of a post's editable state, category set included.
#[derive(Debug, Clone)]
pub struct UpdatePostCommand {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub thumbnail_image_key: String,
    pub category_ids: Vec<CategoryId>,
}

/// Drops repeated ids while keeping first-seen order.
pub(crate) fn distinct_category_ids(ids: Vec<CategoryId>) -> Vec<CategoryId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
