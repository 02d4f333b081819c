use crate::domain::entities::{PostId, PostWithCategories};

use super::service::AdminPostService;
use super::types::AdminPostError;

impl AdminPostService {
    pub async fn list_posts(&self) -> Result<Vec<PostWithCategories>, AdminPostError> {
        self.reader.list_posts().await.map_err(AdminPostError::from)
    }

    pub async fn find_post(
        &self,
        id: PostId,
    ) -> Result<Option<PostWithCategories>, AdminPostError> {
        self.reader.find_post(id).await.map_err(AdminPostError::from)
    }
}
