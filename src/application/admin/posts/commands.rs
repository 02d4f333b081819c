use tracing::info;

use crate::application::repos::{CreatePostParams, UpdatePostParams};
use crate::domain::entities::{PostId, PostRecord};
use crate::domain::time::now_utc;

use super::service::AdminPostService;
use super::types::{AdminPostError, CreatePostCommand, UpdatePostCommand, distinct_category_ids};

impl AdminPostService {
    pub async fn create_post(
        &self,
        actor: &str,
        command: CreatePostCommand,
    ) -> Result<PostRecord, AdminPostError> {
        let params = CreatePostParams {
            title: command.title,
            content: command.content,
            thumbnail_image_key: command.thumbnail_image_key,
            category_ids: distinct_category_ids(command.category_ids),
            created_at: now_utc(),
        };

        let post = self.writer.create_post(params).await?;
        info!(
            target = "kiroku::admin::posts",
            actor,
            post_id = post.id,
            "post created"
        );
        Ok(post)
    }

    pub async fn update_post(
        &self,
        actor: &str,
        command: UpdatePostCommand,
    ) -> Result<PostRecord, AdminPostError> {
        let category_ids = distinct_category_ids(command.category_ids);
        let category_count = category_ids.len();

        let params = UpdatePostParams {
            id: command.id,
            title: command.title,
            content: command.content,
            thumbnail_image_key: command.thumbnail_image_key,
            category_ids,
            updated_at: now_utc(),
        };

        let post = self.writer.update_post(params).await?;
        info!(
            target = "kiroku::admin::posts",
            actor,
            post_id = post.id,
            categories = category_count,
            "post updated"
        );
        Ok(post)
    }

    pub async fn delete_post(&self, actor: &str, id: PostId) -> Result<(), AdminPostError> {
        self.writer.delete_post(id).await?;
        info!(
            target = "kiroku::admin::posts",
            actor,
            post_id = id,
            "post deleted"
        );
        Ok(())
    }
}
