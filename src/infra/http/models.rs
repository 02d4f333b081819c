use kiroku_api_types::{
    CategoryBody, CategorySummary, PostBody, PostCategoryLink, UploadResponse,
};

use crate::application::uploads::UploadedThumbnail;
use crate::domain::entities::{CategoryRecord, PostWithCategories};

impl From<PostWithCategories> for PostBody {
    fn from(value: PostWithCategories) -> Self {
        let PostWithCategories { post, categories } = value;
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            thumbnail_image_key: post.thumbnail_image_key,
            created_at: post.created_at,
            updated_at: post.updated_at,
            post_categories: categories
                .into_iter()
                .map(|category| PostCategoryLink {
                    category: CategorySummary {
                        id: category.id,
                        name: category.name,
                    },
                })
                .collect(),
        }
    }
}

impl From<CategoryRecord> for CategoryBody {
    fn from(value: CategoryRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<UploadedThumbnail> for UploadResponse {
    fn from(value: UploadedThumbnail) -> Self {
        Self {
            key: value.key,
            url: value.url,
        }
    }
}
