use std::sync::{Mutex, PoisonError};

use kiroku_api_types::{
    CategoryId, CategoryRef, CreatedResponse, MessageResponse, PostBody, PostId, PostWriteRequest,
};
use time::OffsetDateTime;

use crate::cache::{CacheKey, Mutation};
use crate::request::{ADMIN_POSTS, ApiClient};

use super::{Action, ActionFlags, FormError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFormMode {
    Create,
    Edit { id: PostId },
}

/// Post editor state. The editor offers a single category selection.
#[derive(Debug)]
pub struct PostForm {
    mode: PostFormMode,
    pub title: String,
    pub content: String,
    pub thumbnail_image_key: String,
    pub selected_category: Option<CategoryId>,
    seeded: Option<(PostId, OffsetDateTime)>,
    error_message: Mutex<Option<String>>,
    actions: ActionFlags,
}

impl PostForm {
    pub fn create() -> Self {
        Self::with_mode(PostFormMode::Create)
    }

    pub fn edit(id: PostId) -> Self {
        Self::with_mode(PostFormMode::Edit { id })
    }

    fn with_mode(mode: PostFormMode) -> Self {
        Self {
            mode,
            title: String::new(),
            content: String::new(),
            thumbnail_image_key: String::new(),
            selected_category: None,
            seeded: None,
            error_message: Mutex::new(None),
            actions: ActionFlags::default(),
        }
    }

    pub fn mode(&self) -> PostFormMode {
        self.mode
    }

    pub fn error_message(&self) -> Option<String> {
        self.error_message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_error(&self, message: Option<String>) {
        *self
            .error_message
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = message;
    }

    pub fn actions(&self) -> &ActionFlags {
        &self.actions
    }

    /// Fills the form from a fetched post once per revision; the first category becomes the selection.
    pub fn seed(&mut self, source: &PostBody) -> bool {
        let revision = (source.id, source.updated_at);
        if self.seeded == Some(revision) {
            return false;
        }

        self.title = source.title.clone();
        self.content = source.content.clone();
        self.thumbnail_image_key = source.thumbnail_image_key.clone();
        self.selected_category = source.category_ids().first().copied();
        self.seeded = Some(revision);
        true
    }

    pub fn to_request(&self) -> PostWriteRequest {
        PostWriteRequest {
            title: self.title.clone(),
            content: self.content.clone(),
            thumbnail_image_key: self.thumbnail_image_key.clone(),
            categories: self
                .selected_category
                .map(|id| CategoryRef { id })
                .into_iter()
                .collect(),
        }
    }

    pub async fn submit(
        &self,
        api: &ApiClient,
        token: Option<&str>,
    ) -> Result<CreatedResponse, FormError> {
        let request = self.to_request();
        let _guard = self.actions.begin(Action::Submit)?;
        self.set_error(None);

        let mutation = Mutation::new(CacheKey::authorized(Some(ADMIN_POSTS), token));
        let result = mutation
            .trigger(request, |endpoint, token, body| async move {
                api.post(&endpoint, token.as_deref(), &body).await
            })
            .await;

        result.map_err(|err| {
            self.set_error(Some(err.to_string()));
            err.into()
        })
    }

    pub async fn update(&self, api: &ApiClient, token: Option<&str>) -> Result<(), FormError> {
        let id = self.editing_id()?;
        let request = self.to_request();
        let _guard = self.actions.begin(Action::Update)?;
        self.set_error(None);

        let endpoint = format!("{ADMIN_POSTS}/{id}");
        let mutation = Mutation::new(CacheKey::authorized(Some(&endpoint), token));
        let result: Result<MessageResponse, _> = mutation
            .trigger(request, |endpoint, token, body| async move {
                api.put(&endpoint, token.as_deref(), &body).await
            })
            .await;

        result.map(|_| ()).map_err(|err| {
            self.set_error(Some(err.to_string()));
            err.into()
        })
    }

    pub async fn delete(&self, api: &ApiClient, token: Option<&str>) -> Result<(), FormError> {
        let id = self.editing_id()?;
        let _guard = self.actions.begin(Action::Delete)?;
        self.set_error(None);

        let endpoint = format!("{ADMIN_POSTS}/{id}");
        let mutation = Mutation::new(CacheKey::authorized(Some(&endpoint), token));
        let result: Result<MessageResponse, _> = mutation
            .trigger((), |endpoint, token, ()| async move {
                api.delete(&endpoint, token.as_deref()).await
            })
            .await;

        result.map(|_| ()).map_err(|err| {
            self.set_error(Some(err.to_string()));
            err.into()
        })
    }

    fn editing_id(&self) -> Result<PostId, FormError> {
        match self.mode {
            PostFormMode::Edit { id } => Ok(id),
            PostFormMode::Create => Err(FormError::NotEditing),
        }
    }
}
