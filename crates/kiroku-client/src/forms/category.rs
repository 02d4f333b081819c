use std::sync::{Mutex, PoisonError};

use kiroku_api_types::{
    CategoryBody, CategoryId, CategoryWriteRequest, CreatedResponse, MessageResponse,
};
use time::OffsetDateTime;

use crate::cache::{CacheKey, Mutation};
use crate::request::{ADMIN_CATEGORIES, ApiClient};

use super::{Action, ActionFlags, FormError};

pub const CATEGORY_NAME_REQUIRED: &str = "カテゴリー名を入力してください";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFormMode {
    Create,
    /// With `sync_from_source`, every new revision of the loaded category replaces local edits.
    Edit {
        id: CategoryId,
        sync_from_source: bool,
    },
}

#[derive(Debug)]
pub struct CategoryForm {
    mode: CategoryFormMode,
    pub name: String,
    seeded: Option<(CategoryId, OffsetDateTime)>,
    error_message: Mutex<Option<String>>,
    actions: ActionFlags,
}

impl CategoryForm {
    pub fn create() -> Self {
        Self::with_mode(CategoryFormMode::Create)
    }

    pub fn edit(id: CategoryId, sync_from_source: bool) -> Self {
        Self::with_mode(CategoryFormMode::Edit {
            id,
            sync_from_source,
        })
    }

    fn with_mode(mode: CategoryFormMode) -> Self {
        Self {
            mode,
            name: String::new(),
            seeded: None,
            error_message: Mutex::new(None),
            actions: ActionFlags::default(),
        }
    }

    pub fn mode(&self) -> CategoryFormMode {
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

    /// Copies the loaded category into the form; returns whether the name changed hands.
    pub fn seed(&mut self, source: &CategoryBody) -> bool {
        let revision = (source.id, source.updated_at);
        if self.seeded == Some(revision) {
            return false;
        }
        let sync = matches!(
            self.mode,
            CategoryFormMode::Edit {
                sync_from_source: true,
                ..
            }
        );
        if self.seeded.is_some() && !sync {
            return false;
        }

        self.name = source.name.clone();
        self.seeded = Some(revision);
        true
    }

    pub fn validated_request(&self) -> Result<CategoryWriteRequest, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Required(CATEGORY_NAME_REQUIRED));
        }
        Ok(CategoryWriteRequest {
            name: name.to_string(),
        })
    }

    pub async fn submit(
        &self,
        api: &ApiClient,
        token: Option<&str>,
    ) -> Result<CreatedResponse, FormError> {
        let request = self.checked_request()?;
        let _guard = self.actions.begin(Action::Submit)?;
        self.set_error(None);

        let mutation = Mutation::new(CacheKey::authorized(Some(ADMIN_CATEGORIES), token));
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
        let request = self.checked_request()?;
        let _guard = self.actions.begin(Action::Update)?;
        self.set_error(None);

        let endpoint = format!("{ADMIN_CATEGORIES}/{id}");
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

        let endpoint = format!("{ADMIN_CATEGORIES}/{id}");
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

    fn checked_request(&self) -> Result<CategoryWriteRequest, FormError> {
        self.validated_request().inspect_err(|err| {
            self.set_error(Some(err.to_string()));
        })
    }

    fn editing_id(&self) -> Result<CategoryId, FormError> {
        match self.mode {
            CategoryFormMode::Edit { id, .. } => Ok(id),
            CategoryFormMode::Create => Err(FormError::NotEditing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use time::macros::datetime;

    fn category(name: &str, updated_at: OffsetDateTime) -> CategoryBody {
        CategoryBody {
            id: 3,
            name: name.into(),
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at,
        }
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_a_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/admin/categories");
            then.status(201).json_body(json!({ "id": 1 }));
        });
        let api = ApiClient::new(&server.base_url()).expect("client");

        let mut form = CategoryForm::create();
        form.name = "   ".into();
        let err = form.submit(&api, Some("tok")).await.unwrap_err();

        assert!(matches!(err, FormError::Required(CATEGORY_NAME_REQUIRED)));
        assert_eq!(form.error_message().as_deref(), Some(CATEGORY_NAME_REQUIRED));
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn update_sends_trimmed_name() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/admin/categories/3")
                .header("authorization", "tok")
                .json_body(json!({ "name": "Rust" }));
            then.status(200).json_body(json!({ "message": "OK" }));
        });
        let api = ApiClient::new(&server.base_url()).expect("client");

        let mut form = CategoryForm::edit(3, true);
        form.name = "  Rust ".into();
        form.update(&api, Some("tok")).await.expect("update");

        mock.assert();
        assert!(!form.actions().disabled());
        assert_eq!(form.error_message(), None);
    }

    #[tokio::test]
    async fn server_errors_surface_in_error_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/api/admin/categories/3");
            then.status(400)
                .json_body(json!({ "message": "resource not found" }));
        });
        let api = ApiClient::new(&server.base_url()).expect("client");

        let form = CategoryForm::edit(3, false);
        assert!(form.delete(&api, Some("tok")).await.is_err());
        assert_eq!(form.error_message().as_deref(), Some("resource not found"));
    }

    #[tokio::test]
    async fn missing_token_never_reaches_the_server() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/admin/categories");
            then.status(201).json_body(json!({ "id": 1 }));
        });
        let api = ApiClient::new(&server.base_url()).expect("client");

        let mut form = CategoryForm::create();
        form.name = "Rust".into();
        let err = form.submit(&api, None).await.unwrap_err();

        assert!(matches!(err, FormError::Client(crate::ClientError::NotReady)));
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn flags_disable_the_form_while_a_request_is_in_flight() {
        let server = MockServer::start();
        let put = server.mock(|when, then| {
            when.method(PUT).path("/api/admin/categories/3");
            then.status(200)
                .json_body(json!({ "message": "OK" }))
                .delay(std::time::Duration::from_millis(200));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/admin/categories/3");
            then.status(200).json_body(json!({ "message": "OK" }));
        });
        let api = ApiClient::new(&server.base_url()).expect("client");

        let mut form = CategoryForm::edit(3, false);
        form.name = "Rust".into();

        let (updated, (disabled, updating, second)) = tokio::join!(
            form.update(&api, Some("tok")),
            async {
                while !form.actions().is_updating() {
                    tokio::task::yield_now().await;
                }
                let disabled = form.actions().disabled();
                let updating = form.actions().is_updating();
                (disabled, updating, form.delete(&api, Some("tok")).await)
            }
        );

        updated.expect("update");
        assert!(disabled && updating);
        assert!(matches!(second, Err(FormError::Busy)));
        assert!(!form.actions().disabled());
        put.assert();
        delete.assert_calls(0);
    }

    #[test]
    fn seeding_copies_once_unless_syncing() {
        let first = category("Tech", datetime!(2024-01-01 00:00 UTC));
        let second = category("Technology", datetime!(2024-01-02 00:00 UTC));

        let mut pinned = CategoryForm::edit(3, false);
        assert!(pinned.seed(&first));
        pinned.name = "local edit".into();
        assert!(!pinned.seed(&second));
        assert_eq!(pinned.name, "local edit");

        let mut synced = CategoryForm::edit(3, true);
        synced.seed(&first);
        synced.name = "local edit".into();
        assert!(!synced.seed(&first));
        assert_eq!(synced.name, "local edit");
        assert!(synced.seed(&second));
        assert_eq!(synced.name, "Technology");
    }

    #[test]
    fn update_requires_edit_mode() {
        let form = CategoryForm::create();
        assert!(matches!(form.editing_id(), Err(FormError::NotEditing)));
    }
}
