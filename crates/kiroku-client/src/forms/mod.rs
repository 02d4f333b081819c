//! Admin and public form state. Validation always runs before any request is made.

pub mod actions;
pub mod auth;
pub mod category;
pub mod contact;
pub mod post;

pub use actions::{Action, ActionFlags, ActionGuard};
pub use auth::CredentialsForm;
pub use category::{CategoryForm, CategoryFormMode};
pub use contact::{ContactErrors, ContactForm, ContactRequest};
pub use post::{PostForm, PostFormMode};

use thiserror::Error;

use crate::error::ClientError;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0}")]
    Required(&'static str),
    #[error("{0}")]
    Invalid(&'static str),
    #[error("another action is in progress")]
    Busy,
    #[error("form is not editing an existing record")]
    NotEditing,
    #[error(transparent)]
    Client(#[from] ClientError),
}
