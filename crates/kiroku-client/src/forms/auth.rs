use crate::session::{IdentityClient, Session};

use super::{Action, ActionFlags, FormError};

const EMAIL_REQUIRED: &str = "メールアドレスは必須です。";
const PASSWORD_REQUIRED: &str = "パスワードは必須です。";
pub const CONFIRMATION_SENT: &str = "確認メールを送信しました。";

/// Email and password form shared by the sign-in and sign-up screens.
#[derive(Debug, Default)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
    actions: ActionFlags,
}

impl CredentialsForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            actions: ActionFlags::default(),
        }
    }

    pub fn actions(&self) -> &ActionFlags {
        &self.actions
    }

    fn validate(&self) -> Result<(), FormError> {
        if self.email.trim().is_empty() {
            return Err(FormError::Required(EMAIL_REQUIRED));
        }
        if self.password.is_empty() {
            return Err(FormError::Required(PASSWORD_REQUIRED));
        }
        Ok(())
    }

    pub async fn sign_in(&mut self, identity: &IdentityClient) -> Result<Session, FormError> {
        self.validate()?;
        let _guard = self.actions.begin(Action::Submit)?;
        Ok(identity.sign_in(self.email.trim(), &self.password).await?)
    }

    /// Registers the account and clears the form once the confirmation mail is on its way.
    pub async fn sign_up(
        &mut self,
        identity: &IdentityClient,
        redirect_to: &str,
    ) -> Result<&'static str, FormError> {
        self.validate()?;
        let guard = self.actions.begin(Action::Submit)?;
        identity
            .sign_up(self.email.trim(), &self.password, redirect_to)
            .await?;
        drop(guard);

        self.email.clear();
        self.password.clear();
        Ok(CONFIRMATION_SENT)
    }
}
