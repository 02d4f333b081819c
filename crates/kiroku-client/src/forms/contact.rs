use serde::Serialize;

use crate::request::ApiClient;

use super::{Action, ActionFlags, FormError};

const NAME_REQUIRED: &str = "お名前は必須です。";
const NAME_TOO_LONG: &str = "お名前は30文字以内で入力してください。";
const EMAIL_REQUIRED: &str = "メールアドレスは必須です。";
const EMAIL_INVALID: &str = "メールアドレスの形式が正しくありません。";
const MESSAGE_REQUIRED: &str = "本文は必須です。";
const MESSAGE_TOO_LONG: &str = "本文は500文字以内で入力してください。";
pub const SENT_NOTICE: &str = "送信しました。";

const NAME_MAX_CHARS: usize = 30;
const MESSAGE_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub message: Option<&'static str>,
}

impl ContactErrors {
    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    fn first(&self) -> Option<&'static str> {
        self.name.or(self.email).or(self.message)
    }
}

/// Public inquiry form posting to an external endpoint.
#[derive(Debug)]
pub struct ContactForm {
    endpoint: String,
    pub name: String,
    pub email: String,
    pub message: String,
    errors: ContactErrors,
    actions: ActionFlags,
}

impl ContactForm {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            name: String::new(),
            email: String::new(),
            message: String::new(),
            errors: ContactErrors::default(),
            actions: ActionFlags::default(),
        }
    }

    pub fn errors(&self) -> &ContactErrors {
        &self.errors
    }

    pub fn actions(&self) -> &ActionFlags {
        &self.actions
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
        self.errors = ContactErrors::default();
    }

    pub fn validate(&mut self) -> Result<ContactRequest, FormError> {
        self.errors = ContactErrors {
            name: check_length(&self.name, NAME_REQUIRED, NAME_MAX_CHARS, NAME_TOO_LONG),
            email: if self.email.is_empty() {
                Some(EMAIL_REQUIRED)
            } else if !looks_like_email(&self.email) {
                Some(EMAIL_INVALID)
            } else {
                None
            },
            message: check_length(
                &self.message,
                MESSAGE_REQUIRED,
                MESSAGE_MAX_CHARS,
                MESSAGE_TOO_LONG,
            ),
        };

        if let Some(first) = self.errors.first() {
            return Err(FormError::Invalid(first));
        }
        Ok(ContactRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
        })
    }

    /// Sends the inquiry and clears the form on success.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<&'static str, FormError> {
        let request = self.validate()?;
        let guard = self.actions.begin(Action::Submit)?;
        api.post_discard(&self.endpoint, None, &request).await?;
        drop(guard);

        self.clear();
        Ok(SENT_NOTICE)
    }
}

fn check_length(
    value: &str,
    required: &'static str,
    max_chars: usize,
    too_long: &'static str,
) -> Option<&'static str> {
    if value.is_empty() {
        Some(required)
    } else if value.chars().count() > max_chars {
        Some(too_long)
    } else {
        None
    }
}

/// The whole value is `x@y.z` with no whitespace anywhere.
fn looks_like_email(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let skip = first.len_utf8();
    let Some(at) = value[skip..].find('@').map(|at| at + skip) else {
        return false;
    };
    value
        .rfind('.')
        .is_some_and(|dot| dot > at + 1 && dot + 1 < value.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn filled() -> ContactForm {
        let mut form = ContactForm::new("/contacts");
        form.name = "山田".into();
        form.email = "yamada@example.com".into();
        form.message = "こんにちは".into();
        form
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("a@b.c"));
        assert!(looks_like_email("first.last@mail.example.co"));
        assert!(looks_like_email("@a@b.c"));
        assert!(looks_like_email("山田@例え.jp"));
        assert!(!looks_like_email("x a@b.co y"));
        assert!(!looks_like_email("foo bar@x.com"));
        assert!(!looks_like_email("a@b.c trailing"));
        assert!(!looks_like_email(" a@b.c"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.c"));
        assert!(!looks_like_email("a@.c"));
        assert!(!looks_like_email("a@b."));
    }

    #[test]
    fn every_field_reports_its_own_message() {
        let mut form = ContactForm::new("/contacts");
        form.name = "あ".repeat(31);
        form.email = "nope".into();
        form.message = String::new();

        let err = form.validate().unwrap_err();
        assert!(matches!(err, FormError::Invalid(NAME_TOO_LONG)));
        assert_eq!(
            form.errors(),
            &ContactErrors {
                name: Some(NAME_TOO_LONG),
                email: Some(EMAIL_INVALID),
                message: Some(MESSAGE_REQUIRED),
            }
        );

        form.name = "あ".repeat(30);
        form.email = "a@b.jp".into();
        form.message = "x".repeat(500);
        assert!(form.validate().is_ok());
        assert!(form.errors().is_empty());
    }

    #[tokio::test]
    async fn successful_submit_clears_the_form() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/contacts").json_body(json!({
                "name": "山田",
                "email": "yamada@example.com",
                "message": "こんにちは"
            }));
            then.status(200);
        });
        let api = ApiClient::new(&server.base_url()).expect("client");

        let mut form = filled();
        assert_eq!(form.submit(&api).await.expect("submit"), SENT_NOTICE);
        mock.assert();
        assert!(form.name.is_empty() && form.message.is_empty());
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/contacts");
            then.status(200);
        });
        let api = ApiClient::new(&server.base_url()).expect("client");

        let mut form = filled();
        form.email.clear();
        assert!(form.submit(&api).await.is_err());
        assert_eq!(form.errors().email, Some(EMAIL_REQUIRED));
        mock.assert_calls(0);
    }
}
