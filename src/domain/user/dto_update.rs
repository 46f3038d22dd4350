use chrono::{DateTime, Utc};
use serde_json::Value;

/// Changes to apply to an existing user.
///
/// For the nullable fields the outer `Option` says whether to touch the field
/// and the inner one is the new value, so `Some(None)` clears it.
/// `id` and `created_at` are accepted only when they match the stored values.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub last_name: Option<Option<String>>,
    pub password_hash: Option<Option<String>>,
    pub api_token: Option<Option<String>>,
    pub metadata: Option<Option<Value>>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn last_name(mut self, last_name: Option<String>) -> Self {
        self.last_name = Some(last_name);
        self
    }

    pub fn password_hash(mut self, password_hash: Option<String>) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    pub fn api_token(mut self, api_token: Option<String>) -> Self {
        self.api_token = Some(api_token);
        self
    }

    pub fn metadata(mut self, metadata: Option<Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
