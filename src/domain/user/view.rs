//! Read projections of a user

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Controls which fields a projection carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Include `password_hash`. Reserved for internal authentication flows.
    pub include_sensitive: bool,
}

impl ReadOptions {
    pub fn sensitive() -> Self {
        Self {
            include_sensitive: true,
        }
    }
}

/// User as handed to readers.
///
/// `password_hash` is left out of the serialized form unless the projection
/// was built with [`ReadOptions::sensitive`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub last_name: Option<String>,
    pub api_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}
