//! User domain entity

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::view::{ReadOptions, UserView};
use super::{NewUser, UserPatch};
use crate::domain::{DomainError, DomainResult};

/// User record as persisted.
///
/// `created_at` is stamped once; `updated_at` moves forward on every update;
/// `deleted_at` is set by soft deletion and never cleared.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    /// `usr_`-prefixed identifier, immutable once persisted
    pub id: String,
    /// Unique among live records
    pub email: String,
    pub last_name: Option<String>,
    /// Only exposed through a sensitive projection
    pub password_hash: Option<String>,
    pub api_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Opaque to the lifecycle; stored as given
    pub metadata: Option<Value>,
}

impl User {
    /// Finalize a candidate whose id is already assigned.
    ///
    /// Both timestamps get the same instant.
    pub(crate) fn from_candidate(candidate: NewUser, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: candidate.email,
            last_name: candidate.last_name,
            password_hash: candidate.password_hash,
            api_token: candidate.api_token,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            metadata: candidate.metadata,
        }
    }

    /// Live records have no deletion timestamp
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Apply a patch and refresh `updated_at`.
    ///
    /// The whole patch is checked before anything is written, so a rejected
    /// patch leaves the record untouched. `updated_at` never moves backwards,
    /// even if the clock does.
    pub fn apply_patch(&mut self, patch: UserPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if patch.id.as_ref().is_some_and(|id| *id != self.id) {
            return Err(DomainError::ImmutableField { field: "id" });
        }
        if patch.created_at.is_some_and(|at| at != self.created_at) {
            return Err(DomainError::ImmutableField {
                field: "created_at",
            });
        }
        if patch.email.as_deref().is_some_and(is_blank) {
            return Err(DomainError::Validation("email must not be empty".to_string()));
        }

        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(api_token) = patch.api_token {
            self.api_token = api_token;
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = metadata;
        }

        self.updated_at = now.max(self.updated_at);
        Ok(())
    }

    /// Stamp `deleted_at`. Other fields, `updated_at` included, stay as they are.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted {
                id: self.id.clone(),
            });
        }
        self.deleted_at = Some(now);
        Ok(())
    }

    /// Shape the record for a reader. `password_hash` is dropped unless the
    /// caller asks for sensitive fields.
    pub fn project(&self, options: ReadOptions) -> UserView {
        UserView {
            id: self.id.clone(),
            email: self.email.clone(),
            last_name: self.last_name.clone(),
            api_token: self.api_token.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
            metadata: self.metadata.clone(),
            password_hash: if options.include_sensitive {
                self.password_hash.clone()
            } else {
                None
            },
        }
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// ── Tests ──────────────────────────────────────────────────────
