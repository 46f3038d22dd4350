//! User storage interface

use async_trait::async_trait;

use super::{EmailScope, ListUsersQuery, User};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

/// Durable storage for users.
///
/// Implementations must enforce email uniqueness among live records
/// atomically: of two concurrent inserts with the same email, one fails
/// with `DomainError::Conflict`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a finalized user
    async fn insert(&self, user: User) -> DomainResult<User>;

    /// Overwrite the stored user with the same id. `NotFound` if there is none.
    ///
    /// A stored `deleted_at` is never cleared or moved: an incoming `None`
    /// keeps the stored stamp.
    async fn update(&self, user: User) -> DomainResult<User>;

    /// Find a user by id, soft-deleted or not
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    /// Find a user by email. With `EmailScope::Any` the newest match wins.
    async fn find_by_email(&self, email: &str, scope: EmailScope) -> DomainResult<Option<User>>;

    /// Find a live user holding this API token
    async fn find_by_api_token(&self, token: &str) -> DomainResult<Option<User>>;

    /// Page through users, newest first
    async fn list(&self, query: ListUsersQuery) -> DomainResult<PaginatedResult<User>>;
}
