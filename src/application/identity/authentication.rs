//! Credential checks against stored users
//!
//! This is the one caller of the sensitive read projection: the password
//! hash is read here and never handed back out.

use std::sync::Arc;

use tracing::{debug, info};

use super::service::UserService;
use crate::domain::{
    DomainError, DomainResult, EmailScope, ReadOptions, UserPatch, UserRepository, UserView,
};
use crate::infrastructure::crypto::{generate_api_token, hash_password, verify_password};

pub struct Authenticator<R: UserRepository> {
    users: Arc<UserService<R>>,
    bcrypt_cost: u32,
}

impl<R: UserRepository> Authenticator<R> {
    pub fn new(users: Arc<UserService<R>>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    /// Check an email/password pair against the live user holding that email.
    ///
    /// Unknown email, missing hash and wrong password are indistinguishable
    /// to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<UserView> {
        let user = self
            .users
            .repository()
            .find_by_email(email, EmailScope::Active)
            .await?
            .ok_or_else(invalid_credentials)?;

        let sensitive = self.users.project_for_read(&user, ReadOptions::sensitive());
        let Some(stored_hash) = sensitive.password_hash.as_deref() else {
            debug!(user_id = %user.id, "User has no password set");
            return Err(invalid_credentials());
        };

        if !verify_password(password, stored_hash) {
            return Err(invalid_credentials());
        }

        info!(user_id = %user.id, "User authenticated");
        Ok(self.users.project_for_read(&user, ReadOptions::default()))
    }

    /// Resolve a live user from an API token.
    pub async fn authenticate_token(&self, token: &str) -> DomainResult<UserView> {
        if token.is_empty() {
            return Err(DomainError::Unauthorized("Invalid API token".into()));
        }
        let user = self
            .users
            .repository()
            .find_by_api_token(token)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Invalid API token".into()))?;

        Ok(self.users.project_for_read(&user, ReadOptions::default()))
    }

    /// Hash and store a new password.
    pub async fn set_password(&self, user_id: &str, password: &str) -> DomainResult<UserView> {
        if password.is_empty() {
            return Err(DomainError::Validation("password must not be empty".into()));
        }
        let password_hash = hash_password(password, self.bcrypt_cost)?;
        let user = self
            .users
            .update_user(user_id, UserPatch::new().password_hash(Some(password_hash)))
            .await?;

        info!(user_id, "Password changed");
        Ok(self.users.project_for_read(&user, ReadOptions::default()))
    }

    /// Issue a fresh API token, replacing any previous one. The token is
    /// returned so the caller can hand it to the user.
    pub async fn rotate_api_token(&self, user_id: &str) -> DomainResult<String> {
        let token = generate_api_token();
        self.users
            .update_user(user_id, UserPatch::new().api_token(Some(token.clone())))
            .await?;

        info!(user_id, "API token rotated");
        Ok(token)
    }
}

fn invalid_credentials() -> DomainError {
    DomainError::Unauthorized("Invalid credentials".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewUser;
    use crate::infrastructure::storage::InMemoryUserRepository;

    const TEST_COST: u32 = 4;

    async fn setup() -> (Authenticator<InMemoryUserRepository>, String) {
        let users = Arc::new(UserService::new(Arc::new(InMemoryUserRepository::new())));
        let user = users.create_user(NewUser::new("a@x.com")).await.unwrap();
        let auth = Authenticator::new(users, TEST_COST);
        auth.set_password(&user.id, "correct horse").await.unwrap();
        (auth, user.id)
    }

    #[tokio::test]
    async fn correct_password_returns_default_view() {
        let (auth, id) = setup().await;
        let view = auth.authenticate("a@x.com", "correct horse").await.unwrap();
        assert_eq!(view.id, id);
        assert!(view.password_hash.is_none());
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_email_is_unauthorized() {
        let (auth, _) = setup().await;
        let err = auth.authenticate("a@x.com", "nope").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
        let err = auth.authenticate("b@x.com", "correct horse").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn user_without_password_cannot_log_in() {
        let users = Arc::new(UserService::new(Arc::new(InMemoryUserRepository::new())));
        users.create_user(NewUser::new("a@x.com")).await.unwrap();
        let auth = Authenticator::new(users, TEST_COST);

        let err = auth.authenticate("a@x.com", "").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn soft_deleted_user_cannot_log_in() {
        let (auth, id) = setup().await;
        auth.users.soft_delete_user(&id).await.unwrap();
        let err = auth.authenticate("a@x.com", "correct horse").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn rotated_token_authenticates_and_replaces_old_one() {
        let (auth, id) = setup().await;
        let first = auth.rotate_api_token(&id).await.unwrap();
        assert_eq!(auth.authenticate_token(&first).await.unwrap().id, id);

        let second = auth.rotate_api_token(&id).await.unwrap();
        assert!(auth.authenticate_token(&first).await.is_err());
        assert_eq!(auth.authenticate_token(&second).await.unwrap().id, id);
    }
}
