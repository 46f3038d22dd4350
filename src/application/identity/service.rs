//! User lifecycle service: application-layer orchestration
//!
//! Identifier assignment, timestamping, email uniqueness and read
//! projections for users all go through here. The pure steps
//! (`prepare_for_insert`, `on_update`, `soft_delete`, `project_for_read`)
//! never touch storage; `on_create` makes one lookup for the email check.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{model::is_blank, prepare_for_insert};
use crate::domain::{
    DomainError, DomainResult, EmailReusePolicy, ListUsersQuery, NewUser, ReadOptions, User,
    UserPatch, UserRepository, UserView,
};
use crate::shared::{Clock, PaginatedResult, SystemClock};

/// User lifecycle manager.
///
/// Generic over `R: UserRepository` so it stays decoupled from
/// the concrete persistence layer.
pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    email_reuse: EmailReusePolicy,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            clock: Arc::new(SystemClock),
            email_reuse: EmailReusePolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_email_reuse(mut self, policy: EmailReusePolicy) -> Self {
        self.email_reuse = policy;
        self
    }

    pub fn email_reuse(&self) -> EmailReusePolicy {
        self.email_reuse
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    // ── Lifecycle steps ─────────────────────────────────────────

    /// Give the candidate a `usr_` id unless it already carries one.
    pub fn prepare_for_insert<'a>(&self, candidate: &'a mut NewUser) -> &'a str {
        prepare_for_insert(candidate)
    }

    /// Turn a candidate into a finalized, not yet persisted, user.
    ///
    /// Fails with `Validation` on a blank email and with `Conflict` when the
    /// email is already taken under the configured reuse policy. Storage
    /// failures during the lookup are returned as they are.
    pub async fn on_create(&self, mut candidate: NewUser) -> DomainResult<User> {
        if is_blank(&candidate.email) {
            return Err(DomainError::Validation("email is required".into()));
        }

        let id = prepare_for_insert(&mut candidate).to_string();

        let scope = self.email_reuse.lookup_scope();
        if let Some(holder) = self.repo.find_by_email(&candidate.email, scope).await? {
            debug!(email = %candidate.email, holder = %holder.id, ?scope, "Email already taken");
            return Err(DomainError::Conflict(format!(
                "email {} is already in use",
                candidate.email
            )));
        }

        Ok(User::from_candidate(candidate, id, self.clock.now()))
    }

    /// Apply `patch` to a copy of `existing` and refresh `updated_at`.
    pub fn on_update(&self, existing: &User, patch: UserPatch) -> DomainResult<User> {
        let mut updated = existing.clone();
        updated.apply_patch(patch, self.clock.now())?;
        Ok(updated)
    }

    /// Soft-delete a copy of `existing`. `updated_at` is left alone.
    pub fn soft_delete(&self, existing: &User) -> DomainResult<User> {
        let mut deleted = existing.clone();
        deleted.mark_deleted(self.clock.now())?;
        Ok(deleted)
    }

    pub fn project_for_read(&self, user: &User, options: ReadOptions) -> UserView {
        user.project(options)
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Create and persist a user.
    ///
    /// If another writer inserts the same email in between, storage
    /// rejects this insert with `Conflict`.
    pub async fn create_user(&self, candidate: NewUser) -> DomainResult<User> {
        let user = self.on_create(candidate).await?;
        let user = self.repo.insert(user).await?;
        info!(user_id = %user.id, email = %user.email, "User created");
        Ok(user)
    }

    /// Update user fields.
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> DomainResult<User> {
        let existing = self.require(id).await?;
        let updated = self.on_update(&existing, patch)?;
        let updated = self.repo.update(updated).await?;
        debug!(user_id = %updated.id, updated_at = %updated.updated_at, "User updated");
        Ok(updated)
    }

    /// Soft-delete a user by ID.
    pub async fn soft_delete_user(&self, id: &str) -> DomainResult<User> {
        let existing = self.require(id).await?;
        let deleted = self.soft_delete(&existing)?;
        let deleted = self.repo.update(deleted).await?;
        info!(user_id = %deleted.id, "User soft-deleted");
        Ok(deleted)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Get a single user by ID, soft-deleted ones included.
    pub async fn get_user(&self, id: &str, options: ReadOptions) -> DomainResult<UserView> {
        let user = self.require(id).await?;
        Ok(self.project_for_read(&user, options))
    }

    /// List users with search and pagination, in the default projection.
    pub async fn list_users(&self, query: ListUsersQuery) -> DomainResult<PaginatedResult<UserView>> {
        let page = self.repo.list(query).await?;
        Ok(page.map(|user| user.project(ReadOptions::default())))
    }

    async fn require(&self, id: &str) -> DomainResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::is_generated_user_id;
    use crate::infrastructure::storage::InMemoryUserRepository;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::json;
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn service() -> (UserService<InMemoryUserRepository>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let svc = UserService::new(Arc::new(InMemoryUserRepository::new()))
            .with_clock(clock.clone());
        (svc, clock)
    }

    #[tokio::test]
    async fn create_assigns_id_and_equal_timestamps() {
        let (svc, clock) = service();
        let user = svc.create_user(NewUser::new("a@x.com")).await.unwrap();

        assert!(is_generated_user_id(&user.id));
        assert_eq!(user.created_at, clock.now());
        assert_eq!(user.created_at, user.updated_at);
        assert!(user.deleted_at.is_none());
    }

    #[tokio::test]
    async fn create_keeps_supplied_id() {
        let (svc, _) = service();
        let user = svc
            .create_user(NewUser::new("a@x.com").with_id("usr_restored"))
            .await
            .unwrap();
        assert_eq!(user.id, "usr_restored");
    }

    #[tokio::test]
    async fn create_rejects_blank_email() {
        let (svc, _) = service();
        let err = svc.on_create(NewUser::new("")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = svc.on_create(NewUser::new("  ")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_live_email_conflicts() {
        let (svc, _) = service();
        svc.create_user(NewUser::new("a@x.com")).await.unwrap();
        let err = svc.create_user(NewUser::new("a@x.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn email_is_reusable_after_soft_delete() {
        let (svc, clock) = service();
        let first = svc.create_user(NewUser::new("a@x.com")).await.unwrap();
        clock.advance(Duration::seconds(1));
        svc.soft_delete_user(&first.id).await.unwrap();

        let second = svc.create_user(NewUser::new("a@x.com")).await.unwrap();
        assert_ne!(second.id, first.id);

        // The deleted record is still retrievable by id.
        let old = svc.get_user(&first.id, ReadOptions::default()).await.unwrap();
        assert!(old.deleted_at.is_some());
    }

    #[tokio::test]
    async fn never_policy_keeps_deleted_emails_taken() {
        let (svc, _) = service();
        let svc = svc.with_email_reuse(EmailReusePolicy::Never);
        let first = svc.create_user(NewUser::new("a@x.com")).await.unwrap();
        svc.soft_delete_user(&first.id).await.unwrap();

        let err = svc.create_user(NewUser::new("a@x.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let (svc, clock) = service();
        let user = svc
            .create_user(NewUser::new("a@x.com").with_metadata(json!({ "k": 1 })))
            .await
            .unwrap();

        clock.advance(Duration::seconds(30));
        let updated = svc.update_user(&user.id, UserPatch::new()).await.unwrap();

        assert_eq!(updated.created_at, user.created_at);
        assert!(updated.updated_at > user.updated_at);
        assert_eq!(updated.metadata, user.metadata);
    }

    #[tokio::test]
    async fn update_rejects_id_change_and_persists_nothing() {
        let (svc, clock) = service();
        let user = svc.create_user(NewUser::new("a@x.com")).await.unwrap();
        clock.advance(Duration::seconds(1));

        let err = svc
            .update_user(&user.id, UserPatch::new().id("usr_new").last_name(Some("X".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ImmutableField { field: "id" }));

        let stored = svc.repository().find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored, user);
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_user_is_not_found() {
        let (svc, _) = service();
        let err = svc.update_user("usr_missing", UserPatch::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        let err = svc.soft_delete_user("usr_missing").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn soft_delete_keeps_updated_at_and_rejects_repeat() {
        let (svc, clock) = service();
        let user = svc.create_user(NewUser::new("a@x.com")).await.unwrap();

        clock.advance(Duration::minutes(5));
        let deleted = svc.soft_delete_user(&user.id).await.unwrap();
        assert_eq!(deleted.deleted_at, Some(clock.now()));
        assert_eq!(deleted.updated_at, user.updated_at);

        clock.advance(Duration::minutes(5));
        let err = svc.soft_delete_user(&user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyDeleted { .. }));

        let stored = svc.repository().find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.deleted_at, deleted.deleted_at);
    }

    #[tokio::test]
    async fn list_hides_deleted_users_and_password_hashes() {
        let (svc, clock) = service();
        let keep = svc
            .create_user(NewUser::new("keep@x.com").with_password_hash("secret"))
            .await
            .unwrap();
        clock.advance(Duration::seconds(1));
        let gone = svc.create_user(NewUser::new("gone@x.com")).await.unwrap();
        svc.soft_delete_user(&gone.id).await.unwrap();

        let page = svc.list_users(ListUsersQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, keep.id);
        assert!(page.items[0].password_hash.is_none());

        let all = svc
            .list_users(ListUsersQuery {
                include_deleted: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.items[0].id, gone.id);
    }

    #[tokio::test]
    async fn get_user_projects_as_requested() {
        let (svc, _) = service();
        let user = svc
            .create_user(NewUser::new("a@x.com").with_password_hash("hash"))
            .await
            .unwrap();

        let plain = svc.get_user(&user.id, ReadOptions::default()).await.unwrap();
        assert!(plain.password_hash.is_none());

        let sensitive = svc.get_user(&user.id, ReadOptions::sensitive()).await.unwrap();
        assert_eq!(sensitive.password_hash.as_deref(), Some("hash"));
    }
}
