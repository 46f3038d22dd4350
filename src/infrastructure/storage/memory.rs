//! In-memory user storage

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    DomainError, DomainResult, EmailScope, ListUsersQuery, User, UserRepository,
};
use crate::shared::{PaginatedResult, PaginationParams};

/// In-memory storage for development and testing.
///
/// `active_emails` maps the email of every live user to its id. Claiming an
/// email goes through a single `DashMap` entry, which makes the uniqueness
/// check and the claim one atomic step.
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
    active_emails: DashMap<String, String>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            active_emails: DashMap::new(),
        }
    }

    fn claim_email(&self, email: &str, id: &str) -> DomainResult<()> {
        match self.active_emails.entry(email.to_string()) {
            Entry::Occupied(holder) if holder.get() != id => Err(email_taken(email)),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(())
            }
        }
    }

    fn release_email(&self, email: &str, id: &str) {
        self.active_emails.remove_if(email, |_, holder| holder == id);
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn email_taken(email: &str) -> DomainError {
    DomainError::Conflict(format!("email {} is already in use", email))
}

fn live_email(user: &User) -> Option<&str> {
    (!user.is_deleted()).then_some(user.email.as_str())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> DomainResult<User> {
        // The id slot is held while the email is claimed, so a duplicate id
        // never reaches the email index.
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "user {} already exists",
                user.id
            ))),
            Entry::Vacant(slot) => {
                if let Some(email) = live_email(&user) {
                    self.claim_email(email, &user.id)?;
                }
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn update(&self, mut user: User) -> DomainResult<User> {
        let Some(mut stored) = self.users.get_mut(&user.id) else {
            return Err(DomainError::user_not_found(&user.id));
        };

        // Once stamped, deleted_at stays; a stale live copy cannot undo it.
        user.deleted_at = stored.deleted_at.or(user.deleted_at);

        let old_email = live_email(&stored).map(str::to_string);
        let new_email = live_email(&user);

        if let Some(email) = new_email {
            self.claim_email(email, &user.id)?;
        }
        if let Some(old) = old_email.as_deref() {
            if new_email != Some(old) {
                self.release_email(old, &user.id);
            }
        }

        *stored = user.clone();
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str, scope: EmailScope) -> DomainResult<Option<User>> {
        match scope {
            EmailScope::Active => {
                let Some(id) = self.active_emails.get(email).map(|id| id.clone()) else {
                    return Ok(None);
                };
                Ok(self.users.get(&id).map(|u| u.clone()))
            }
            EmailScope::Any => Ok(self
                .users
                .iter()
                .filter(|u| u.email == email)
                .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
                .map(|u| u.clone())),
        }
    }

    async fn find_by_api_token(&self, token: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| !u.is_deleted() && u.api_token.as_deref() == Some(token))
            .map(|u| u.clone()))
    }

    async fn list(&self, query: ListUsersQuery) -> DomainResult<PaginatedResult<User>> {
        let params = PaginationParams::normalize(query.page, query.page_size);
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut matching: Vec<User> = self
            .users
            .iter()
            .filter(|u| query.include_deleted || !u.is_deleted())
            .filter(|u| match needle.as_deref() {
                Some(needle) => {
                    u.email.to_lowercase().contains(needle)
                        || u
                            .last_name
                            .as_deref()
                            .is_some_and(|name| name.to_lowercase().contains(needle))
                }
                None => true,
            })
            .map(|u| u.clone())
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit as usize)
            .collect();

        Ok(PaginatedResult::new(items, total, params.page, params.limit))
    }
}
