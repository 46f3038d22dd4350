use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::{debug, warn};

use crate::domain::{
    DomainError, DomainResult, EmailScope, ListUsersQuery, User, UserRepository,
};
use crate::infrastructure::database::entities::user;
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        last_name: model.last_name,
        password_hash: model.password_hash,
        api_token: model.api_token,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
        metadata: model.metadata,
    }
}

/// Unique violations become `Conflict`; everything else is passed through
/// as a storage failure.
fn write_err(e: DbErr) -> DomainError {
    let unique = matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || e.to_string().contains("UNIQUE")
        || e.to_string().contains("duplicate");

    if unique {
        debug!(error = %e, "Unique constraint rejected user write");
        DomainError::Conflict("email or id already in use".to_string())
    } else {
        warn!(error = %e, "User write failed");
        DomainError::Storage(e)
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn insert(&self, u: User) -> DomainResult<User> {
        let new_user = user::ActiveModel {
            id: Set(u.id),
            email: Set(u.email),
            last_name: Set(u.last_name),
            password_hash: Set(u.password_hash),
            api_token: Set(u.api_token),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
            deleted_at: Set(u.deleted_at),
            metadata: Set(u.metadata),
        };

        let model = new_user.insert(&self.db).await.map_err(write_err)?;
        Ok(user_model_to_domain(model))
    }

    async fn update(&self, u: User) -> DomainResult<User> {
        let id = u.id.clone();
        let existing = user::Entity::find_by_id(id.as_str()).one(&self.db).await?;

        let Some(existing) = existing else {
            return Err(DomainError::user_not_found(&id));
        };

        // deleted_at is left out of the row update so a stale copy cannot
        // clear it; stamping goes through the guarded statement below.
        let mut active: user::ActiveModel = existing.into();
        active.email = Set(u.email);
        active.last_name = Set(u.last_name);
        active.password_hash = Set(u.password_hash);
        active.api_token = Set(u.api_token);
        active.updated_at = Set(u.updated_at);
        active.metadata = Set(u.metadata);

        let mut updated = active.update(&self.db).await.map_err(write_err)?;

        if let (Some(at), None) = (u.deleted_at, updated.deleted_at) {
            user::Entity::update_many()
                .col_expr(user::Column::DeletedAt, Expr::value(at))
                .filter(user::Column::Id.eq(id.as_str()))
                .filter(user::Column::DeletedAt.is_null())
                .exec(&self.db)
                .await
                .map_err(write_err)?;

            updated = user::Entity::find_by_id(id.as_str())
                .one(&self.db)
                .await?
                .ok_or_else(|| DomainError::user_not_found(&id))?;
        }

        Ok(user_model_to_domain(updated))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_email(&self, email: &str, scope: EmailScope) -> DomainResult<Option<User>> {
        let mut query = user::Entity::find().filter(user::Column::Email.eq(email));

        query = match scope {
            EmailScope::Active => query.filter(user::Column::DeletedAt.is_null()),
            EmailScope::Any => query
                .order_by_desc(user::Column::CreatedAt)
                .order_by_desc(user::Column::Id),
        };

        let model = query.one(&self.db).await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_api_token(&self, token: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::ApiToken.eq(token))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        Ok(model.map(user_model_to_domain))
    }

    async fn list(&self, q: ListUsersQuery) -> DomainResult<PaginatedResult<User>> {
        let params = PaginationParams::normalize(q.page, q.page_size);

        let mut query = user::Entity::find();

        if !q.include_deleted {
            query = query.filter(user::Column::DeletedAt.is_null());
        }

        // Case-insensitive substring match on email or last name; LOWER on
        // both sides keeps Postgres in line with SQLite's LIKE.
        if let Some(ref search) = q.search {
            let pattern = format!("%{}%", search.to_lowercase());
            let email = Expr::expr(Func::lower(Expr::col(user::Column::Email)));
            let last_name = Expr::expr(Func::lower(Expr::col(user::Column::LastName)));
            query = query.filter(
                Condition::any()
                    .add(email.like(pattern.clone()))
                    .add(last_name.like(pattern)),
            );
        }

        query = query
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id);

        // Count total
        let total = query.clone().count(&self.db).await?;

        // Paginate
        let models = query
            .offset(params.offset())
            .limit(u64::from(params.limit))
            .all(&self.db)
            .await?;

        let items: Vec<User> = models.into_iter().map(user_model_to_domain).collect();

        Ok(PaginatedResult::new(items, total, params.page, params.limit))
    }
}
