//! # User Store
//!
//! Persistence core for user records: `usr_`-prefixed ULID identifiers,
//! automatic creation/update/soft-deletion timestamps, email uniqueness
//! among live users, and read projections that keep the password hash
//! out of ordinary reads.
//!
//! ## Architecture
//!
//! - **domain**: the `User` aggregate, its DTOs, projections and repository trait
//! - **application**: `UserService` (lifecycle) and `Authenticator`
//! - **infrastructure**: SeaORM and in-memory repositories, migrations, credentials
//! - **shared**: errors, pagination, clock

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

// Re-export the main entry points for easy access
pub use application::{Authenticator, UserService};
pub use domain::{DomainError, DomainResult, NewUser, ReadOptions, User, UserPatch, UserView};
pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryUserRepository, SeaOrmUserRepository,
};
