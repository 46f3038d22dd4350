//! Domain layer: the User aggregate and the types it is built from

pub mod user;

pub use user::{
    EmailReusePolicy, EmailScope, ListUsersQuery, NewUser, ReadOptions, User, UserPatch,
    UserRepository, UserView,
};

pub use crate::shared::{DomainError, DomainResult};
