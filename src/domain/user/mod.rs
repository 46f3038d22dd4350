//! User aggregate
//!
//! Contains the User entity, its identifier scheme, read projections,
//! DTOs, and the repository interface.

pub mod id;
pub mod model;
pub mod policy;
pub mod repository;
pub mod view;

mod dto_create;
mod dto_get;
mod dto_update;

// Re-export model types
pub use id::{generate_user_id, is_generated_user_id, prepare_for_insert, USER_ID_PREFIX};
pub use model::User;
pub use policy::EmailReusePolicy;
pub use view::{ReadOptions, UserView};

// Re-export DTOs
pub use dto_create::NewUser;
pub use dto_get::{EmailScope, ListUsersQuery};
pub use dto_update::UserPatch;

// Re-export repository trait
pub use repository::UserRepository;
