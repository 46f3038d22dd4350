//! Credential helpers: password hashing and API tokens

pub mod api_token;
pub mod password;

pub use api_token::generate_api_token;
pub use password::{hash_password, verify_password};
