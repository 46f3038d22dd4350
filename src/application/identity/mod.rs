//! Identity module: user lifecycle & authentication
//!
//! `UserService` owns id assignment, timestamps and email uniqueness;
//! `Authenticator` checks passwords and API tokens.

pub mod authentication;
pub mod service;

pub use authentication::Authenticator;
pub use service::UserService;
