//! User identifier generation
//!
//! Ids are `usr_` followed by a ULID: 26 Crockford base32 characters whose
//! leading part encodes the creation millisecond, so ids sort by creation time.

use ulid::Ulid;

use super::NewUser;

/// Prefix carried by every generated user id
pub const USER_ID_PREFIX: &str = "usr_";

/// Length of the ULID part of an id
pub const USER_ID_TOKEN_LEN: usize = 26;

/// Generate a fresh `usr_<ulid>` identifier
pub fn generate_user_id() -> String {
    format!("{}{}", USER_ID_PREFIX, Ulid::new())
}

/// Assign an id to the candidate if it has none (or an empty one).
///
/// A caller-supplied id is kept as is. Returns the id the candidate ends up with.
pub fn prepare_for_insert(candidate: &mut NewUser) -> &str {
    if candidate.id.as_deref().map_or(true, str::is_empty) {
        candidate.id = Some(generate_user_id());
    }
    candidate.id.as_deref().unwrap_or_default()
}

/// Whether `id` has the shape of a generated user id
pub fn is_generated_user_id(id: &str) -> bool {
    id.strip_prefix(USER_ID_PREFIX)
        .is_some_and(|token| token.len() == USER_ID_TOKEN_LEN && Ulid::from_string(token).is_ok())
}
