//! API token generation for users

use rand::Rng;

/// Prefix that marks a string as a user API token
pub const API_TOKEN_PREFIX: &str = "usrtok_";

/// Generate a new API token: `usrtok_<32 hex chars>`
pub fn generate_api_token() -> String {
    let mut rng = rand::thread_rng();

    // 16 random bytes = 32 hex chars
    let random_bytes: [u8; 16] = rng.gen();
    format!("{}{}", API_TOKEN_PREFIX, hex::encode(random_bytes))
}
