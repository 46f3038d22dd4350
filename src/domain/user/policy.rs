use serde::{Deserialize, Serialize};

/// Whether the email of a soft-deleted user may be taken by a new user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailReusePolicy {
    /// Only live users hold on to their email
    #[default]
    AfterSoftDelete,
    /// An email, once used, stays taken even after soft deletion
    Never,
}

impl EmailReusePolicy {
    /// Records that count when checking whether an email is taken
    pub fn lookup_scope(self) -> super::EmailScope {
        match self {
            Self::AfterSoftDelete => super::EmailScope::Active,
            Self::Never => super::EmailScope::Any,
        }
    }
}
