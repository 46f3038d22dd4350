/// Listing filter. Soft-deleted users are left out unless `include_deleted` is set.
#[derive(Debug, Clone, Default)]
pub struct ListUsersQuery {
    /// Case-insensitive substring match on email or last name
    pub search: Option<String>,
    pub include_deleted: bool,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Which records an email lookup considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailScope {
    /// Only records without `deleted_at`
    Active,
    /// Live and soft-deleted records
    Any,
}
