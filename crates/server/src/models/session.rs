use breadbox_core::{Email, UserId, UserRole};
use serde::{Deserialize, Serialize};

/// The authenticated account stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
}

/// Session storage keys.
pub mod keys {
    pub const CURRENT_USER: &str = "current_user";
}
