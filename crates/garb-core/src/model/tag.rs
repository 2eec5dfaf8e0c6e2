use super::id::{TagId, UserId};
use serde::{Deserialize, Serialize};

/// Default display color for new tags.
pub const DEFAULT_COLOR: &str = "#6b7280";

/// A user-defined tag. Names are unique per user, case-insensitively;
/// the store enforces this and reports duplicates as a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub user_id: UserId,
    pub name: String,
    /// Display color as a `#rrggbb` hex string.
    pub color: String,
    pub created_at_us: i64,
}
