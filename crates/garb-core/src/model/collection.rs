use super::id::{CollectionId, UserId};
use serde::{Deserialize, Serialize};

/// A named group of garments.
///
/// Manual collections own their membership directly via add/remove.
/// Smart collections (`is_smart`) derive membership from their rules; the
/// synchronizer is the only writer of their membership rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
    pub is_smart: bool,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}
