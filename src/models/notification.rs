use serde::Serialize;

/// In-app reminder written alongside the dispatch sentinel.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub id: i64,
    pub owner_id: String,
    pub event_id: i64,
    pub check_index: u32,
    pub title: String,
    pub message: String,
    pub created_at: String,
    pub read: bool,
}
