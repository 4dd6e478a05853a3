//! Reply model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Reply entity
///
/// Replies form a parent-pointer tree of arbitrary depth; presentation
/// flattens it to two levels (see `crate::thread`).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: String,
    pub parent_reply_id: Option<Uuid>,
    pub body: String,
    pub is_solution: bool,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a reply
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReplyRequest {
    pub user_id: String,
    pub body: String,
    pub parent_reply_id: Option<Uuid>,
}
