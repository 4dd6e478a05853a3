//! Post model, categories, and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::thread::ThreadView;

/// Closed set of post categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Question,
    Discussion,
    Feedback,
    Announcement,
}

impl Category {
    /// Database representation of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Question => "question",
            Category::Discussion => "discussion",
            Category::Feedback => "feedback",
            Category::Announcement => "announcement",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Category::General),
            "question" => Ok(Category::Question),
            "discussion" => Ok(Category::Discussion),
            "feedback" => Ok(Category::Feedback),
            "announcement" => Ok(Category::Announcement),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// Post entity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub category: Category,
    pub author_id: String,
    pub solution_reply_id: Option<Uuid>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a post
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub user_id: String,
    pub title: String,
    pub body: String,
    /// Parsed against the closed category set by the handler so an unknown
    /// value surfaces as a validation failure rather than a decode error.
    pub category: String,
}

/// Query parameters for post listing
#[derive(Debug, Clone, Deserialize)]
pub struct PostQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    /// Filter by category
    pub category: Option<String>,
}

/// Response for post listing with pagination
#[derive(Debug, Clone, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// Response for the post details view: the post plus its assembled
/// two-level reply thread
#[derive(Debug, Serialize)]
pub struct PostDetailsResponse {
    pub post: Post,
    #[serde(flatten)]
    pub thread: ThreadView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for name in ["general", "question", "discussion", "feedback", "announcement"] {
            let category: Category = name.parse().expect("known category");
            assert_eq!(category.as_str(), name);
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Category::from_str("memes").is_err());
        assert!(Category::from_str("").is_err());
        // The set is closed and case-sensitive.
        assert!(Category::from_str("General").is_err());
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Announcement).unwrap();
        assert_eq!(json, "\"announcement\"");
    }
}
