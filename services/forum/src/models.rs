//! Forum models for request and response payloads

use serde::{Deserialize, Serialize};

pub mod post;
pub mod reply;
pub mod user;
pub mod vote;

// Re-export for convenience
pub use post::{Category, CreatePostRequest, Post, PostDetailsResponse, PostListResponse, PostQuery};
pub use reply::{CreateReplyRequest, Reply};
pub use user::{RegisterUserRequest, UpdateUsernameRequest, User};
pub use vote::{CastVoteRequest, Vote, VoteResponse, VoteStatusQuery, VoteType};

/// Caller identity for author-gated operations
///
/// Authorization at this layer is a caller-supplied user id compared
/// against the stored author id; token verification happens upstream at
/// the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Caller {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response for the forum-wide statistics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub users: i64,
    pub posts: i64,
    pub replies: i64,
    pub votes: i64,
}
