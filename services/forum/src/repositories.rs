//! Repositories for database operations

use anyhow::Result;
use sqlx::PgPool;

pub mod post;
pub mod reply;
pub mod user;
pub mod vote;

// Re-export for convenience
pub use post::PostRepository;
pub use reply::ReplyRepository;
pub use user::UserRepository;
pub use vote::{VoteRepository, VoteTarget};

use crate::models::StatsResponse;

/// Stats repository for forum-wide totals
#[derive(Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    /// Create a new stats repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Collect the forum-wide entity counts
    pub async fn collect(&self) -> Result<StatsResponse> {
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        let replies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM replies")
            .fetch_one(&self.pool)
            .await?;
        let votes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes")
            .fetch_one(&self.pool)
            .await?;

        Ok(StatsResponse {
            users,
            posts,
            replies,
            votes,
        })
    }
}
