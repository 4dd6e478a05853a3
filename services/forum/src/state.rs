//! Application state shared across handlers

use sqlx::PgPool;

use crate::repositories::{
    PostRepository, ReplyRepository, StatsRepository, UserRepository, VoteRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub post_repository: PostRepository,
    pub reply_repository: ReplyRepository,
    pub vote_repository: VoteRepository,
    pub stats_repository: StatsRepository,
}
