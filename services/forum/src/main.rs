use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod models;
mod quote;
mod repositories;
mod routes;
mod state;
mod thread;
mod validation;

use common::database::{init_pool, run_migrations, DatabaseConfig};
use sqlx::migrate::Migrator;

use crate::repositories::{
    PostRepository, ReplyRepository, StatsRepository, UserRepository, VoteRepository,
};
use crate::state::AppState;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting forum service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Apply schema migrations
    run_migrations(&pool, &MIGRATOR).await?;

    info!("Forum service initialized successfully");

    // Initialize repositories
    let user_repository = UserRepository::new(pool.clone());
    let post_repository = PostRepository::new(pool.clone());
    let reply_repository = ReplyRepository::new(pool.clone());
    let vote_repository = VoteRepository::new(pool.clone());
    let stats_repository = StatsRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        user_repository,
        post_repository,
        reply_repository,
        vote_repository,
        stats_repository,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr =
        std::env::var("FORUM_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Forum service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
