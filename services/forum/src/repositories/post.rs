//! Post repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{Category, CreatePostRequest, Post};

/// Post repository
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new post
    pub async fn create(&self, payload: &CreatePostRequest, category: Category) -> Result<Post> {
        info!("Creating post \"{}\" by {}", payload.title, payload.user_id);

        let row = sqlx::query(
            r#"
            INSERT INTO posts (id, title, body, category, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, body, category, author_id, solution_reply_id,
                      upvotes, downvotes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&payload.title)
        .bind(&payload.body)
        .bind(category.as_str())
        .bind(&payload.user_id)
        .fetch_one(&self.pool)
        .await?;

        post_from_row(&row)
    }

    /// Find a post by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, body, category, author_id, solution_reply_id,
                   upvotes, downvotes, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(post_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Get posts with pagination and an optional category filter
    pub async fn get_posts(
        &self,
        page: u32,
        limit: u32,
        category: Option<Category>,
    ) -> Result<(Vec<Post>, i64)> {
        let offset = (page - 1) as i64 * limit as i64;

        let (rows, total) = match category {
            Some(category) => {
                let rows = sqlx::query(
                    r#"
                    SELECT id, title, body, category, author_id, solution_reply_id,
                           upvotes, downvotes, created_at
                    FROM posts
                    WHERE category = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(category.as_str())
                .bind(limit as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;

                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE category = $1")
                        .bind(category.as_str())
                        .fetch_one(&self.pool)
                        .await?;

                (rows, total)
            }
            None => {
                let rows = sqlx::query(
                    r#"
                    SELECT id, title, body, category, author_id, solution_reply_id,
                           upvotes, downvotes, created_at
                    FROM posts
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;

                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
                    .fetch_one(&self.pool)
                    .await?;

                (rows, total)
            }
        };

        let posts = rows.iter().map(post_from_row).collect::<Result<Vec<_>>>()?;

        Ok((posts, total))
    }

    /// Delete a post along with its replies and every vote referencing the
    /// post or one of its replies, in a single transaction
    pub async fn delete_cascade(&self, post_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let reply_votes = sqlx::query(
            "DELETE FROM votes WHERE reply_id IN (SELECT id FROM replies WHERE post_id = $1)",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        let post_votes = sqlx::query("DELETE FROM votes WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        let replies = sqlx::query("DELETE FROM replies WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Deleted post {} ({} replies, {} votes)",
            post_id,
            replies.rows_affected(),
            reply_votes.rows_affected() + post_votes.rows_affected()
        );

        Ok(())
    }

    /// Mark a reply as the post's accepted solution
    ///
    /// Clearing the previous solution's flag, setting the new one, and
    /// repointing the post happen in one transaction, so a post never has
    /// two flagged replies.
    pub async fn mark_solution(&self, post_id: Uuid, reply_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<Uuid> =
            sqlx::query_scalar("SELECT solution_reply_id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await?;

        if previous == Some(reply_id) {
            tx.commit().await?;
            return Ok(());
        }

        if let Some(previous_id) = previous {
            sqlx::query("UPDATE replies SET is_solution = FALSE WHERE id = $1")
                .bind(previous_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE replies SET is_solution = TRUE WHERE id = $1")
            .bind(reply_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE posts SET solution_reply_id = $2 WHERE id = $1")
            .bind(post_id)
            .bind(reply_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Marked reply {} as solution for post {}", reply_id, post_id);

        Ok(())
    }

    /// Remove the post's accepted solution, if any
    pub async fn remove_solution(&self, post_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let current: Option<Uuid> =
            sqlx::query_scalar("SELECT solution_reply_id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await?;

        if let Some(current_id) = current {
            sqlx::query("UPDATE replies SET is_solution = FALSE WHERE id = $1")
                .bind(current_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE posts SET solution_reply_id = NULL WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

fn post_from_row(row: &PgRow) -> Result<Post> {
    let category: String = row.get("category");
    let category = category
        .parse::<Category>()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        category,
        author_id: row.get("author_id"),
        solution_reply_id: row.get("solution_reply_id"),
        upvotes: row.get("upvotes"),
        downvotes: row.get("downvotes"),
        created_at: row.get("created_at"),
    })
}
