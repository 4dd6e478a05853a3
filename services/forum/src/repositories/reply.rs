//! Reply repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::Reply;

/// Reply repository
#[derive(Clone)]
pub struct ReplyRepository {
    pool: PgPool,
}

impl ReplyRepository {
    /// Create a new reply repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new reply
    ///
    /// The body arrives fully composed; quoting a nested parent has
    /// already happened in the handler.
    pub async fn create(
        &self,
        post_id: Uuid,
        author_id: &str,
        parent_reply_id: Option<Uuid>,
        body: &str,
    ) -> Result<Reply> {
        info!("Creating reply on post {} by {}", post_id, author_id);

        let row = sqlx::query(
            r#"
            INSERT INTO replies (id, post_id, author_id, parent_reply_id, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, author_id, parent_reply_id, body, is_solution,
                      upvotes, downvotes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(author_id)
        .bind(parent_reply_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(reply_from_row(&row))
    }

    /// Find a reply by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Reply>> {
        let row = sqlx::query(
            r#"
            SELECT id, post_id, author_id, parent_reply_id, body, is_solution,
                   upvotes, downvotes, created_at
            FROM replies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(reply_from_row))
    }

    /// Get all replies belonging to a post, oldest first
    pub async fn get_for_post(&self, post_id: Uuid) -> Result<Vec<Reply>> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, author_id, parent_reply_id, body, is_solution,
                   upvotes, downvotes, created_at
            FROM replies
            WHERE post_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(reply_from_row).collect())
    }

    /// Delete a reply along with its votes, clearing the owning post's
    /// solution reference if this reply held it, in a single transaction
    ///
    /// Child replies are left in place; thread assembly promotes them to
    /// top level once their parent is gone.
    pub async fn delete(&self, reply: &Reply) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM votes WHERE reply_id = $1")
            .bind(reply.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE posts SET solution_reply_id = NULL WHERE id = $1 AND solution_reply_id = $2")
            .bind(reply.post_id)
            .bind(reply.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM replies WHERE id = $1")
            .bind(reply.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted reply {} from post {}", reply.id, reply.post_id);

        Ok(())
    }
}

fn reply_from_row(row: &PgRow) -> Reply {
    Reply {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        parent_reply_id: row.get("parent_reply_id"),
        body: row.get("body"),
        is_solution: row.get("is_solution"),
        upvotes: row.get("upvotes"),
        downvotes: row.get("downvotes"),
        created_at: row.get("created_at"),
    }
}
