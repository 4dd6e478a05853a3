//! Vote ledger for database operations
//!
//! One vote per (voter, target); the target's denormalized tallies are
//! maintained in the same transaction as the vote row, with the existing
//! vote locked `FOR UPDATE`, so concurrent casts cannot drift the counters
//! away from the true vote count.

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Vote, VoteType};

/// The entity a vote applies to: exactly one of a post or a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Post(Uuid),
    Reply(Uuid),
}

impl VoteTarget {
    fn id(&self) -> Uuid {
        match self {
            VoteTarget::Post(id) | VoteTarget::Reply(id) => *id,
        }
    }

    /// Column of the votes table holding this target's id
    fn column(&self) -> &'static str {
        match self {
            VoteTarget::Post(_) => "post_id",
            VoteTarget::Reply(_) => "reply_id",
        }
    }

    /// Table carrying this target's vote tallies
    fn table(&self) -> &'static str {
        match self {
            VoteTarget::Post(_) => "posts",
            VoteTarget::Reply(_) => "replies",
        }
    }
}

/// Vote repository
#[derive(Clone)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    /// Create a new vote repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a vote and return the target's updated tallies
    ///
    /// Absent vote: insert and increment the matching counter. Same
    /// direction as the existing vote: no-op. Opposite direction: flip the
    /// vote row and move one unit between the counters. All of it happens
    /// in one transaction.
    pub async fn cast(
        &self,
        user_id: &str,
        target: VoteTarget,
        vote_type: VoteType,
    ) -> Result<(i32, i32)> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query(&format!(
            "SELECT id, vote_type FROM votes WHERE user_id = $1 AND {} = $2 FOR UPDATE",
            target.column()
        ))
        .bind(user_id)
        .bind(target.id())
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            None => {
                sqlx::query(&format!(
                    "INSERT INTO votes (id, user_id, {}, vote_type) VALUES ($1, $2, $3, $4)",
                    target.column()
                ))
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(target.id())
                .bind(vote_type.as_str())
                .execute(&mut *tx)
                .await?;

                let counter = counter_column(vote_type);
                sqlx::query(&format!(
                    "UPDATE {} SET {counter} = {counter} + 1 WHERE id = $1",
                    target.table()
                ))
                .bind(target.id())
                .execute(&mut *tx)
                .await?;
            }
            Some(row) => {
                let vote_id: Uuid = row.get("id");
                let current: String = row.get("vote_type");
                let current = current
                    .parse::<VoteType>()
                    .map_err(|e| anyhow::anyhow!(e))?;

                if current != vote_type {
                    sqlx::query("UPDATE votes SET vote_type = $2 WHERE id = $1")
                        .bind(vote_id)
                        .bind(vote_type.as_str())
                        .execute(&mut *tx)
                        .await?;

                    let inc = counter_column(vote_type);
                    let dec = counter_column(current);
                    sqlx::query(&format!(
                        "UPDATE {} SET {inc} = {inc} + 1, {dec} = {dec} - 1 WHERE id = $1",
                        target.table()
                    ))
                    .bind(target.id())
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        let row = sqlx::query(&format!(
            "SELECT upvotes, downvotes FROM {} WHERE id = $1",
            target.table()
        ))
        .bind(target.id())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((row.get("upvotes"), row.get("downvotes")))
    }

    /// Look up a voter's current vote on a target
    ///
    /// Absence is a normal state (the UI renders "unvoted"), not an error.
    pub async fn find(&self, user_id: &str, target: VoteTarget) -> Result<Option<Vote>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT id, user_id, post_id, reply_id, vote_type, created_at
            FROM votes
            WHERE user_id = $1 AND {} = $2
            "#,
            target.column()
        ))
        .bind(user_id)
        .bind(target.id())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(vote_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

fn counter_column(vote_type: VoteType) -> &'static str {
    match vote_type {
        VoteType::Upvote => "upvotes",
        VoteType::Downvote => "downvotes",
    }
}

fn vote_from_row(row: &PgRow) -> Result<Vote> {
    let vote_type: String = row.get("vote_type");
    let vote_type = vote_type
        .parse::<VoteType>()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(Vote {
        id: row.get("id"),
        user_id: row.get("user_id"),
        post_id: row.get("post_id"),
        reply_id: row.get("reply_id"),
        vote_type,
        created_at: row.get("created_at"),
    })
}
