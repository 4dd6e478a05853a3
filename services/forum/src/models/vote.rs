//! Vote model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Direction of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    /// Database representation of the vote type
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Upvote => "upvote",
            VoteType::Downvote => "downvote",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteType::Upvote),
            "downvote" => Ok(VoteType::Downvote),
            other => Err(format!("Unknown vote type: {}", other)),
        }
    }
}

/// Vote entity: one voter, exactly one of a post or reply target
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub user_id: String,
    pub post_id: Option<Uuid>,
    pub reply_id: Option<Uuid>,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
}

/// Payload for casting a vote
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub user_id: String,
    /// Parsed by the handler so an unknown value is a validation failure.
    pub vote_type: String,
}

/// Query parameters for looking up the caller's vote on a target
#[derive(Debug, Clone, Deserialize)]
pub struct VoteStatusQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response after casting a vote: the recorded direction plus the
/// target's updated tallies
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub vote_type: VoteType,
    pub upvotes: i32,
    pub downvotes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_type_round_trips_through_str() {
        assert_eq!("upvote".parse::<VoteType>().unwrap(), VoteType::Upvote);
        assert_eq!("downvote".parse::<VoteType>().unwrap(), VoteType::Downvote);
        assert_eq!(VoteType::Upvote.as_str(), "upvote");
    }

    #[test]
    fn unknown_vote_type_is_rejected() {
        assert!(VoteType::from_str("sideways").is_err());
        assert!(VoteType::from_str("UPVOTE").is_err());
    }
}
