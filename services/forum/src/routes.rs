//! Forum service routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        Caller, CastVoteRequest, Category, CreatePostRequest, CreateReplyRequest,
        PostDetailsResponse, PostListResponse, PostQuery, RegisterUserRequest,
        UpdateUsernameRequest, VoteResponse, VoteStatusQuery, VoteType,
    },
    quote,
    repositories::VoteTarget,
    state::AppState,
    thread, validation,
};

/// Create the router for the forum service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/users", post(register_user))
        .route("/api/users", get(get_users))
        .route("/api/users/:id/username", patch(update_username))
        .route("/api/posts", get(get_posts))
        .route("/api/posts", post(create_post))
        .route("/api/posts/:id", get(get_post))
        .route("/api/posts/:id", delete(delete_post))
        .route("/api/posts/:id/details", get(get_post_details))
        .route("/api/posts/:id/replies", post(create_reply))
        .route("/api/replies/:id", delete(delete_reply))
        .route("/api/posts/:id/vote", post(vote_on_post))
        .route("/api/posts/:id/vote", get(get_post_vote))
        .route("/api/replies/:id/vote", post(vote_on_reply))
        .route("/api/replies/:id/vote", get(get_reply_vote))
        .route("/api/posts/:id/replies/:reply_id/solution", post(mark_solution))
        .route("/api/posts/:id/solution", delete(remove_solution))
        .route("/api/stats", get(get_stats))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "forum-service"
    }))
}

/// Register a user on first authentication
///
/// Idempotent by subject id: an already-registered id returns the stored
/// user with 200 instead of creating a duplicate.
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.id.trim().is_empty() {
        return Err(ApiError::Validation("User id is required".to_string()));
    }
    validation::validate_username(&payload.username).map_err(ApiError::Validation)?;
    validation::validate_email(&payload.email).map_err(ApiError::Validation)?;

    let existing = state
        .user_repository
        .find_by_id(&payload.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    if let Some(user) = existing {
        return Ok((StatusCode::OK, Json(user)));
    }

    let taken = state
        .user_repository
        .username_taken(&payload.username, &payload.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check username: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    if taken {
        return Err(ApiError::Validation("Username is already taken".to_string()));
    }

    let user = state.user_repository.create(&payload).await.map_err(|e| {
        tracing::error!("Failed to create user: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.user_repository.get_all().await.map_err(|e| {
        tracing::error!("Failed to get users: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(users))
}

/// Change a user's display name
pub async fn update_username(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUsernameRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_username(&payload.username).map_err(ApiError::Validation)?;

    let taken = state
        .user_repository
        .username_taken(&payload.username, &id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check username: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    if taken {
        return Err(ApiError::Validation("Username is already taken".to_string()));
    }

    let user = state
        .user_repository
        .update_username(&id, &payload.username)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update username: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Get posts with pagination and an optional category filter
pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).min(100).max(1);

    let category = match &query.category {
        Some(raw) => Some(raw.parse::<Category>().map_err(ApiError::Validation)?),
        None => None,
    };

    let (posts, total) = state
        .post_repository
        .get_posts(page, limit, category)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get posts: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(PostListResponse {
        posts,
        page,
        limit,
        total,
    }))
}

/// Create a new post
pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_title(&payload.title).map_err(ApiError::Validation)?;
    validation::validate_body(&payload.body).map_err(ApiError::Validation)?;
    let category = payload
        .category
        .parse::<Category>()
        .map_err(ApiError::Validation)?;

    state
        .user_repository
        .find_by_id(&payload.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let post = state
        .post_repository
        .create(&payload, category)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Get a post by ID
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .post_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get post: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// Get a post along with its assembled two-level reply thread
pub async fn get_post_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .post_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get post: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let replies = state
        .reply_repository
        .get_for_post(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get replies: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    let thread = thread::assemble(replies);

    Ok(Json(PostDetailsResponse { post, thread }))
}

/// Delete a post (author only), cascading to its replies and votes
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(caller): Query<Caller>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .post_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get post: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if post.author_id != caller.user_id {
        return Err(ApiError::Forbidden(
            "Only the author can delete this post".to_string(),
        ));
    }

    state.post_repository.delete_cascade(id).await.map_err(|e| {
        tracing::error!("Failed to delete post: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(json!({"message": "Post deleted successfully"})))
}

/// Create a reply on a post
///
/// Replying to a nested reply stores a body prefixed with a quoted excerpt
/// of the target (see `crate::quote`).
pub async fn create_reply(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateReplyRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_body(&payload.body).map_err(ApiError::Validation)?;

    state
        .post_repository
        .find_by_id(post_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get post: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    state
        .user_repository
        .find_by_id(&payload.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let mut body = payload.body.clone();

    if let Some(parent_id) = payload.parent_reply_id {
        let parent = state
            .reply_repository
            .find_by_id(parent_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get parent reply: {}", e);
                ApiError::Internal(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound("Parent reply not found".to_string()))?;

        if parent.post_id != post_id {
            return Err(ApiError::Validation(
                "Parent reply belongs to a different post".to_string(),
            ));
        }

        // The display flattens nesting, so a reply to an already-nested
        // reply carries a quoted excerpt of its target for context.
        if parent.parent_reply_id.is_some() {
            let parent_author = state
                .user_repository
                .find_by_id(&parent.author_id)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up parent author: {}", e);
                    ApiError::Internal(e.to_string())
                })?
                .map(|user| user.username)
                .unwrap_or_else(|| parent.author_id.clone());

            body = quote::compose_reply_body(&parent_author, &parent.body, &payload.body);
        }
    }

    let reply = state
        .reply_repository
        .create(post_id, &payload.user_id, payload.parent_reply_id, &body)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create reply: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    Ok((StatusCode::CREATED, Json(reply)))
}

/// Delete a reply (author only)
pub async fn delete_reply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(caller): Query<Caller>,
) -> ApiResult<impl IntoResponse> {
    let reply = state
        .reply_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get reply: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Reply not found".to_string()))?;

    if reply.author_id != caller.user_id {
        return Err(ApiError::Forbidden(
            "Only the author can delete this reply".to_string(),
        ));
    }

    state.reply_repository.delete(&reply).await.map_err(|e| {
        tracing::error!("Failed to delete reply: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(json!({"message": "Reply deleted successfully"})))
}

/// Cast or change a vote on a post
pub async fn vote_on_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CastVoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let vote_type = payload
        .vote_type
        .parse::<VoteType>()
        .map_err(ApiError::Validation)?;

    state
        .post_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get post: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    cast_vote(&state, &payload.user_id, VoteTarget::Post(id), vote_type).await
}

/// Get the caller's current vote on a post, or `null` when unvoted
pub async fn get_post_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VoteStatusQuery>,
) -> ApiResult<impl IntoResponse> {
    state
        .post_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get post: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    find_vote(&state, &query.user_id, VoteTarget::Post(id)).await
}

/// Cast or change a vote on a reply
pub async fn vote_on_reply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CastVoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let vote_type = payload
        .vote_type
        .parse::<VoteType>()
        .map_err(ApiError::Validation)?;

    state
        .reply_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get reply: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Reply not found".to_string()))?;

    cast_vote(&state, &payload.user_id, VoteTarget::Reply(id), vote_type).await
}

/// Get the caller's current vote on a reply, or `null` when unvoted
pub async fn get_reply_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VoteStatusQuery>,
) -> ApiResult<impl IntoResponse> {
    state
        .reply_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get reply: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Reply not found".to_string()))?;

    find_vote(&state, &query.user_id, VoteTarget::Reply(id)).await
}

/// Mark a reply as the accepted solution for a post (author only)
pub async fn mark_solution(
    State(state): State<AppState>,
    Path((post_id, reply_id)): Path<(Uuid, Uuid)>,
    Json(caller): Json<Caller>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .post_repository
        .find_by_id(post_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get post: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if post.author_id != caller.user_id {
        return Err(ApiError::Forbidden(
            "Only the author can mark a solution".to_string(),
        ));
    }

    let reply = state
        .reply_repository
        .find_by_id(reply_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get reply: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Reply not found".to_string()))?;

    if reply.post_id != post_id {
        return Err(ApiError::Validation(
            "Reply does not belong to this post".to_string(),
        ));
    }

    state
        .post_repository
        .mark_solution(post_id, reply_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark solution: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(json!({"message": "Solution marked successfully"})))
}

/// Remove a post's accepted solution (author only)
pub async fn remove_solution(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Query(caller): Query<Caller>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .post_repository
        .find_by_id(post_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get post: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if post.author_id != caller.user_id {
        return Err(ApiError::Forbidden(
            "Only the author can remove a solution".to_string(),
        ));
    }

    state
        .post_repository
        .remove_solution(post_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove solution: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(json!({"message": "Solution removed successfully"})))
}

/// Forum-wide entity counts
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state.stats_repository.collect().await.map_err(|e| {
        tracing::error!("Failed to collect stats: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(stats))
}

/// Shared vote-cast path for posts and replies
async fn cast_vote(
    state: &AppState,
    user_id: &str,
    target: VoteTarget,
    vote_type: VoteType,
) -> ApiResult<Json<VoteResponse>> {
    state
        .user_repository
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let (upvotes, downvotes) = state
        .vote_repository
        .cast(user_id, target, vote_type)
        .await
        .map_err(|e| {
            tracing::error!("Failed to cast vote: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(VoteResponse {
        vote_type,
        upvotes,
        downvotes,
    }))
}

/// Shared vote-lookup path for posts and replies
async fn find_vote(
    state: &AppState,
    user_id: &str,
    target: VoteTarget,
) -> ApiResult<Json<Option<crate::models::Vote>>> {
    let vote = state
        .vote_repository
        .find(user_id, target)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up vote: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(vote))
}
