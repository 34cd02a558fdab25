use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{like, tweet};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::require_bounded_text;
use crate::models::tweet::*;
use crate::queries::{find_tweet, find_user, listings};
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;
use crate::utils::id::parse_id;

#[utoipa::path(
    post,
    path = "/",
    tag = "Tweets",
    operation_id = "createTweet",
    summary = "Post a tweet",
    request_body = TweetRequest,
    responses(
        (status = 201, description = "Tweet created", body = ApiResponse<TweetResponse>),
        (status = 400, description = "Empty or overlong content", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_tweet(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TweetRequest>,
) -> Result<ApiResponse<TweetResponse>, AppError> {
    let content = require_bounded_text(&payload.content, "content", CONTENT_MAX_LEN)?;
    let owner = find_user(&state.db, auth_user.user_id).await?;

    let now = Utc::now();
    let new_tweet = tweet::ActiveModel {
        id: Set(Uuid::now_v7()),
        content: Set(content),
        owner_id: Set(owner.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_tweet.insert(&state.db).await?;

    Ok(ApiResponse::created(
        TweetResponse::new(model, owner.into()),
        "Tweet created successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/user/{userId}",
    tag = "Tweets",
    operation_id = "getUserTweets",
    summary = "List a user's tweets",
    description = "Newest first. Empty when the user has not tweeted.",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Tweets", body = ApiResponse<Vec<TweetResponse>>),
        (status = 400, description = "Invalid user ID format", body = ErrorBody),
        (status = 404, description = "User does not exist", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(user_id = %raw_id))]
pub async fn user_tweets(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Vec<TweetResponse>>, AppError> {
    let user_id = parse_id(&raw_id, "user")?;
    let tweets = listings::user_tweets(&state.db, user_id).await?;
    Ok(ApiResponse::ok(tweets, "Tweets fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/{tweetId}",
    tag = "Tweets",
    operation_id = "updateTweet",
    summary = "Edit a tweet",
    description = "Author only. The new text may be sent as `content` or `newTweet`.",
    params(("tweetId" = String, Path, description = "Tweet ID")),
    request_body = TweetRequest,
    responses(
        (status = 200, description = "Tweet updated", body = ApiResponse<TweetResponse>),
        (status = 400, description = "Invalid tweet ID or empty content", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Tweet not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(tweet_id = %raw_id))]
pub async fn update_tweet(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    AppJson(payload): AppJson<TweetRequest>,
) -> Result<ApiResponse<TweetResponse>, AppError> {
    let id = parse_id(&raw_id, "tweet")?;
    let content = require_bounded_text(&payload.content, "content", CONTENT_MAX_LEN)?;

    let existing = find_tweet(&state.db, id).await?;
    auth_user.require_owner(existing.owner_id)?;

    let mut active: tweet::ActiveModel = existing.into();
    active.content = Set(content);
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    let owner = find_user(&state.db, model.owner_id).await?;
    Ok(ApiResponse::ok(
        TweetResponse::new(model, owner.into()),
        "Tweet updated successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/{tweetId}",
    tag = "Tweets",
    operation_id = "deleteTweet",
    summary = "Delete a tweet",
    description = "Author only. Likes on the tweet are removed with it.",
    params(("tweetId" = String, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Tweet deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid tweet ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Tweet not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(tweet_id = %raw_id))]
pub async fn delete_tweet(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let id = parse_id(&raw_id, "tweet")?;

    let txn = state.db.begin().await?;
    let existing = tweet::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Tweet not found".into()))?;
    auth_user.require_owner(existing.owner_id)?;

    like::Entity::delete_many()
        .filter(like::Column::TweetId.eq(id))
        .exec(&txn)
        .await?;
    tweet::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(Empty {}, "Tweet deleted successfully"))
}
