use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::like;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::like::{LikeStatus, LikedVideo};
use crate::queries::{find_comment, find_tweet, find_visible_video, listings};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::utils::id::parse_id;

/// The single item a like points at.
#[derive(Debug, Clone, Copy)]
enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    fn column(self) -> like::Column {
        match self {
            LikeTarget::Video(_) => like::Column::VideoId,
            LikeTarget::Comment(_) => like::Column::CommentId,
            LikeTarget::Tweet(_) => like::Column::TweetId,
        }
    }

    fn id(self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => id,
        }
    }
}

/// Flip the like of `user_id` on `target`. Returns whether it is now liked.
///
/// Delete first; if nothing was deleted, insert guarded by the per-target
/// unique index. Losing that insert to a concurrent request still leaves the
/// like in place, which is the requested state.
async fn toggle<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    target: LikeTarget,
) -> Result<bool, AppError> {
    let removed = like::Entity::delete_many()
        .filter(like::Column::LikedBy.eq(user_id))
        .filter(target.column().eq(target.id()))
        .exec(db)
        .await?;
    if removed.rows_affected > 0 {
        return Ok(false);
    }

    let mut row = like::ActiveModel {
        id: Set(Uuid::now_v7()),
        liked_by: Set(user_id),
        video_id: Set(None),
        comment_id: Set(None),
        tweet_id: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    match target {
        LikeTarget::Video(id) => row.video_id = Set(Some(id)),
        LikeTarget::Comment(id) => row.comment_id = Set(Some(id)),
        LikeTarget::Tweet(id) => row.tweet_id = Set(Some(id)),
    }

    let inserted = like::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([like::Column::LikedBy, target.column()])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    if inserted == 0 {
        tracing::debug!(?target, "Like already inserted by a concurrent request");
    }
    Ok(true)
}

fn status_response(is_liked: bool) -> ApiResponse<LikeStatus> {
    let message = if is_liked {
        "Like added successfully"
    } else {
        "Like removed successfully"
    };
    ApiResponse::ok(LikeStatus { is_liked }, message)
}

#[utoipa::path(
    post,
    path = "/toggle/video/{videoId}",
    tag = "Likes",
    operation_id = "toggleVideoLike",
    summary = "Like or unlike a video",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "New like state", body = ApiResponse<LikeStatus>),
        (status = 400, description = "Invalid video ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, video_id = %raw_id))]
pub async fn toggle_video_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<LikeStatus>, AppError> {
    let id = parse_id(&raw_id, "video")?;
    find_visible_video(&state.db, id, Some(auth_user.user_id)).await?;
    let is_liked = toggle(&state.db, auth_user.user_id, LikeTarget::Video(id)).await?;
    Ok(status_response(is_liked))
}

#[utoipa::path(
    post,
    path = "/toggle/comment/{commentId}",
    tag = "Likes",
    operation_id = "toggleCommentLike",
    summary = "Like or unlike a comment",
    params(("commentId" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "New like state", body = ApiResponse<LikeStatus>),
        (status = 400, description = "Invalid comment ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Comment not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, comment_id = %raw_id))]
pub async fn toggle_comment_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<LikeStatus>, AppError> {
    let id = parse_id(&raw_id, "comment")?;
    find_comment(&state.db, id).await?;
    let is_liked = toggle(&state.db, auth_user.user_id, LikeTarget::Comment(id)).await?;
    Ok(status_response(is_liked))
}

#[utoipa::path(
    post,
    path = "/toggle/tweet/{tweetId}",
    tag = "Likes",
    operation_id = "toggleTweetLike",
    summary = "Like or unlike a tweet",
    params(("tweetId" = String, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "New like state", body = ApiResponse<LikeStatus>),
        (status = 400, description = "Invalid tweet ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Tweet not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, tweet_id = %raw_id))]
pub async fn toggle_tweet_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<LikeStatus>, AppError> {
    let id = parse_id(&raw_id, "tweet")?;
    find_tweet(&state.db, id).await?;
    let is_liked = toggle(&state.db, auth_user.user_id, LikeTarget::Tweet(id)).await?;
    Ok(status_response(is_liked))
}

#[utoipa::path(
    get,
    path = "/videos",
    tag = "Likes",
    operation_id = "getLikedVideos",
    summary = "List videos the current user liked",
    description = "Most recent like first. Empty when the user has liked nothing.",
    responses(
        (status = 200, description = "Liked videos", body = ApiResponse<Vec<LikedVideo>>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn liked_videos(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<LikedVideo>>, AppError> {
    let videos = listings::liked_videos(&state.db, auth_user.user_id).await?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}
