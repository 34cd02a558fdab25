use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{comment, like, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::comment::*;
use crate::models::shared::{OwnerSummary, PageQuery, PageWindow, missing_owner, require_bounded_text};
use crate::queries::{find_comment, find_user, find_visible_video};
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;
use crate::utils::id::parse_id;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Comments",
    operation_id = "listVideoComments",
    summary = "List comments on a video",
    description = "`id` is a video ID. Newest first, each with its author. `page`/`limit` are coerced like the video listing.",
    params(("id" = String, Path, description = "Video ID"), PageQuery),
    responses(
        (status = 200, description = "Comments", body = ApiResponse<CommentListResponse>),
        (status = 400, description = "Invalid video ID format", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, query), fields(video_id = %raw_id))]
pub async fn list_comments(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<ApiResponse<CommentListResponse>, AppError> {
    let video_id = parse_id(&raw_id, "video")?;
    let window = PageWindow::from(&query);
    find_visible_video(&state.db, video_id, viewer.user_id()).await?;

    let select = comment::Entity::find().filter(comment::Column::VideoId.eq(video_id));

    let total_comments = select
        .clone()
        .paginate(&state.db, window.limit)
        .num_items()
        .await?;

    let rows = select
        .find_also_related(user::Entity)
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id)
        .offset(Some(window.offset()))
        .limit(Some(window.limit))
        .all(&state.db)
        .await?;

    let comments = rows
        .into_iter()
        .map(|(c, owner)| {
            let owner = owner
                .map(OwnerSummary::from)
                .unwrap_or_else(|| missing_owner(c.owner_id));
            CommentResponse::new(c, owner)
        })
        .collect();

    Ok(ApiResponse::ok(
        CommentListResponse {
            comments,
            total_comments,
            page: window.page,
            limit: window.limit,
        },
        "Comments fetched successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/{id}",
    tag = "Comments",
    operation_id = "addComment",
    summary = "Comment on a video",
    description = "`id` is a video ID.",
    params(("id" = String, Path, description = "Video ID")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = ApiResponse<CommentResponse>),
        (status = 400, description = "Invalid video ID or empty content", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(video_id = %raw_id))]
pub async fn add_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<ApiResponse<CommentResponse>, AppError> {
    let video_id = parse_id(&raw_id, "video")?;
    let content = require_bounded_text(&payload.content, "content", CONTENT_MAX_LEN)?;
    find_visible_video(&state.db, video_id, Some(auth_user.user_id)).await?;
    let owner = find_user(&state.db, auth_user.user_id).await?;

    let now = Utc::now();
    let new_comment = comment::ActiveModel {
        id: Set(Uuid::now_v7()),
        content: Set(content),
        video_id: Set(video_id),
        owner_id: Set(owner.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_comment.insert(&state.db).await?;

    Ok(ApiResponse::created(
        CommentResponse::new(model, owner.into()),
        "Comment added successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Comments",
    operation_id = "updateComment",
    summary = "Edit a comment",
    description = "`id` is a comment ID. Author only. The new text may be sent as `content` or `newComment`.",
    params(("id" = String, Path, description = "Comment ID")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentResponse>),
        (status = 400, description = "Invalid comment ID or empty content", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Comment not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(comment_id = %raw_id))]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<ApiResponse<CommentResponse>, AppError> {
    let id = parse_id(&raw_id, "comment")?;
    let content = require_bounded_text(&payload.content, "content", CONTENT_MAX_LEN)?;

    let existing = find_comment(&state.db, id).await?;
    auth_user.require_owner(existing.owner_id)?;

    let mut active: comment::ActiveModel = existing.into();
    active.content = Set(content);
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    let owner = find_user(&state.db, model.owner_id).await?;
    Ok(ApiResponse::ok(
        CommentResponse::new(model, owner.into()),
        "Comment updated successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    description = "`id` is a comment ID. Author only. Likes on the comment are removed with it.",
    params(("id" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid comment ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Comment not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(comment_id = %raw_id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let id = parse_id(&raw_id, "comment")?;

    let txn = state.db.begin().await?;
    let existing = comment::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    auth_user.require_owner(existing.owner_id)?;

    like::Entity::delete_many()
        .filter(like::Column::CommentId.eq(id))
        .exec(&txn)
        .await?;
    comment::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(Empty {}, "Comment deleted successfully"))
}
