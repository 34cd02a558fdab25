use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, LockType, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{comment, like, playlist_video, user, video, watch_history};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppQuery;
use crate::extractors::multipart::{MediaKind, UploadForm};
use crate::models::shared::{OwnerSummary, PageWindow, escape_like, require_bounded_text};
use crate::models::video::*;
use crate::queries::{find_user, find_video, watch_history::record_watch};
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;
use crate::utils::id::parse_id;

#[utoipa::path(
    get,
    path = "/",
    tag = "Videos",
    operation_id = "listVideos",
    summary = "List a channel's videos",
    description = "Paginated, searchable listing of one user's videos. `page` and `limit` fall back to 1 and 10 when not positive integers; `limit` is capped at 100. Unpublished videos are included only for their owner. Pages past the end return an empty list.",
    params(VideoListQuery),
    responses(
        (status = 200, description = "Videos", body = ApiResponse<VideoListResponse>),
        (status = 400, description = "Missing or invalid userId, unknown sortBy", body = ErrorBody),
        (status = 404, description = "User does not exist", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_videos(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<VideoListQuery>,
) -> Result<ApiResponse<VideoListResponse>, AppError> {
    let owner_id = match query.user_id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_id(raw, "user")?,
        _ => return Err(AppError::Validation("userId is required".into())),
    };
    let sort = VideoSort::parse(query.sort_by.as_deref())?;
    let order = parse_sort_type(query.sort_type.as_deref());
    let window = PageWindow::from_raw(query.page.as_deref(), query.limit.as_deref());

    let owner = OwnerSummary::from(find_user(&state.db, owner_id).await?);

    let mut select = video::Entity::find().filter(video::Column::OwnerId.eq(owner_id));

    if viewer.user_id() != Some(owner_id) {
        select = select.filter(video::Column::IsPublished.eq(true));
    }

    if let Some(ref search) = query.query {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(video::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total_videos = select
        .clone()
        .paginate(&state.db, window.limit)
        .num_items()
        .await?;

    let videos = select
        .order_by(sort.column(), order.clone())
        .order_by(video::Column::Id, order)
        .offset(Some(window.offset()))
        .limit(Some(window.limit))
        .all(&state.db)
        .await?;

    let videos = videos
        .into_iter()
        .map(|v| VideoResponse::new(v, owner.clone()))
        .collect();

    Ok(ApiResponse::ok(
        VideoListResponse {
            videos,
            total_videos,
            page: window.page,
            limit: window.limit,
        },
        "Videos fetched successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Videos",
    operation_id = "publishVideo",
    summary = "Publish a video",
    description = "Uploads `videoFile` then `thumbnail` to the media host and creates a published video. Duration comes from the media host when it reports one.",
    request_body(content = PublishVideoForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video published", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Missing field or file, wrong file type", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Media upload failed", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = %auth_user.user_id))]
pub async fn publish_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let title = require_bounded_text(
        form.text("title").unwrap_or_default(),
        "title",
        TITLE_MAX_LEN,
    )?;
    let description = require_bounded_text(
        form.text("description").unwrap_or_default(),
        "description",
        DESCRIPTION_MAX_LEN,
    )?;
    let video_file = form.require_file("videoFile", MediaKind::Video)?;
    let thumbnail_file = form.require_file("thumbnail", MediaKind::Image)?;

    let owner = find_user(&state.db, auth_user.user_id).await?;

    let uploaded_video = state.media.upload(video_file).await?;
    let uploaded_thumbnail = state.media.upload(thumbnail_file).await?;

    let now = Utc::now();
    let new_video = video::ActiveModel {
        id: Set(Uuid::now_v7()),
        video_file: Set(uploaded_video.url),
        thumbnail: Set(uploaded_thumbnail.url),
        title: Set(title),
        description: Set(description),
        duration: Set(uploaded_video.duration_seconds.unwrap_or(0.0)),
        is_published: Set(true),
        owner_id: Set(owner.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_video.insert(&state.db).await?;

    tracing::info!(video_id = %model.id, "Video published");
    Ok(ApiResponse::created(
        VideoResponse::new(model, owner.into()),
        "Video uploaded successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/{videoId}",
    tag = "Videos",
    operation_id = "getVideo",
    summary = "Get a video",
    description = "Unpublished videos are only visible to their owner. Fetching a video while authenticated records it in the viewer's watch history.",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Invalid video ID format", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(video_id = %raw_id))]
pub async fn get_video(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let id = parse_id(&raw_id, "video")?;

    let (model, owner) = video::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))?;

    if !model.is_published && viewer.user_id() != Some(model.owner_id) {
        return Err(AppError::NotFound("Video not found".into()));
    }
    let owner = owner.ok_or_else(|| AppError::Internal(format!("Video {id} has no owner")))?;

    if let Some(viewer_id) = viewer.user_id() {
        record_watch(&state.db, viewer_id, id).await?;
    }

    Ok(ApiResponse::ok(
        VideoResponse::new(model, owner.into()),
        "Video fetched successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/{videoId}",
    tag = "Videos",
    operation_id = "updateVideo",
    summary = "Update a video",
    description = "Owner only. Any of `title`, `description` and `thumbnail` may be sent; at least one is required.",
    params(("videoId" = String, Path, description = "Video ID")),
    request_body(content = UpdateVideoForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video updated", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(video_id = %raw_id))]
pub async fn update_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    mut form: UploadForm,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let id = parse_id(&raw_id, "video")?;

    let title = form
        .text("title")
        .map(|t| require_bounded_text(t, "title", TITLE_MAX_LEN))
        .transpose()?;
    let description = form
        .text("description")
        .map(|d| require_bounded_text(d, "description", DESCRIPTION_MAX_LEN))
        .transpose()?;
    let thumbnail_file = form.take_file("thumbnail", MediaKind::Image)?;

    if title.is_none() && description.is_none() && thumbnail_file.is_none() {
        return Err(AppError::Validation(
            "title, description or thumbnail is required".into(),
        ));
    }

    let existing = find_video(&state.db, id).await?;
    auth_user.require_owner(existing.owner_id)?;

    let thumbnail = match thumbnail_file {
        Some(file) => Some(state.media.upload(file).await?.url),
        None => None,
    };

    let mut active: video::ActiveModel = existing.into();
    if let Some(title) = title {
        active.title = Set(title);
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    if let Some(thumbnail) = thumbnail {
        active.thumbnail = Set(thumbnail);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    let owner = find_user(&state.db, model.owner_id).await?;
    Ok(ApiResponse::ok(
        VideoResponse::new(model, owner.into()),
        "Video updated successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/{videoId}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Delete a video",
    description = "Owner only. Also removes the video's comments, every like on the video or its comments, its playlist entries and watch-history rows, in one transaction.",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid video ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(video_id = %raw_id))]
pub async fn delete_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let id = parse_id(&raw_id, "video")?;

    let txn = state.db.begin().await?;
    let existing = find_video_for_update(&txn, id).await?;
    auth_user.require_owner(existing.owner_id)?;

    let video_comments = SeaQuery::select()
        .column(comment::Column::Id)
        .from(comment::Entity)
        .and_where(Expr::col(comment::Column::VideoId).eq(id))
        .to_owned();
    like::Entity::delete_many()
        .filter(
            Condition::any()
                .add(like::Column::VideoId.eq(id))
                .add(like::Column::CommentId.in_subquery(video_comments)),
        )
        .exec(&txn)
        .await?;
    comment::Entity::delete_many()
        .filter(comment::Column::VideoId.eq(id))
        .exec(&txn)
        .await?;
    playlist_video::Entity::delete_many()
        .filter(playlist_video::Column::VideoId.eq(id))
        .exec(&txn)
        .await?;
    watch_history::Entity::delete_many()
        .filter(watch_history::Column::VideoId.eq(id))
        .exec(&txn)
        .await?;
    video::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(video_id = %id, "Video deleted");
    Ok(ApiResponse::ok(Empty {}, "Video deleted successfully"))
}

#[utoipa::path(
    patch,
    path = "/{videoId}/toggle-publish",
    tag = "Videos",
    operation_id = "togglePublishStatus",
    summary = "Flip a video's published flag",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Publish status toggled", body = ApiResponse<VideoResponse>),
        (status = 400, description = "Invalid video ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(video_id = %raw_id))]
pub async fn toggle_publish(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let id = parse_id(&raw_id, "video")?;

    let txn = state.db.begin().await?;
    let existing = find_video_for_update(&txn, id).await?;
    auth_user.require_owner(existing.owner_id)?;

    let published = !existing.is_published;
    let mut active: video::ActiveModel = existing.into();
    active.is_published = Set(published);
    active.updated_at = Set(Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    let owner = find_user(&state.db, model.owner_id).await?;
    Ok(ApiResponse::ok(
        VideoResponse::new(model, owner.into()),
        "Publish status of video toggled successfully",
    ))
}

async fn find_video_for_update(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<video::Model, AppError> {
    video::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}
