use std::collections::HashMap;

use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{playlist, playlist_video, video};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::playlist::*;
use crate::models::shared::{OwnerSummary, missing_owner};
use crate::models::video::VideoResponse;
use crate::queries::{find_playlist, find_user, find_visible_video, users_by_id};
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;
use crate::utils::id::parse_id;

/// Video ids of a playlist in slot order.
async fn slot_video_ids<C: ConnectionTrait>(db: &C, playlist_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
    let slots = playlist_video::Entity::find()
        .filter(playlist_video::Column::PlaylistId.eq(playlist_id))
        .order_by_asc(playlist_video::Column::Id)
        .all(db)
        .await?;
    Ok(slots.into_iter().map(|s| s.video_id).collect())
}

async fn playlist_response<C: ConnectionTrait>(
    db: &C,
    model: playlist::Model,
) -> Result<PlaylistResponse, AppError> {
    let videos = slot_video_ids(db, model.id).await?;
    Ok(PlaylistResponse::new(model, videos))
}

/// Load a playlist and check the caller owns it.
async fn owned_playlist<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
    id: Uuid,
) -> Result<playlist::Model, AppError> {
    let model = find_playlist(db, id).await?;
    auth_user.require_owner(model.owner_id)?;
    Ok(model)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Playlists",
    operation_id = "createPlaylist",
    summary = "Create a playlist",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 201, description = "Playlist created", body = ApiResponse<PlaylistResponse>),
        (status = 400, description = "Missing name or description", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_playlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePlaylistRequest>,
) -> Result<ApiResponse<PlaylistResponse>, AppError> {
    let (name, description) = validate_create_playlist(&payload)?;

    let now = Utc::now();
    let new_playlist = playlist::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name),
        description: Set(description),
        owner_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_playlist.insert(&state.db).await?;

    Ok(ApiResponse::created(
        PlaylistResponse::new(model, Vec::new()),
        "Playlist created successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/user/{userId}",
    tag = "Playlists",
    operation_id = "getUserPlaylists",
    summary = "List a user's playlists",
    description = "Newest first. Empty when the user has no playlists.",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Playlists", body = ApiResponse<Vec<PlaylistResponse>>),
        (status = 400, description = "Invalid user ID format", body = ErrorBody),
        (status = 404, description = "User does not exist", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(user_id = %raw_id))]
pub async fn user_playlists(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Vec<PlaylistResponse>>, AppError> {
    let user_id = parse_id(&raw_id, "user")?;
    find_user(&state.db, user_id).await?;

    let playlists = playlist::Entity::find()
        .filter(playlist::Column::OwnerId.eq(user_id))
        .order_by_desc(playlist::Column::CreatedAt)
        .order_by_desc(playlist::Column::Id)
        .all(&state.db)
        .await?;

    let ids: Vec<Uuid> = playlists.iter().map(|p| p.id).collect();
    let mut slots: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    if !ids.is_empty() {
        let rows = playlist_video::Entity::find()
            .filter(playlist_video::Column::PlaylistId.is_in(ids))
            .order_by_asc(playlist_video::Column::Id)
            .all(&state.db)
            .await?;
        for row in rows {
            slots.entry(row.playlist_id).or_default().push(row.video_id);
        }
    }

    let items = playlists
        .into_iter()
        .map(|p| {
            let videos = slots.remove(&p.id).unwrap_or_default();
            PlaylistResponse::new(p, videos)
        })
        .collect();

    Ok(ApiResponse::ok(items, "User playlists fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/{playlistId}",
    tag = "Playlists",
    operation_id = "getPlaylist",
    summary = "Get a playlist with its videos",
    description = "Videos are resolved in playlist order. Unpublished videos are shown only to their owner.",
    params(("playlistId" = String, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist", body = ApiResponse<PlaylistDetailResponse>),
        (status = 400, description = "Invalid playlist ID format", body = ErrorBody),
        (status = 404, description = "Playlist not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(playlist_id = %raw_id))]
pub async fn get_playlist(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<PlaylistDetailResponse>, AppError> {
    let id = parse_id(&raw_id, "playlist")?;
    let model = find_playlist(&state.db, id).await?;

    let rows = playlist_video::Entity::find()
        .filter(playlist_video::Column::PlaylistId.eq(id))
        .find_also_related(video::Entity)
        .order_by_asc(playlist_video::Column::Id)
        .all(&state.db)
        .await?;

    let viewer_id = viewer.user_id();
    let videos: Vec<video::Model> = rows
        .into_iter()
        .filter_map(|(_, v)| v)
        .filter(|v| v.is_published || viewer_id == Some(v.owner_id))
        .collect();

    let owners = users_by_id(&state.db, videos.iter().map(|v| v.owner_id)).await?;
    let videos = videos
        .into_iter()
        .map(|v| {
            let owner = owners
                .get(&v.owner_id)
                .cloned()
                .map(OwnerSummary::from)
                .unwrap_or_else(|| missing_owner(v.owner_id));
            VideoResponse::new(v, owner)
        })
        .collect();

    Ok(ApiResponse::ok(
        PlaylistDetailResponse {
            id: model.id,
            name: model.name,
            description: model.description,
            owner_id: model.owner_id,
            videos,
            created_at: model.created_at,
            updated_at: model.updated_at,
        },
        "Playlist fetched successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/{playlistId}",
    tag = "Playlists",
    operation_id = "updatePlaylist",
    summary = "Rename or describe a playlist",
    description = "Owner only. At least one of `name` and `description` is required.",
    params(("playlistId" = String, Path, description = "Playlist ID")),
    request_body = UpdatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist updated", body = ApiResponse<PlaylistResponse>),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Playlist not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(playlist_id = %raw_id))]
pub async fn update_playlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    AppJson(payload): AppJson<UpdatePlaylistRequest>,
) -> Result<ApiResponse<PlaylistResponse>, AppError> {
    let id = parse_id(&raw_id, "playlist")?;
    let (name, description) = validate_update_playlist(&payload)?;
    let existing = owned_playlist(&state.db, &auth_user, id).await?;

    let mut active: playlist::ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    Ok(ApiResponse::ok(
        playlist_response(&state.db, model).await?,
        "Playlist updated successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/{playlistId}",
    tag = "Playlists",
    operation_id = "deletePlaylist",
    summary = "Delete a playlist",
    description = "Owner only. The videos themselves are untouched.",
    params(("playlistId" = String, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist deleted", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid playlist ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Playlist not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(playlist_id = %raw_id))]
pub async fn delete_playlist(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Empty>, AppError> {
    let id = parse_id(&raw_id, "playlist")?;

    let txn = state.db.begin().await?;
    let existing = playlist::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".into()))?;
    auth_user.require_owner(existing.owner_id)?;

    playlist_video::Entity::delete_many()
        .filter(playlist_video::Column::PlaylistId.eq(id))
        .exec(&txn)
        .await?;
    playlist::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(Empty {}, "Playlist deleted successfully"))
}

#[utoipa::path(
    patch,
    path = "/{playlistId}/add/{videoId}",
    tag = "Playlists",
    operation_id = "addVideoToPlaylist",
    summary = "Append a video to a playlist",
    description = "Owner only. The same video may be added more than once.",
    params(
        ("playlistId" = String, Path, description = "Playlist ID"),
        ("videoId" = String, Path, description = "Video ID"),
    ),
    responses(
        (status = 200, description = "Video added", body = ApiResponse<PlaylistResponse>),
        (status = 400, description = "Invalid playlist or video ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Playlist or video not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(playlist_id = %raw_playlist_id, video_id = %raw_video_id))]
pub async fn add_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((raw_playlist_id, raw_video_id)): Path<(String, String)>,
) -> Result<ApiResponse<PlaylistResponse>, AppError> {
    let playlist_id = parse_id(&raw_playlist_id, "playlist")?;
    let video_id = parse_id(&raw_video_id, "video")?;

    let existing = owned_playlist(&state.db, &auth_user, playlist_id).await?;
    find_visible_video(&state.db, video_id, Some(auth_user.user_id)).await?;

    let slot = playlist_video::ActiveModel {
        id: Set(Uuid::now_v7()),
        playlist_id: Set(playlist_id),
        video_id: Set(video_id),
        added_at: Set(Utc::now()),
        ..Default::default()
    };
    slot.insert(&state.db).await?;

    Ok(ApiResponse::ok(
        playlist_response(&state.db, existing).await?,
        "Video added to playlist successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/{playlistId}/remove/{videoId}",
    tag = "Playlists",
    operation_id = "removeVideoFromPlaylist",
    summary = "Remove a video from a playlist",
    description = "Owner only. Removes every occurrence of the video. Succeeds with the playlist unchanged when the video is not in it.",
    params(
        ("playlistId" = String, Path, description = "Playlist ID"),
        ("videoId" = String, Path, description = "Video ID"),
    ),
    responses(
        (status = 200, description = "Video removed", body = ApiResponse<PlaylistResponse>),
        (status = 400, description = "Invalid playlist or video ID format", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Playlist not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(playlist_id = %raw_playlist_id, video_id = %raw_video_id))]
pub async fn remove_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((raw_playlist_id, raw_video_id)): Path<(String, String)>,
) -> Result<ApiResponse<PlaylistResponse>, AppError> {
    let playlist_id = parse_id(&raw_playlist_id, "playlist")?;
    let video_id = parse_id(&raw_video_id, "video")?;

    let existing = owned_playlist(&state.db, &auth_user, playlist_id).await?;

    let removed = playlist_video::Entity::delete_many()
        .filter(playlist_video::Column::PlaylistId.eq(playlist_id))
        .filter(playlist_video::Column::VideoId.eq(video_id))
        .exec(&state.db)
        .await?;
    tracing::debug!(removed = removed.rows_affected, "Removed playlist slots");

    Ok(ApiResponse::ok(
        playlist_response(&state.db, existing).await?,
        "Video removed from playlist successfully",
    ))
}
