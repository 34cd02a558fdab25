use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::require_bounded_text;
use super::video::VideoResponse;
use crate::entity::playlist;
use crate::error::AppError;

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreatePlaylistRequest {
    #[schema(example = "Favourites")]
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    /// Video ids in playlist order. May repeat.
    pub videos: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaylistResponse {
    pub fn new(p: playlist::Model, videos: Vec<Uuid>) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            owner_id: p.owner_id,
            videos,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// A playlist with its videos resolved, in playlist order.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    pub videos: Vec<VideoResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn validate_create_playlist(req: &CreatePlaylistRequest) -> Result<(String, String), AppError> {
    if req.name.trim().is_empty() || req.description.trim().is_empty() {
        return Err(AppError::Validation(
            "name and description are required".into(),
        ));
    }
    Ok((
        require_bounded_text(&req.name, "name", NAME_MAX_LEN)?,
        require_bounded_text(&req.description, "description", DESCRIPTION_MAX_LEN)?,
    ))
}

/// Returns the trimmed values to apply. At least one field must be present.
pub fn validate_update_playlist(
    req: &UpdatePlaylistRequest,
) -> Result<(Option<String>, Option<String>), AppError> {
    if req.name.is_none() && req.description.is_none() {
        return Err(AppError::Validation(
            "name or description is required".into(),
        ));
    }
    let name = req
        .name
        .as_deref()
        .map(|n| require_bounded_text(n, "name", NAME_MAX_LEN))
        .transpose()?;
    let description = req
        .description
        .as_deref()
        .map(|d| require_bounded_text(d, "description", DESCRIPTION_MAX_LEN))
        .transpose()?;
    Ok((name, description))
}
