use chrono::{DateTime, Utc};
use sea_orm::Order;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::OwnerSummary;
use crate::entity::video;
use crate::error::AppError;

pub const TITLE_MAX_LEN: usize = 256;
pub const DESCRIPTION_MAX_LEN: usize = 5000;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VideoListQuery {
    /// Channel whose videos are listed. Required.
    pub user_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Case-insensitive title substring.
    pub query: Option<String>,
    /// `createdAt` (default), `updatedAt`, `title` or `duration`.
    pub sort_by: Option<String>,
    /// `asc`; anything else sorts descending.
    pub sort_type: Option<String>,
}

/// Column a video listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSort {
    CreatedAt,
    UpdatedAt,
    Title,
    Duration,
}

impl VideoSort {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(VideoSort::CreatedAt),
            Some("createdAt" | "created_at") => Ok(VideoSort::CreatedAt),
            Some("updatedAt" | "updated_at") => Ok(VideoSort::UpdatedAt),
            Some("title") => Ok(VideoSort::Title),
            Some("duration") => Ok(VideoSort::Duration),
            Some(other) => Err(AppError::Validation(format!(
                "Invalid sortBy '{other}': expected createdAt, updatedAt, title or duration"
            ))),
        }
    }

    pub fn column(self) -> video::Column {
        match self {
            VideoSort::CreatedAt => video::Column::CreatedAt,
            VideoSort::UpdatedAt => video::Column::UpdatedAt,
            VideoSort::Title => video::Column::Title,
            VideoSort::Duration => video::Column::Duration,
        }
    }
}

/// `asc` (any case) sorts ascending; anything else, including absence, descending.
pub fn parse_sort_type(raw: Option<&str>) -> Order {
    match raw {
        Some(v) if v.trim().eq_ignore_ascii_case("asc") => Order::Asc,
        _ => Order::Desc,
    }
}

/// Multipart publish form (documentation only).
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct PublishVideoForm {
    pub title: String,
    pub description: String,
    #[schema(format = Binary)]
    pub video_file: String,
    #[schema(format = Binary)]
    pub thumbnail: String,
}

/// Multipart update form (documentation only). Every field is optional.
#[derive(Deserialize, utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UpdateVideoForm {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(format = Binary)]
    pub thumbnail: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    #[schema(example = "My first video")]
    pub title: String,
    pub description: String,
    /// Seconds.
    #[schema(example = 42.5)]
    pub duration: f64,
    pub is_published: bool,
    pub owner: OwnerSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn new(v: video::Model, owner: OwnerSummary) -> Self {
        Self {
            id: v.id,
            video_file: v.video_file,
            thumbnail: v.thumbnail,
            title: v.title,
            description: v.description,
            duration: v.duration,
            is_published: v.is_published,
            owner,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    pub videos: Vec<VideoResponse>,
    /// Number of matching videos across all pages.
    pub total_videos: u64,
    pub page: u64,
    pub limit: u64,
}
