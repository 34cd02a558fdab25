use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::shared::OwnerSummary;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    /// State after the toggle.
    pub is_liked: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub owner: OwnerSummary,
    pub liked_at: DateTime<Utc>,
}
