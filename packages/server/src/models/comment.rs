use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::OwnerSummary;
use crate::entity::comment;

pub const CONTENT_MAX_LEN: usize = 2000;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CommentRequest {
    /// Also accepted as `newComment`.
    #[serde(alias = "newComment")]
    #[schema(example = "Great video!")]
    pub content: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub video_id: Uuid,
    pub owner: OwnerSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(c: comment::Model, owner: OwnerSummary) -> Self {
        Self {
            id: c.id,
            content: c.content,
            video_id: c.video_id,
            owner,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    pub comments: Vec<CommentResponse>,
    pub total_comments: u64,
    pub page: u64,
    pub limit: u64,
}
