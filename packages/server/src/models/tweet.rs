use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::OwnerSummary;
use crate::entity::tweet;

pub const CONTENT_MAX_LEN: usize = 280;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TweetRequest {
    /// Also accepted as `newTweet`.
    #[serde(alias = "newTweet")]
    #[schema(example = "Hello world")]
    pub content: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: Uuid,
    pub content: String,
    pub owner: OwnerSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TweetResponse {
    pub fn new(t: tweet::Model, owner: OwnerSummary) -> Self {
        Self {
            id: t.id,
            content: t.content,
            owner,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
