use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user's like on exactly one video, comment or tweet.
///
/// Exactly-one-target and per-(user, target) uniqueness are enforced by
/// `schema::ensure_constraints`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "like")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub liked_by: Uuid,
    #[sea_orm(belongs_to, from = "liked_by", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub video_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "video_id", to = "id")]
    pub video: HasOne<super::video::Entity>,

    pub comment_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "comment_id", to = "id")]
    pub comment: HasOne<super::comment::Entity>,

    pub tweet_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "tweet_id", to = "id")]
    pub tweet: HasOne<super::tweet::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
