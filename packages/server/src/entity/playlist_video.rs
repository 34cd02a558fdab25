use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One slot of a playlist. The same video may occupy several slots; slot
/// order is the UUIDv7 order of `id`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "playlist_video")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub playlist_id: Uuid,
    #[sea_orm(belongs_to, from = "playlist_id", to = "id")]
    pub playlist: HasOne<super::playlist::Entity>,

    pub video_id: Uuid,
    #[sea_orm(belongs_to, from = "video_id", to = "id")]
    pub video: HasOne<super::video::Entity>,

    pub added_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
