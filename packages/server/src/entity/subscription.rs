use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `subscriber_id` follows `channel_id`. Both reference `user`; the foreign
/// keys are added by `schema::ensure_constraints`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subscriber_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub channel_id: Uuid,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
