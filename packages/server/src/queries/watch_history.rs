use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use uuid::Uuid;

use super::users_by_id;
use crate::entity::{video, watch_history};
use crate::error::AppError;
use crate::models::shared::{OwnerSummary, missing_owner};
use crate::models::user::WatchHistoryEntry;

/// Mark `video_id` as watched by `user_id` now.
pub async fn record_watch<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    video_id: Uuid,
) -> Result<(), DbErr> {
    let row = watch_history::ActiveModel {
        user_id: Set(user_id),
        video_id: Set(video_id),
        watched_at: Set(Utc::now()),
        ..Default::default()
    };
    watch_history::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                watch_history::Column::UserId,
                watch_history::Column::VideoId,
            ])
            .update_column(watch_history::Column::WatchedAt)
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// The user's watch history, most recent first.
///
/// Videos unpublished since they were watched are hidden unless the user
/// owns them.
pub async fn watch_history<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<WatchHistoryEntry>, AppError> {
    let rows = watch_history::Entity::find()
        .filter(watch_history::Column::UserId.eq(user_id))
        .find_also_related(video::Entity)
        .order_by_desc(watch_history::Column::WatchedAt)
        .order_by_asc(watch_history::Column::VideoId)
        .all(db)
        .await?;

    let watched: Vec<(watch_history::Model, video::Model)> = rows
        .into_iter()
        .filter_map(|(entry, video)| video.map(|v| (entry, v)))
        .filter(|(_, v)| v.is_published || v.owner_id == user_id)
        .collect();

    let owners = users_by_id(db, watched.iter().map(|(_, v)| v.owner_id)).await?;

    Ok(watched
        .into_iter()
        .map(|(entry, v)| {
            let owner = owners
                .get(&v.owner_id)
                .cloned()
                .map(OwnerSummary::from)
                .unwrap_or_else(|| missing_owner(v.owner_id));
            WatchHistoryEntry {
                id: v.id,
                title: v.title,
                description: v.description,
                video_file: v.video_file,
                thumbnail: v.thumbnail,
                duration: v.duration,
                owner,
                watched_at: entry.watched_at,
            }
        })
        .collect())
}
