//! Denormalized reads that join across several tables.

pub mod channel;
pub mod listings;
pub mod watch_history;

use std::collections::{HashMap, HashSet};

use sea_orm::*;
use uuid::Uuid;

use crate::entity::{comment, playlist, tweet, user, video};
use crate::error::AppError;

/// Load a user or fail with `NotFound("User does not exist")`.
pub async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User does not exist".into()))
}

pub async fn find_video<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<video::Model, AppError> {
    video::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}

/// Like [`find_video`], but an unpublished video is only found by its owner.
pub async fn find_visible_video<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    viewer: Option<Uuid>,
) -> Result<video::Model, AppError> {
    let video = find_video(db, id).await?;
    if !video.is_published && viewer != Some(video.owner_id) {
        return Err(AppError::NotFound("Video not found".into()));
    }
    Ok(video)
}

pub async fn find_comment<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<comment::Model, AppError> {
    comment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))
}

pub async fn find_tweet<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<tweet::Model, AppError> {
    tweet::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tweet not found".into()))
}

pub async fn find_playlist<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<playlist::Model, AppError> {
    playlist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".into()))
}

/// Fetch a set of users in one query, keyed by id.
pub async fn users_by_id<C, I>(db: &C, ids: I) -> Result<HashMap<Uuid, user::Model>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Uuid>,
{
    let ids: Vec<Uuid> = ids.into_iter().collect::<HashSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}
