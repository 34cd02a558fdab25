use sea_orm::*;
use uuid::Uuid;

use crate::entity::{subscription, user};
use crate::error::AppError;
use crate::models::user::ChannelProfile;

/// Public profile of the channel named `username`, as seen by `viewer`.
pub async fn channel_profile<C: ConnectionTrait>(
    db: &C,
    username: &str,
    viewer: Option<Uuid>,
) -> Result<ChannelProfile, AppError> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::Validation("Username is missing".into()));
    }

    let channel = user::Entity::find()
        .filter(user::Column::Username.eq(&username))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Channel does not exist".into()))?;

    let subscriber_count = subscription::Entity::find()
        .filter(subscription::Column::ChannelId.eq(channel.id))
        .count(db)
        .await?;
    let channel_subscribed_to_count = subscription::Entity::find()
        .filter(subscription::Column::SubscriberId.eq(channel.id))
        .count(db)
        .await?;

    let is_subscribed = match viewer {
        Some(viewer_id) => subscription::Entity::find_by_id((viewer_id, channel.id))
            .one(db)
            .await?
            .is_some(),
        None => false,
    };

    Ok(ChannelProfile {
        id: channel.id,
        username: channel.username,
        fullname: channel.fullname,
        email: channel.email,
        avatar: channel.avatar,
        cover_image: channel.cover_image,
        subscriber_count,
        channel_subscribed_to_count,
        is_subscribed,
    })
}
