use sea_orm::*;
use uuid::Uuid;

use super::{find_user, users_by_id};
use crate::entity::{like, subscription, tweet, video};
use crate::error::AppError;
use crate::models::like::LikedVideo;
use crate::models::shared::{OwnerSummary, UserCard, missing_owner};
use crate::models::subscription::{SubscribedChannelEntry, SubscriberEntry};
use crate::models::tweet::TweetResponse;

/// Tweets of a user, newest first.
pub async fn user_tweets<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<TweetResponse>, AppError> {
    let owner = OwnerSummary::from(find_user(db, user_id).await?);

    let tweets = tweet::Entity::find()
        .filter(tweet::Column::OwnerId.eq(user_id))
        .order_by_desc(tweet::Column::CreatedAt)
        .order_by_desc(tweet::Column::Id)
        .all(db)
        .await?;

    Ok(tweets
        .into_iter()
        .map(|t| TweetResponse::new(t, owner.clone()))
        .collect())
}

/// Videos liked by a user, most recent like first.
///
/// Unpublished videos only appear to their owner.
pub async fn liked_videos<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<LikedVideo>, AppError> {
    let rows = like::Entity::find()
        .filter(like::Column::LikedBy.eq(user_id))
        .filter(like::Column::VideoId.is_not_null())
        .find_also_related(video::Entity)
        .order_by_desc(like::Column::CreatedAt)
        .order_by_desc(like::Column::Id)
        .all(db)
        .await?;

    let liked: Vec<(like::Model, video::Model)> = rows
        .into_iter()
        .filter_map(|(l, v)| v.map(|v| (l, v)))
        .filter(|(_, v)| v.is_published || v.owner_id == user_id)
        .collect();

    let owners = users_by_id(db, liked.iter().map(|(_, v)| v.owner_id)).await?;

    Ok(liked
        .into_iter()
        .map(|(l, v)| {
            let owner = owners
                .get(&v.owner_id)
                .cloned()
                .map(OwnerSummary::from)
                .unwrap_or_else(|| missing_owner(v.owner_id));
            LikedVideo {
                id: v.id,
                title: v.title,
                description: v.description,
                video_file: v.video_file,
                thumbnail: v.thumbnail,
                duration: v.duration,
                owner,
                liked_at: l.created_at,
            }
        })
        .collect())
}

/// Users subscribed to `channel_id`, newest subscription first.
pub async fn channel_subscribers<C: ConnectionTrait>(
    db: &C,
    channel_id: Uuid,
) -> Result<Vec<SubscriberEntry>, AppError> {
    find_user(db, channel_id).await?;

    let subs = subscription::Entity::find()
        .filter(subscription::Column::ChannelId.eq(channel_id))
        .order_by_desc(subscription::Column::CreatedAt)
        .order_by_asc(subscription::Column::SubscriberId)
        .all(db)
        .await?;

    let mut users = users_by_id(db, subs.iter().map(|s| s.subscriber_id)).await?;

    Ok(subs
        .into_iter()
        .filter_map(|s| {
            users.remove(&s.subscriber_id).map(|u| SubscriberEntry {
                subscriber: UserCard::from(u),
                subscribed_at: s.created_at,
            })
        })
        .collect())
}

/// Channels `subscriber_id` subscribes to, newest subscription first.
pub async fn subscribed_channels<C: ConnectionTrait>(
    db: &C,
    subscriber_id: Uuid,
) -> Result<Vec<SubscribedChannelEntry>, AppError> {
    find_user(db, subscriber_id).await?;

    let subs = subscription::Entity::find()
        .filter(subscription::Column::SubscriberId.eq(subscriber_id))
        .order_by_desc(subscription::Column::CreatedAt)
        .order_by_asc(subscription::Column::ChannelId)
        .all(db)
        .await?;

    let mut users = users_by_id(db, subs.iter().map(|s| s.channel_id)).await?;

    Ok(subs
        .into_iter()
        .filter_map(|s| {
            users.remove(&s.channel_id).map(|u| SubscribedChannelEntry {
                channel: UserCard::from(u),
                subscribed_at: s.created_at,
            })
        })
        .collect())
}
