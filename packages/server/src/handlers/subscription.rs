use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{subscription, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::subscription::*;
use crate::queries::listings;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::utils::id::parse_id;

#[utoipa::path(
    post,
    path = "/{channelId}/toggle",
    tag = "Subscriptions",
    operation_id = "toggleSubscription",
    summary = "Subscribe to or unsubscribe from a channel",
    params(("channelId" = String, Path, description = "Channel (user) ID")),
    responses(
        (status = 200, description = "New subscription state", body = ApiResponse<SubscriptionStatus>),
        (status = 400, description = "Invalid channel ID or own channel", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Channel not found", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, channel_id = %raw_id))]
pub async fn toggle_subscription(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<SubscriptionStatus>, AppError> {
    let channel_id = parse_id(&raw_id, "channel")?;
    if channel_id == auth_user.user_id {
        return Err(AppError::Validation(
            "You cannot subscribe to your own channel".into(),
        ));
    }
    user::Entity::find_by_id(channel_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Channel not found".into()))?;

    let removed = subscription::Entity::delete_many()
        .filter(subscription::Column::SubscriberId.eq(auth_user.user_id))
        .filter(subscription::Column::ChannelId.eq(channel_id))
        .exec(&state.db)
        .await?;
    if removed.rows_affected > 0 {
        return Ok(ApiResponse::ok(
            SubscriptionStatus {
                is_subscribed: false,
            },
            "Unsubscribed successfully",
        ));
    }

    let row = subscription::ActiveModel {
        subscriber_id: Set(auth_user.user_id),
        channel_id: Set(channel_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let inserted = subscription::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                subscription::Column::SubscriberId,
                subscription::Column::ChannelId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await?;
    if inserted == 0 {
        tracing::debug!("Subscription already inserted by a concurrent request");
    }

    Ok(ApiResponse::ok(
        SubscriptionStatus {
            is_subscribed: true,
        },
        "Subscribed successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/{channelId}/subscribers",
    tag = "Subscriptions",
    operation_id = "getChannelSubscribers",
    summary = "List a channel's subscribers",
    description = "Newest subscription first. Empty when nobody subscribes.",
    params(("channelId" = String, Path, description = "Channel (user) ID")),
    responses(
        (status = 200, description = "Subscribers", body = ApiResponse<Vec<SubscriberEntry>>),
        (status = 400, description = "Invalid channel ID format", body = ErrorBody),
        (status = 404, description = "User does not exist", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(channel_id = %raw_id))]
pub async fn channel_subscribers(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Vec<SubscriberEntry>>, AppError> {
    let channel_id = parse_id(&raw_id, "channel")?;
    let subscribers = listings::channel_subscribers(&state.db, channel_id).await?;
    Ok(ApiResponse::ok(subscribers, "Subscribers fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/u/{subscriberId}/channels",
    tag = "Subscriptions",
    operation_id = "getSubscribedChannels",
    summary = "List the channels a user subscribes to",
    description = "Newest subscription first. Empty when the user subscribes to nothing.",
    params(("subscriberId" = String, Path, description = "Subscriber (user) ID")),
    responses(
        (status = 200, description = "Subscribed channels", body = ApiResponse<Vec<SubscribedChannelEntry>>),
        (status = 400, description = "Invalid subscriber ID format", body = ErrorBody),
        (status = 404, description = "User does not exist", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(subscriber_id = %raw_id))]
pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Vec<SubscribedChannelEntry>>, AppError> {
    let subscriber_id = parse_id(&raw_id, "subscriber")?;
    let channels = listings::subscribed_channels(&state.db, subscriber_id).await?;
    Ok(ApiResponse::ok(
        channels,
        "Subscribed channels fetched successfully",
    ))
}
