use chrono::{DateTime, Utc};
use serde::Serialize;

use super::shared::UserCard;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    /// State after the toggle.
    pub is_subscribed: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberEntry {
    pub subscriber: UserCard,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannelEntry {
    pub channel: UserCard,
    pub subscribed_at: DateTime<Utc>,
}
