use sea_orm::sea_query::{ForeignKey, ForeignKeyAction, Index, PostgresQueryBuilder};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityName};
use tracing::info;

use crate::entity::{comment, like, playlist_video, subscription, tweet, user, video, watch_history};

/// Create the indexes and constraints entity sync cannot express.
///
/// Safe to run on every startup.
pub async fn ensure_constraints(db: &DatabaseConnection) -> Result<(), DbErr> {
    // At most one like per (user, target). NULL targets never collide, so a
    // plain unique index per target column is enough.
    let like_targets = [
        ("idx_like_user_video", like::Column::VideoId),
        ("idx_like_user_comment", like::Column::CommentId),
        ("idx_like_user_tweet", like::Column::TweetId),
    ];
    for (name, column) in like_targets {
        let stmt = Index::create()
            .if_not_exists()
            .unique()
            .name(name)
            .table(like::Entity)
            .col(like::Column::LikedBy)
            .col(column)
            .to_string(PostgresQueryBuilder);
        db.execute_unprepared(&stmt).await?;
        info!("Ensured index {} exists", name);
    }

    add_constraint_if_missing(
        db,
        "like_single_target",
        &format!(
            "ALTER TABLE \"{}\" ADD CONSTRAINT like_single_target \
             CHECK (num_nonnulls(video_id, comment_id, tweet_id) = 1)",
            like::Entity.table_name()
        ),
    )
    .await?;

    let subscription_fks = [
        ("fk_subscription_subscriber", subscription::Column::SubscriberId),
        ("fk_subscription_channel", subscription::Column::ChannelId),
    ];
    for (name, column) in subscription_fks {
        let stmt = ForeignKey::create()
            .name(name)
            .from(subscription::Entity, column)
            .to(user::Entity, user::Column::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .to_string(PostgresQueryBuilder);
        add_constraint_if_missing(db, name, &stmt).await?;
    }

    // Listing indexes: newest-first scans per owner / parent.
    let listing_indexes = [
        Index::create()
            .if_not_exists()
            .name("idx_video_owner_created")
            .table(video::Entity)
            .col(video::Column::OwnerId)
            .col(video::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_comment_video_created")
            .table(comment::Entity)
            .col(comment::Column::VideoId)
            .col(comment::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_tweet_owner_created")
            .table(tweet::Entity)
            .col(tweet::Column::OwnerId)
            .col(tweet::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_subscription_channel")
            .table(subscription::Entity)
            .col(subscription::Column::ChannelId)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_watch_history_user_watched")
            .table(watch_history::Entity)
            .col(watch_history::Column::UserId)
            .col(watch_history::Column::WatchedAt)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_playlist_video_playlist")
            .table(playlist_video::Entity)
            .col(playlist_video::Column::PlaylistId)
            .to_string(PostgresQueryBuilder),
    ];
    for stmt in listing_indexes {
        if let Err(e) = db.execute_unprepared(&stmt).await {
            tracing::warn!("Failed to create listing index: {}", e);
        }
    }

    Ok(())
}

/// Postgres has no `ADD CONSTRAINT IF NOT EXISTS`; guard on `pg_constraint`.
async fn add_constraint_if_missing(
    db: &DatabaseConnection,
    name: &str,
    alter_stmt: &str,
) -> Result<(), DbErr> {
    let stmt = format!(
        "DO $$ BEGIN \
         IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = '{name}') THEN \
         {alter_stmt}; \
         END IF; \
         END $$;"
    );
    db.execute_unprepared(&stmt).await?;
    info!("Ensured constraint {} exists", name);
    Ok(())
}
