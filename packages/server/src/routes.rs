use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

/// Every versioned endpoint, mounted under `/v1`.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1_routes())
}

fn v1_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::healthcheck))
        .nest("/users", user_routes())
        .nest("/videos", video_routes())
        .nest("/comments", comment_routes())
        .nest("/likes", like_routes())
        .nest("/subscriptions", subscription_routes())
        .nest("/playlists", playlist_routes())
        .nest("/tweets", tweet_routes())
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::register))
        .routes(routes!(handlers::user::login))
        .routes(routes!(handlers::user::logout))
        .routes(routes!(handlers::user::refresh_token))
        .routes(routes!(handlers::user::change_password))
        .routes(routes!(handlers::user::current_user))
        .routes(routes!(handlers::user::update_account))
        .routes(routes!(handlers::user::update_avatar))
        .routes(routes!(handlers::user::update_cover_image))
        .routes(routes!(handlers::user::channel_profile))
        .routes(routes!(handlers::user::get_watch_history))
}

fn video_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::video::list_videos,
            handlers::video::publish_video
        ))
        .routes(routes!(
            handlers::video::get_video,
            handlers::video::update_video,
            handlers::video::delete_video
        ))
        .routes(routes!(handlers::video::toggle_publish))
}

/// `/comments/{id}`: GET and POST take a video id, PATCH and DELETE a comment id.
fn comment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::comment::list_comments,
        handlers::comment::add_comment,
        handlers::comment::update_comment,
        handlers::comment::delete_comment
    ))
}

fn like_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::like::toggle_video_like))
        .routes(routes!(handlers::like::toggle_comment_like))
        .routes(routes!(handlers::like::toggle_tweet_like))
        .routes(routes!(handlers::like::liked_videos))
}

fn subscription_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::subscription::toggle_subscription))
        .routes(routes!(handlers::subscription::channel_subscribers))
        .routes(routes!(handlers::subscription::subscribed_channels))
}

fn playlist_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::playlist::create_playlist))
        .routes(routes!(handlers::playlist::user_playlists))
        .routes(routes!(
            handlers::playlist::get_playlist,
            handlers::playlist::update_playlist,
            handlers::playlist::delete_playlist
        ))
        .routes(routes!(handlers::playlist::add_video))
        .routes(routes!(handlers::playlist::remove_video))
}

fn tweet_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::tweet::create_tweet))
        .routes(routes!(handlers::tweet::user_tweets))
        .routes(routes!(
            handlers::tweet::update_tweet,
            handlers::tweet::delete_tweet
        ))
}
