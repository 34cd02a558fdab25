pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod queries;
pub mod response;
pub mod routes;
pub mod schema;
pub mod state;
pub mod tokens;
pub mod utils;

use axum::extract::DefaultBodyLimit;
use common::media::MediaProvider;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

/// Slack on top of the per-file limit for text fields and multipart framing.
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VidTube API",
        version = "1.0.0",
        description = "Video sharing backend: accounts, videos, comments, likes, subscriptions, playlists and tweets"
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Users", description = "Accounts, sessions and channel profiles"),
        (name = "Videos", description = "Publishing and browsing videos"),
        (name = "Comments", description = "Comments on videos"),
        (name = "Likes", description = "Likes on videos, comments and tweets"),
        (name = "Subscriptions", description = "Channel subscriptions"),
        (name = "Playlists", description = "User playlists"),
        (name = "Tweets", description = "Short text posts"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("accessToken"))),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    let body_limit = state
        .config
        .upload
        .max_file_size
        .saturating_mul(2)
        .saturating_add(FORM_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let cors = middleware::cors_layer(&state.config.server.cors);
    let media_root = match state.config.media.provider {
        MediaProvider::Local => Some(state.config.media.local.root.clone()),
        MediaProvider::Cloudinary => None,
    };

    let mut router = router
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api));

    if let Some(root) = media_root {
        router = router.nest_service("/media", ServeDir::new(root));
    }

    router
        .fallback(error::route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
