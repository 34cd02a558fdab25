use axum::body::Bytes;
use axum::extract::{Path, State};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::extractors::multipart::{MediaKind, UploadForm};
use crate::models::user::*;
use crate::queries::{channel, find_user, watch_history};
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;
use crate::tokens::{TokenIssuer, TokenPair};
use crate::utils::cookies::{REFRESH_TOKEN_COOKIE, with_session, without_session};
use crate::utils::hash;

const IDENTITY_TAKEN: &str = "User with email or username already exists";

fn identity_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::warn!("Lost a registration race, uploaded media is orphaned");
            AppError::Conflict(IDENTITY_TAKEN.into())
        }
        _ => AppError::from(e),
    }
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    operation_id = "registerUser",
    summary = "Register a new user",
    description = "Creates an account from a multipart form. `avatar` is required, `coverImage` optional; both must be images. The username is stored lowercase. Uniqueness is checked before any file is uploaded.",
    request_body(content = RegisterForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing field, missing avatar or invalid file type", body = ErrorBody),
        (status = 409, description = "Username or email already taken", body = ErrorBody),
        (status = 500, description = "Media upload failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let input = RegisterInput::validate(
        form.text("fullname").unwrap_or_default(),
        form.text("email").unwrap_or_default(),
        form.text("username").unwrap_or_default(),
        form.raw("password").unwrap_or_default(),
    )?;
    let avatar_file = form.require_file("avatar", MediaKind::Image)?;
    let cover_file = form.take_file("coverImage", MediaKind::Image)?;

    let taken = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(&input.username))
                .add(user::Column::Email.eq(&input.email)),
        )
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(IDENTITY_TAKEN.into()));
    }

    let password = hash::hash_password(&input.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let avatar = state.media.upload(avatar_file).await?;
    let cover_image = match cover_file {
        Some(file) => Some(state.media.upload(file).await?.url),
        None => None,
    };

    let now = Utc::now();
    let new_user = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        username: Set(input.username),
        email: Set(input.email),
        fullname: Set(input.fullname),
        password: Set(password),
        avatar: Set(avatar.url),
        cover_image: Set(cover_image),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let user = new_user.insert(&state.db).await.map_err(identity_conflict)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(ApiResponse::created(
        UserResponse::from(user),
        "User registered successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    operation_id = "loginUser",
    summary = "Log in with username or email",
    description = "Verifies credentials, issues a fresh token pair and sets the `accessToken` and `refreshToken` cookies. The tokens are also returned in the body.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Neither username nor email given", body = ErrorBody),
        (status = 401, description = "Wrong password", body = ErrorBody),
        (status = 404, description = "User does not exist", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), AppError> {
    let username = payload
        .username
        .as_deref()
        .map(|u| u.trim().to_lowercase())
        .filter(|u| !u.is_empty());
    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    if username.is_none() && email.is_none() {
        return Err(AppError::Validation(
            "username or email is required".into(),
        ));
    }
    let mut identity = Condition::any();
    if let Some(username) = username {
        identity = identity.add(user::Column::Username.eq(username));
    }
    if let Some(email) = email {
        identity = identity.add(user::Column::Email.eq(email));
    }

    let user = user::Entity::find()
        .filter(identity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User does not exist".into()))?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::Unauthorized("Invalid user credentials".into()));
    }

    let tokens = TokenIssuer::new(&state.db, &state.config.auth)
        .issue(&user)
        .await?;
    let jar = with_session(jar, &tokens, &state.config.auth);

    tracing::info!(user_id = %user.id, "User logged in");
    Ok((
        jar,
        ApiResponse::ok(
            LoginResponse {
                user: UserResponse::from(user),
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            "User logged in successfully",
        ),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Users",
    operation_id = "logoutUser",
    summary = "Log out",
    description = "Revokes the current refresh session and clears both session cookies. Revoking an already revoked session succeeds.",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<Empty>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, jar), fields(user_id = %auth_user.user_id))]
pub async fn logout(
    auth_user: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Empty>), AppError> {
    TokenIssuer::new(&state.db, &state.config.auth)
        .revoke(auth_user.user_id)
        .await?;
    Ok((
        without_session(jar, &state.config.auth),
        ApiResponse::ok(Empty {}, "User logged out"),
    ))
}

#[utoipa::path(
    post,
    path = "/refresh-token",
    tag = "Users",
    operation_id = "refreshAccessToken",
    summary = "Rotate the session tokens",
    description = "Exchanges the current refresh token (from the `refreshToken` cookie, or the JSON body) for a new pair. A refresh token that has already been rotated is rejected.",
    request_body(content = RefreshRequest, description = "Optional when the `refreshToken` cookie is sent", content_type = "application/json"),
    responses(
        (status = 200, description = "Tokens rotated", body = ApiResponse<TokenPair>),
        (status = 400, description = "Malformed JSON body", body = ErrorBody),
        (status = 401, description = "Missing, invalid, expired or reused refresh token", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, body))]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, ApiResponse<TokenPair>), AppError> {
    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))?
            .refresh_token
    };
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
        .or(from_body);

    let tokens = TokenIssuer::new(&state.db, &state.config.auth)
        .refresh(presented.as_deref())
        .await?;
    let jar = with_session(jar, &tokens, &state.config.auth);

    Ok((jar, ApiResponse::ok(tokens, "Access token refreshed")))
}

#[utoipa::path(
    patch,
    path = "/change-password",
    tag = "Users",
    operation_id = "changePassword",
    summary = "Change the current user's password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<Empty>),
        (status = 400, description = "Wrong old password or invalid new password", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    let existing = find_user(&state.db, auth_user.user_id).await?;

    let is_valid = hash::verify_password(&payload.old_password, &existing.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::Validation("Invalid old password".into()));
    }
    validate_password(&payload.new_password)?;

    let password = hash::hash_password(&payload.new_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let mut active: user::ActiveModel = existing.into();
    active.password = Set(password);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(ApiResponse::ok(Empty {}, "Password changed successfully"))
}

#[utoipa::path(
    get,
    path = "/current",
    tag = "Users",
    operation_id = "getCurrentUser",
    summary = "Get the current user",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn current_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = find_user(&state.db, auth_user.user_id).await?;
    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Current user fetched successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/update-account",
    tag = "Users",
    operation_id = "updateAccount",
    summary = "Update fullname and email",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn update_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateAccountRequest>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    if payload.fullname.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::Validation("All fields are required".into()));
    }
    let fullname = validate_fullname(&payload.fullname)?;
    let email = normalize_email(&payload.email)?;

    let clash = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .filter(user::Column::Id.ne(auth_user.user_id))
        .one(&state.db)
        .await?;
    if clash.is_some() {
        return Err(AppError::Conflict("Email is already in use".into()));
    }

    let existing = find_user(&state.db, auth_user.user_id).await?;
    let mut active: user::ActiveModel = existing.into();
    active.fullname = Set(fullname);
    active.email = Set(email);
    active.updated_at = Set(Utc::now());
    let user = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Email is already in use".into())
        }
        _ => AppError::from(e),
    })?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Account details updated successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/avatar",
    tag = "Users",
    operation_id = "updateAvatar",
    summary = "Replace the avatar",
    request_body(content = AvatarForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing or non-image file", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Media upload failed", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = %auth_user.user_id))]
pub async fn update_avatar(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let file = form.require_file("avatar", MediaKind::Image)?;
    let existing = find_user(&state.db, auth_user.user_id).await?;
    let uploaded = state.media.upload(file).await?;

    let mut active: user::ActiveModel = existing.into();
    active.avatar = Set(uploaded.url);
    active.updated_at = Set(Utc::now());
    let user = active.update(&state.db).await?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Avatar updated successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/cover-image",
    tag = "Users",
    operation_id = "updateCoverImage",
    summary = "Replace the cover image",
    request_body(content = CoverImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Cover image updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing or non-image file", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Media upload failed", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = %auth_user.user_id))]
pub async fn update_cover_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let file = form.require_file("coverImage", MediaKind::Image)?;
    let existing = find_user(&state.db, auth_user.user_id).await?;
    let uploaded = state.media.upload(file).await?;

    let mut active: user::ActiveModel = existing.into();
    active.cover_image = Set(Some(uploaded.url));
    active.updated_at = Set(Utc::now());
    let user = active.update(&state.db).await?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Cover image updated successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/channel/{username}",
    tag = "Users",
    operation_id = "getChannelProfile",
    summary = "Get a channel profile",
    description = "Case-insensitive lookup by username. Includes subscriber counts and whether the requesting user (if any) is subscribed.",
    params(("username" = String, Path, description = "Channel username")),
    responses(
        (status = 200, description = "Channel profile", body = ApiResponse<ChannelProfile>),
        (status = 401, description = "Invalid or expired token", body = ErrorBody),
        (status = 404, description = "Channel does not exist", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer))]
pub async fn channel_profile(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<ApiResponse<ChannelProfile>, AppError> {
    let profile = channel::channel_profile(&state.db, &username, viewer.user_id()).await?;
    Ok(ApiResponse::ok(profile, "User channel fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/watch-history",
    tag = "Users",
    operation_id = "getWatchHistory",
    summary = "Get the current user's watch history",
    description = "Most recently watched first. Each video carries its owner summary.",
    responses(
        (status = 200, description = "Watch history", body = ApiResponse<Vec<WatchHistoryEntry>>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = []), ("cookie" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_watch_history(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<WatchHistoryEntry>>, AppError> {
    let history = watch_history::watch_history(&state.db, auth_user.user_id).await?;
    Ok(ApiResponse::ok(
        history,
        "Watch history fetched successfully",
    ))
}
