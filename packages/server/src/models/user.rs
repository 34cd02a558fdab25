use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::OwnerSummary;
use crate::entity::user;
use crate::error::AppError;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Either `username` or `email` is required.
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Ignored when the `refreshToken` cookie is present.
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateAccountRequest {
    pub fullname: String,
    pub email: String,
}

/// Text fields of the registration form.
#[derive(Debug)]
pub struct RegisterInput {
    pub fullname: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Multipart registration form (documentation only).
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct RegisterForm {
    pub fullname: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[schema(format = Binary)]
    pub avatar: String,
    #[schema(format = Binary)]
    pub cover_image: Option<String>,
}

/// Multipart avatar upload (documentation only).
#[derive(Deserialize, utoipa::ToSchema)]
#[allow(dead_code)]
pub struct AvatarForm {
    #[schema(format = Binary)]
    pub avatar: String,
}

/// Multipart cover image upload (documentation only).
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CoverImageForm {
    #[schema(format = Binary)]
    pub cover_image: String,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// A user without credentials.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice Liddell")]
    pub fullname: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            fullname: u.fullname,
            avatar: u.avatar,
            cover_image: u.cover_image,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    /// Number of users subscribed to this channel.
    pub subscriber_count: u64,
    /// Number of channels this user subscribes to.
    pub channel_subscribed_to_count: u64,
    /// Whether the requesting user subscribes to this channel.
    pub is_subscribed: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub owner: OwnerSummary,
    pub watched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(AppError::Validation(format!(
            "Password must be {PASSWORD_MIN_LEN}-{PASSWORD_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Normalize a username: trimmed, lowercase, 3-30 of `[a-z0-9_.-]`.
pub fn normalize_username(raw: &str) -> Result<String, AppError> {
    let username = raw.trim().to_lowercase();
    let len = username.chars().count();
    if !(3..=30).contains(&len) {
        return Err(AppError::Validation(
            "Username must be 3-30 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, '_', '.' and '-'".into(),
        ));
    }
    Ok(username)
}

/// Normalize an email address: trimmed, lowercase, one `@` with a dotted domain.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid || email.len() > 254 {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    Ok(email)
}

pub fn validate_fullname(raw: &str) -> Result<String, AppError> {
    let fullname = raw.trim();
    if fullname.is_empty() || fullname.chars().count() > 100 {
        return Err(AppError::Validation(
            "Fullname must be 1-100 characters".into(),
        ));
    }
    Ok(fullname.to_string())
}

impl RegisterInput {
    pub fn validate(
        fullname: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, AppError> {
        if [fullname, email, username, password]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err(AppError::Validation("All fields are required".into()));
        }
        validate_password(password)?;
        Ok(Self {
            fullname: validate_fullname(fullname)?,
            email: normalize_email(email)?,
            username: normalize_username(username)?,
            password: password.to_string(),
        })
    }
}
