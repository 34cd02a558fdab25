use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::user;
use crate::error::AppError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Raw `page` / `limit` query values. Kept as strings so a malformed value
/// falls back to the default instead of failing the request.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number. Defaults to 1.
    pub page: Option<String>,
    /// Items per page. Defaults to 10, capped at 100.
    pub limit: Option<String>,
}

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = positive_or(page, DEFAULT_PAGE);
        let limit = positive_or(limit, DEFAULT_LIMIT).min(MAX_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl From<&PageQuery> for PageWindow {
    fn from(q: &PageQuery) -> Self {
        Self::from_raw(q.page.as_deref(), q.limit.as_deref())
    }
}

fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default)
}

/// Trim a required text value, rejecting blanks.
pub fn require_text(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Like [`require_text`] with an upper bound in Unicode characters.
pub fn require_bounded_text(value: &str, field: &str, max: usize) -> Result<String, AppError> {
    let value = require_text(value, field)?;
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value)
}

/// Owner projection embedded in videos, comments and tweets.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Alice Liddell")]
    pub fullname: String,
    pub avatar: String,
}

impl From<user::Model> for OwnerSummary {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            fullname: u.fullname,
            avatar: u.avatar,
        }
    }
}

/// Public user projection used by subscription listings.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCard {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub avatar: String,
    pub cover_image: Option<String>,
}

impl From<user::Model> for UserCard {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            fullname: u.fullname,
            email: u.email,
            avatar: u.avatar,
            cover_image: u.cover_image,
        }
    }
}

/// Placeholder owner for rows whose user row vanished mid-query.
pub(crate) fn missing_owner(id: Uuid) -> OwnerSummary {
    OwnerSummary {
        id,
        username: String::new(),
        fullname: String::new(),
        avatar: String::new(),
    }
}
