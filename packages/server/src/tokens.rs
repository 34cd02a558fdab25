use chrono::{DateTime, Duration, Utc};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::entity::{session, user};
use crate::error::AppError;
use crate::utils::jwt::{self, AccessClaims, RefreshClaims};

/// A freshly signed access/refresh token pair.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues, rotates and revokes session tokens.
///
/// At most one refresh token per user is valid at a time: the `session` row
/// stores the SHA-256 of the current one.
pub struct TokenIssuer<'a, C: ConnectionTrait> {
    db: &'a C,
    auth: &'a AuthConfig,
}

impl<'a, C: ConnectionTrait> TokenIssuer<'a, C> {
    pub fn new(db: &'a C, auth: &'a AuthConfig) -> Self {
        Self { db, auth }
    }

    /// Sign a new pair for `user` and make its refresh token the active one.
    pub async fn issue(&self, user: &user::Model) -> Result<TokenPair, AppError> {
        let (pair, expires_at) = self.sign_pair(user)?;

        let row = session::ActiveModel {
            user_id: Set(user.id),
            refresh_token_hash: Set(hash_token(&pair.refresh_token)),
            expires_at: Set(expires_at),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        session::Entity::insert(row)
            .on_conflict(
                OnConflict::column(session::Column::UserId)
                    .update_columns([
                        session::Column::RefreshTokenHash,
                        session::Column::ExpiresAt,
                        session::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;

        tracing::debug!(user_id = %user.id, "Issued session tokens");
        Ok(pair)
    }

    /// Exchange a valid, current refresh token for a new pair.
    ///
    /// The stored hash is swapped with a single conditional UPDATE, so of two
    /// concurrent refreshes presenting the same token only one succeeds.
    pub async fn refresh(&self, presented: Option<&str>) -> Result<TokenPair, AppError> {
        let presented = presented
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::TokenMissing)?;

        let claims: RefreshClaims = jwt::verify(presented, &self.auth.refresh_token_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        let user = user::Entity::find_by_id(claims.sub)
            .one(self.db)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        let (pair, expires_at) = self.sign_pair(&user)?;

        let swapped = session::Entity::update_many()
            .col_expr(
                session::Column::RefreshTokenHash,
                Expr::value(hash_token(&pair.refresh_token)),
            )
            .col_expr(session::Column::ExpiresAt, Expr::value(expires_at))
            .col_expr(session::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(session::Column::UserId.eq(user.id))
            .filter(session::Column::RefreshTokenHash.eq(hash_token(presented)))
            .exec(self.db)
            .await?;

        if swapped.rows_affected == 0 {
            tracing::warn!(user_id = %user.id, "Rejected stale or revoked refresh token");
            return Err(AppError::Unauthorized(
                "Refresh token is expired or used".into(),
            ));
        }

        Ok(pair)
    }

    /// Drop the user's session. Idempotent.
    pub async fn revoke(&self, user_id: Uuid) -> Result<(), AppError> {
        session::Entity::delete_many()
            .filter(session::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;
        Ok(())
    }

    fn sign_pair(&self, user: &user::Model) -> Result<(TokenPair, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.auth.access_token_ttl_secs);
        let refresh_exp = now + Duration::seconds(self.auth.refresh_token_ttl_secs);

        let access = AccessClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            fullname: user.fullname.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            jti: Uuid::new_v4(),
        };
        let refresh = RefreshClaims {
            sub: user.id,
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let access_token = jwt::sign(&access, &self.auth.access_token_secret)
            .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;
        let refresh_token = jwt::sign(&refresh, &self.auth.refresh_token_secret)
            .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

        Ok((
            TokenPair {
                access_token,
                refresh_token,
            },
            refresh_exp,
        ))
    }
}

/// SHA-256 hex digest of a refresh token, as stored in `session`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
