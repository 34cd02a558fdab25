use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::AuthConfig;
use crate::tokens::TokenPair;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// HttpOnly, SameSite=Lax cookie on `/` living as long as the token it carries.
pub fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Add both session cookies for a freshly issued token pair.
pub fn with_session(jar: CookieJar, tokens: &TokenPair, auth: &AuthConfig) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        auth.access_token_ttl_secs,
        auth.cookie_secure,
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        auth.refresh_token_ttl_secs,
        auth.cookie_secure,
    ))
}

/// Expire both session cookies, whether or not the request carried them.
pub fn without_session(jar: CookieJar, auth: &AuthConfig) -> CookieJar {
    jar.add(expired_cookie(ACCESS_TOKEN_COOKIE, auth.cookie_secure))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE, auth.cookie_secure))
}

/// Same attributes as [`session_cookie`] so the browser overwrites it.
fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    cookie.make_removal();
    cookie
}
