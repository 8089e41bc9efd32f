use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::convert::Infallible;

use crate::config::get_config;
use crate::utils::token::{decode_session_token, SESSION_COOKIE};

/// Identity carried by a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

/// Who is making the request, and what they asked for.
///
/// `path` is the requested path and query, used as the `next` target when an
/// anonymous actor is sent to the login page.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: Option<SessionUser>,
    pub path: String,
}

impl Actor {
    pub fn anonymous(path: impl Into<String>) -> Self {
        Self {
            user: None,
            path: path.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|t| t.trim().to_string())
}

fn session_user(token: &str, secret: &str) -> Option<SessionUser> {
    let claims = match decode_session_token(token, secret) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, "ignoring invalid session token");
            return None;
        }
    };
    let id = claims.user_id().ok()?;
    Some(SessionUser {
        id,
        username: claims.username,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let token = bearer_token(parts).or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(SESSION_COOKIE)
                .map(|c| c.value().to_string())
        });

        let user = token.and_then(|t| session_user(&t, &get_config().jwt_secret));
        Ok(Actor { user, path })
    }
}

/// Browser-session cookie; the token's own `exp` bounds its lifetime.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(get_config().secure_cookies)
        .build()
}

/// Cookie to pass to `CookieJar::remove` on logout.
pub fn session_removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
