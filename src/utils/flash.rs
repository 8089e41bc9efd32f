//! One-shot flash messages carried across a redirect in the `flash` cookie.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }
}

pub fn encode(flashes: &[Flash]) -> String {
    let json = serde_json::to_string(flashes).unwrap_or_else(|_| "[]".to_string());
    url::form_urlencoded::byte_serialize(json.as_bytes()).collect()
}

/// Tampered or stale cookies decode to no messages.
pub fn decode(raw: &str) -> Vec<Flash> {
    // byte_serialize never emits '=' or '&', so the whole value is one key
    let Some((json, _)) = url::form_urlencoded::parse(raw.as_bytes()).next() else {
        return Vec::new();
    };
    serde_json::from_str(&json).unwrap_or_default()
}

/// `303 See Other` to `location`, optionally queueing a flash message for the next page.
#[derive(Debug, Clone)]
pub struct FlashRedirect {
    pub flash: Option<Flash>,
    pub location: String,
}

impl FlashRedirect {
    pub fn new(flash: Flash, location: impl Into<String>) -> Self {
        Self {
            flash: Some(flash),
            location: location.into(),
        }
    }

    pub fn to(location: impl Into<String>) -> Self {
        Self {
            flash: None,
            location: location.into(),
        }
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.location).into_response();
        if let Some(flash) = self.flash {
            let cookie = Cookie::build((FLASH_COOKIE, encode(&[flash])))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build();
            if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

/// Messages queued by the previous response.
#[derive(Debug, Clone, Default)]
pub struct Flashes(pub Vec<Flash>);

#[async_trait]
impl<S> FromRequestParts<S> for Flashes
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let flashes = jar
            .get(FLASH_COOKIE)
            .map(|cookie| decode(cookie.value()))
            .unwrap_or_default();
        Ok(Flashes(flashes))
    }
}

/// Set-Cookie value that expires the flash cookie once its messages were shown.
pub fn clear_cookie_header() -> HeaderValue {
    HeaderValue::from_static("flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
