use axum::{
    http::header::SET_COOKIE,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::utils::flash::{clear_cookie_header, Flash, Flashes};

/// A rendered page: queued flash messages plus the page's own context.
///
/// Showing the messages consumes them, so the flash cookie is cleared.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub messages: Vec<Flash>,
    pub page: T,
}

impl<T: Serialize> Page<T> {
    pub fn new(Flashes(messages): Flashes, page: T) -> Self {
        Self { messages, page }
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let consumed = !self.messages.is_empty();
        let mut response = Json(self).into_response();
        if consumed {
            response
                .headers_mut()
                .append(SET_COOKIE, clear_cookie_header());
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use serde_json::{json, Value as JsonValue};

    #[tokio::test]
    async fn messages_are_shown_once() {
        let flashes = Flashes(vec![Flash::success("Job closed.")]);
        let response = Page::new(flashes, json!({ "jobs": [] })).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("flash=;"));
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["messages"][0]["level"], "success");
        assert_eq!(body["messages"][0]["message"], "Job closed.");
        assert_eq!(body["page"]["jobs"], json!([]));
    }

    #[test]
    fn quiet_pages_leave_cookies_alone() {
        let response = Page::new(Flashes::default(), json!({})).into_response();
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
