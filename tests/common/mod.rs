#![allow(dead_code)]

use std::env;
use std::sync::OnceLock;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, Response, StatusCode,
    },
    Router,
};
use serde_json::Value as JsonValue;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;
use uuid::Uuid;

use jobboard_backend::{
    config::init_config,
    database::pool::{create_pool, run_migrations},
    routes,
    utils::flash::{decode, Flash},
    AppState,
};

static DATABASE_URL: OnceLock<Option<String>> = OnceLock::new();

/// Sets the test environment once per binary; returns the real database URL if one was given.
pub fn init() -> Option<String> {
    DATABASE_URL
        .get_or_init(|| {
            dotenvy::dotenv().ok();
            let url = env::var("DATABASE_URL").ok();
            env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
            env::set_var("JWT_SECRET", "test_secret_key");
            env::set_var("REQUESTS_PER_SECOND", "10000");
            env::set_var(
                "MEDIA_ROOT",
                env::temp_dir().join(format!("jobboard-test-media-{}", Uuid::new_v4())),
            );
            if url.is_none() {
                env::set_var("DATABASE_URL", "postgres://localhost:1/jobboard_unreachable");
            }
            let _ = init_config();
            url
        })
        .clone()
}

/// Router over a pool that never connects; for requests that are answered before any query.
pub fn lazy_app() -> Router {
    init();
    let url = env::var("DATABASE_URL").expect("DATABASE_URL set by init");
    let pool = PgPoolOptions::new().connect_lazy(&url).expect("lazy pool");
    routes::router(AppState::new(pool))
}

/// Router over a migrated database, or `None` when `DATABASE_URL` is unset.
pub async fn db_app() -> Option<(Router, PgPool)> {
    if init().is_none() {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    }
    let pool = create_pool().await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    Some((routes::router(AppState::new(pool.clone())), pool))
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..10])
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("router never fails")
}

pub fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = session {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = session {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub const BOUNDARY: &str = "jobboard-test-boundary";

/// A `multipart/form-data` body with text fields and `(field, file name, bytes)` files.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn post_multipart(uri: &str, body: Vec<u8>, session: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(COOKIE, session)
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(res: Response<Body>) -> Vec<u8> {
    to_bytes(res.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(res: Response<Body>) -> JsonValue {
    serde_json::from_slice(&body_bytes(res).await).expect("json body")
}

pub fn location(res: &Response<Body>) -> String {
    res.headers()
        .get(LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

/// `name=value` of the first Set-Cookie for `name` with a non-empty value.
pub fn set_cookie(res: &Response<Body>, name: &str) -> Option<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| {
            pair.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
                .is_some_and(|value| !value.is_empty())
        })
        .map(str::to_string)
}

/// The flash message a redirect queued.
pub fn flash(res: &Response<Body>) -> Option<Flash> {
    let pair = set_cookie(res, "flash")?;
    let (_, raw) = pair.split_once('=')?;
    decode(raw).into_iter().next()
}

pub fn assert_redirect(res: &Response<Body>, to: &str) {
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(res), to);
}

/// Registers through the form and returns the session cookie pair.
pub async fn register(app: &Router, username: &str, user_type: &str) -> String {
    let email = format!("{username}@example.com");
    let body = serde_urlencoded::to_string([
        ("username", username),
        ("email", email.as_str()),
        ("password1", "s3cret-pass"),
        ("password2", "s3cret-pass"),
        ("first_name", "Test"),
        ("last_name", "User"),
        ("user_type", user_type),
        ("phone", "555-0100"),
        ("address", "1 Main St"),
        ("company_name", if user_type == "employer" { "Acme" } else { "" }),
    ])
    .unwrap();
    let res = send(app, post_form("/register/", &body, None)).await;
    assert_redirect(&res, "/");
    set_cookie(&res, "session").expect("session cookie after registration")
}

pub async fn category_id(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT id FROM job_categories WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seeded category")
}

pub struct JobInput<'a> {
    pub title: &'a str,
    pub category_id: i64,
    pub job_type: &'a str,
    pub skills: &'a str,
    pub deadline: chrono::NaiveDate,
}

/// Posts a job through the form and returns its id.
pub async fn post_job(app: &Router, pool: &PgPool, session: &str, job: JobInput<'_>) -> i64 {
    let category = job.category_id.to_string();
    let deadline = job.deadline.to_string();
    let body = serde_urlencoded::to_string([
        ("title", job.title),
        ("description", "Build and run services"),
        ("category", category.as_str()),
        ("job_type", job.job_type),
        ("location", "Remote"),
        ("salary", "50000.00"),
        ("requirements", "3 years"),
        ("skills_required", job.skills),
        ("application_deadline", deadline.as_str()),
    ])
    .unwrap();
    let res = send(app, post_form("/employer/post-job/", &body, Some(session))).await;
    assert_redirect(&res, "/employer/dashboard/");
    sqlx::query_scalar::<_, i64>("SELECT id FROM jobs WHERE title = $1")
        .bind(job.title)
        .fetch_one(pool)
        .await
        .expect("posted job")
}

pub async fn application_id(pool: &PgPool, job_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT id FROM job_applications WHERE job_id = $1")
        .bind(job_id)
        .fetch_one(pool)
        .await
        .expect("application row")
}
