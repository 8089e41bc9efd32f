use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::get_config,
    middleware::rate_limit::{limit_requests, RateLimiter},
    services::media_service::MediaKind,
    AppState,
};

pub mod account;
pub mod employer;
pub mod health;
pub mod jobs;
pub mod page;
pub mod seeker;

pub fn router(state: AppState) -> Router {
    let config = get_config();
    let profile_pics = ServeDir::new(state.media_service.root().join(MediaKind::ProfilePicture.dir()));

    let pages = Router::new()
        .route("/", get(jobs::home))
        .route("/jobs/", get(jobs::job_list))
        .route("/job/:id/", get(jobs::job_detail))
        .route("/job/:id/apply/", get(seeker::apply_page).post(seeker::apply))
        .route(
            "/register/",
            get(account::register_page).post(account::register),
        )
        .route("/login/", get(account::login_page).post(account::login))
        .route("/logout/", post(account::logout))
        .route(
            "/profile/",
            get(account::profile).post(account::update_profile),
        )
        .route("/job-seeker/dashboard/", get(seeker::dashboard));

    let employer = Router::new()
        .route("/employer/dashboard/", get(employer::dashboard))
        .route(
            "/employer/post-job/",
            get(employer::post_job_page).post(employer::post_job),
        )
        .route("/employer/job/:id/close/", post(employer::close_job))
        .route(
            "/employer/application/:id/update-status/",
            post(employer::update_status),
        )
        .route(
            "/employer/application/:id/schedule-interview/",
            get(employer::schedule_interview_page).post(employer::schedule_interview),
        )
        .route(
            "/employer/application/:id/view-resume/",
            get(employer::view_resume),
        )
        .route(
            "/employer/application/:id/download-resume/",
            get(employer::download_resume),
        );

    Router::new()
        .route("/health", get(health::health))
        .merge(pages)
        .merge(employer)
        .nest_service("/media/profile_pics", profile_pics)
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(config.requests_per_second),
            limit_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_upload_mb * 1024 * 1024))
}
