pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    account_service::AccountService, application_service::ApplicationService,
    category_service::CategoryService, interview_service::InterviewService,
    job_service::JobService, media_service::MediaService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub account_service: AccountService,
    pub category_service: CategoryService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub interview_service: InterviewService,
    pub media_service: MediaService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let account_service = AccountService::new(pool.clone());
        let category_service = CategoryService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let interview_service = InterviewService::new(pool.clone());
        let media_service = MediaService::new(config.media_root.clone());

        Self {
            pool,
            account_service,
            category_service,
            job_service,
            application_service,
            interview_service,
            media_service,
        }
    }
}
