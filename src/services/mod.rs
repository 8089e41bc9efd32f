pub mod account_service;
pub mod application_service;
pub mod category_service;
pub mod interview_service;
pub mod job_service;
pub mod media_service;
