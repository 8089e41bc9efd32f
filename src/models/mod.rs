pub mod application;
pub mod category;
pub mod interview;
pub mod job;
pub mod profile;
pub mod user;
