pub mod access;
pub mod auth;
pub mod rate_limit;
