use serde::Serialize;

pub mod account_dto;
pub mod application_dto;
pub mod interview_dto;
pub mod job_dto;

/// A `<select>` option: the submitted value and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

impl Choice {
    pub fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}
