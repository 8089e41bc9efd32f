use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::dto::job_dto::JobResponse;
use crate::dto::Choice;
use crate::models::application::{ApplicationStatus, EmployerApplication, SeekerApplication};
use crate::models::interview::InterviewWithJob;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ApplyForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub cover_letter: String,
}

impl ApplyForm {
    pub fn into_cover_letter(mut self) -> Result<String, ValidationErrors> {
        self.cover_letter = self.cover_letter.trim().to_string();
        self.validate()?;
        Ok(self.cover_letter)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

pub fn status_choices() -> Vec<Choice> {
    ApplicationStatus::ALL
        .iter()
        .map(|s| Choice::new(s.as_str(), s.label()))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyPage {
    pub job: JobResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerDashboardPage {
    pub jobs: Vec<JobResponse>,
    pub applications: Vec<EmployerApplication>,
    pub statuses: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeekerDashboardPage {
    pub applications: Vec<SeekerApplication>,
    pub interviews: Vec<InterviewWithJob>,
}
