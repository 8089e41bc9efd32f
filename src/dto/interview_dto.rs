use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use crate::dto::Choice;
use crate::models::application::EmployerApplication;
use crate::models::interview::{InterviewType, InterviewVenue};
use crate::services::interview_service::NewInterview;
use crate::utils::form::blank_as_none;
use crate::utils::time::parse_local_datetime;
use crate::utils::validation::add_field_error;

const REQUIRED: &str = "This field is required.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewForm {
    #[serde(default)]
    pub scheduled_date: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub interview_type: String,
    #[serde(default)]
    pub location_or_link: String,
    #[serde(default)]
    pub notes: String,
}

impl InterviewForm {
    pub fn into_new_interview(self) -> Result<NewInterview, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let scheduled_at = if self.scheduled_date.trim().is_empty() {
            add_field_error(&mut errors, "scheduled_date", "required", REQUIRED);
            None
        } else {
            let parsed = parse_local_datetime(&self.scheduled_date);
            if parsed.is_none() {
                add_field_error(
                    &mut errors,
                    "scheduled_date",
                    "invalid",
                    "Enter a valid date/time.",
                );
            }
            parsed
        };

        let duration_minutes = match self.duration.as_deref().map(str::parse::<i32>) {
            None => {
                add_field_error(&mut errors, "duration", "required", REQUIRED);
                None
            }
            Some(Err(_)) => {
                add_field_error(&mut errors, "duration", "invalid", "Enter a whole number.");
                None
            }
            Some(Ok(minutes)) if minutes <= 0 => {
                add_field_error(
                    &mut errors,
                    "duration",
                    "min_value",
                    "Ensure this value is greater than or equal to 1.",
                );
                None
            }
            Some(Ok(minutes)) => Some(minutes),
        };

        let venue = match self.interview_type.parse::<InterviewType>() {
            Ok(medium) => match InterviewVenue::parse(medium, &self.location_or_link) {
                Ok(venue) => Some(venue),
                Err(message) => {
                    add_field_error(&mut errors, "location_or_link", "invalid", message);
                    None
                }
            },
            Err(_) => {
                add_field_error(
                    &mut errors,
                    "interview_type",
                    "invalid_choice",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        self.interview_type
                    ),
                );
                None
            }
        };

        match (scheduled_at, duration_minutes, venue) {
            (Some(scheduled_at), Some(duration_minutes), Some(venue)) if errors.errors().is_empty() => {
                Ok(NewInterview {
                    scheduled_at,
                    duration_minutes,
                    venue,
                    notes: self.notes.trim().to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}

pub fn interview_type_choices() -> Vec<Choice> {
    InterviewType::ALL
        .iter()
        .map(|t| Choice::new(t.as_str(), t.label()))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleInterviewPage {
    pub application: EmployerApplication,
    pub interview_types: Vec<Choice>,
}
