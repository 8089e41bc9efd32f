use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};

/// Status of an application in the hiring pipeline.
///
/// Employers may move an application to any status at any time; no state is
/// terminal. The only automatic transition is to `InterviewScheduled` when an
/// interview is booked.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Shortlisted,
    Rejected,
    InterviewScheduled,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::Hired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Hired => "hired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::InterviewScheduled => "Interview Scheduled",
            ApplicationStatus::Hired => "Hired",
        }
    }

    pub fn can_transition_to(&self, _next: ApplicationStatus) -> bool {
        true
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub applicant_id: i64,
    pub applied_at: DateTime<Utc>,
    pub cover_letter: String,
    pub status: ApplicationStatus,
}

/// An application as the employer sees it on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployerApplication {
    pub id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub applicant_id: i64,
    pub applicant_username: String,
    pub applicant_first_name: String,
    pub applicant_last_name: String,
    pub applicant_email: String,
    pub applicant_phone: Option<String>,
    pub has_resume: bool,
    pub applied_at: DateTime<Utc>,
    pub cover_letter: String,
    pub status: ApplicationStatus,
    pub interview_id: Option<i64>,
}

/// An application as the applicant sees it on their dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeekerApplication {
    pub id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub job_location: String,
    pub company_name: String,
    pub applied_at: DateTime<Utc>,
    pub status: ApplicationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_parse_from_their_form_values() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
        assert!("withdrawn".parse::<ApplicationStatus>().is_err());
        assert!("Hired".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn any_status_may_follow_any_other() {
        for from in ApplicationStatus::ALL {
            for to in ApplicationStatus::ALL {
                assert!(from.can_transition_to(to));
            }
        }
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Applied);
    }
}
