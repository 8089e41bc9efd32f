use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::dto::Choice;
use crate::models::category::Category;
use crate::models::job::{JobListing, JobType};
use crate::services::job_service::{check_deadline, NewJob};
use crate::utils::form::blank_as_none;
use crate::utils::validation::{add_field_error, validate_with};

const REQUIRED: &str = "This field is required.";

/// Largest salary a `NUMERIC(10, 2)` column holds, exclusive.
const SALARY_LIMIT: i64 = 100_000_000;

/// Catalog query string; blank values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct JobForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Enter a title of at most 200 characters."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub description: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Enter a location of at most 100 characters."))]
    pub location: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub salary: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub requirements: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub skills_required: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub application_deadline: Option<String>,
}

pub fn parse_salary(raw: &str) -> Result<Decimal, &'static str> {
    let salary: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| "Enter a number.")?;
    if salary.is_sign_negative() && !salary.is_zero() {
        return Err("Ensure this value is greater than or equal to 0.");
    }
    if salary.normalize().scale() > 2 {
        return Err("Ensure that there are no more than 2 decimal places.");
    }
    if salary >= Decimal::from(SALARY_LIMIT) {
        return Err("Ensure that there are no more than 8 digits before the decimal point.");
    }
    Ok(salary)
}

impl JobForm {
    /// Validates the posting form against `today` and converts it for the service.
    pub fn into_new_job(mut self, today: NaiveDate) -> Result<NewJob, ValidationErrors> {
        self.title = self.title.trim().to_string();
        self.location = self.location.trim().to_string();

        let category_id = self.category.as_deref().map(str::parse::<i64>);
        let job_type = self.job_type.parse::<JobType>();
        let salary = self.salary.as_deref().map(parse_salary).transpose();
        let deadline = self
            .application_deadline
            .as_deref()
            .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

        validate_with(&self, |errors| {
            match &category_id {
                None => add_field_error(errors, "category", "required", REQUIRED),
                Some(Err(_)) => add_field_error(
                    errors,
                    "category",
                    "invalid_choice",
                    "Select a valid choice. That choice is not one of the available choices.",
                ),
                Some(Ok(_)) => {}
            }
            if job_type.is_err() {
                add_field_error(
                    errors,
                    "job_type",
                    "invalid_choice",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        self.job_type
                    ),
                );
            }
            if let Err(message) = &salary {
                add_field_error(errors, "salary", "invalid", *message);
            }
            match &deadline {
                None => add_field_error(errors, "application_deadline", "required", REQUIRED),
                Some(Err(_)) => {
                    add_field_error(errors, "application_deadline", "invalid", "Enter a valid date.")
                }
                Some(Ok(date)) => {
                    if let Err(message) = check_deadline(*date, today) {
                        add_field_error(errors, "application_deadline", "past_deadline", message);
                    }
                }
            }
        })?;

        match (category_id, job_type, salary, deadline) {
            (Some(Ok(category_id)), Ok(job_type), Ok(salary), Some(Ok(application_deadline))) => {
                Ok(NewJob {
                    title: self.title,
                    description: self.description,
                    category_id,
                    job_type,
                    location: self.location,
                    salary,
                    requirements: self.requirements,
                    skills_required: self.skills_required,
                    application_deadline,
                })
            }
            _ => Err(ValidationErrors::new()),
        }
    }
}

pub fn job_type_choices() -> Vec<Choice> {
    JobType::ALL
        .iter()
        .map(|t| Choice::new(t.as_str(), t.label()))
        .collect()
}

/// A listing as rendered on a page.
#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    #[serde(flatten)]
    pub listing: JobListing,
    pub job_type_label: &'static str,
    pub deadline_passed: bool,
}

impl JobResponse {
    pub fn from_listing(listing: JobListing, today: NaiveDate) -> Self {
        Self {
            job_type_label: listing.job.job_type.label(),
            deadline_passed: listing.job.is_deadline_passed(today),
            listing,
        }
    }

    pub fn many(listings: Vec<JobListing>, today: NaiveDate) -> Vec<Self> {
        listings
            .into_iter()
            .map(|listing| Self::from_listing(listing, today))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub jobs: Vec<JobResponse>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListPage {
    pub jobs: Vec<JobResponse>,
    pub categories: Vec<Category>,
    pub job_types: Vec<Choice>,
    pub filters: JobListQuery,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDetailPage {
    pub job: JobResponse,
    pub has_applied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostJobPage {
    pub categories: Vec<Category>,
    pub job_types: Vec<Choice>,
}
