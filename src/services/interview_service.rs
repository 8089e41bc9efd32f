use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::application::ApplicationStatus;
use crate::models::interview::{Interview, InterviewVenue, InterviewWithJob};

const INTERVIEW_COLUMNS: &str = "id, application_id, scheduled_at, duration_minutes, interview_type, location_or_link, notes, created_at";

#[derive(Debug, Clone)]
pub struct NewInterview {
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub venue: InterviewVenue,
    pub notes: String,
}

#[derive(Debug)]
pub enum ScheduleOutcome {
    Scheduled(Interview),
    AlreadyScheduled,
}

#[derive(Clone)]
pub struct InterviewService {
    pool: PgPool,
}

impl InterviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Books the single interview of an application and moves it to
    /// `interview_scheduled`, both or neither.
    pub async fn schedule(
        &self,
        application_id: i64,
        employer_id: i64,
        interview: NewInterview,
    ) -> Result<ScheduleOutcome> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT ja.id
             FROM job_applications ja
             JOIN jobs j ON j.id = ja.job_id
             WHERE ja.id = $1 AND j.employer_id = $2
             FOR UPDATE OF ja",
        )
        .bind(application_id)
        .bind(employer_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Err(Error::NotFound("Application not found".into()));
        }

        let created = sqlx::query_as::<_, Interview>(&format!(
            "INSERT INTO interviews (
                application_id, scheduled_at, duration_minutes, interview_type,
                location_or_link, notes
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (application_id) DO NOTHING
            RETURNING {INTERVIEW_COLUMNS}"
        ))
        .bind(application_id)
        .bind(interview.scheduled_at)
        .bind(interview.duration_minutes)
        .bind(interview.venue.medium())
        .bind(interview.venue.location_or_link())
        .bind(&interview.notes)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(created) = created else {
            tx.rollback().await?;
            return Ok(ScheduleOutcome::AlreadyScheduled);
        };

        sqlx::query("UPDATE job_applications SET status = $2 WHERE id = $1")
            .bind(application_id)
            .bind(ApplicationStatus::InterviewScheduled)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(
            interview_id = created.id,
            application_id,
            medium = %created.interview_type,
            "interview scheduled"
        );
        Ok(ScheduleOutcome::Scheduled(created))
    }

    pub async fn list_for_applicant(&self, applicant_id: i64) -> Result<Vec<InterviewWithJob>> {
        let interviews = sqlx::query_as::<_, InterviewWithJob>(
            "SELECT
                i.id, i.application_id, i.scheduled_at, i.duration_minutes, i.interview_type,
                i.location_or_link, i.notes, i.created_at,
                j.id AS job_id, j.title AS job_title
             FROM interviews i
             JOIN job_applications ja ON ja.id = i.application_id
             JOIN jobs j ON j.id = ja.job_id
             WHERE ja.applicant_id = $1
             ORDER BY i.scheduled_at, i.id",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }
}
