use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationStatus, EmployerApplication, SeekerApplication,
};

const APPLICATION_COLUMNS: &str = "id, job_id, applicant_id, applied_at, cover_letter, status";

const EMPLOYER_VIEW_SELECT: &str = "SELECT
        ja.id, ja.job_id, j.title AS job_title,
        ja.applicant_id, u.username AS applicant_username,
        u.first_name AS applicant_first_name, u.last_name AS applicant_last_name,
        u.email AS applicant_email, p.phone AS applicant_phone,
        (p.resume_path IS NOT NULL AND p.resume_path <> '') AS has_resume,
        ja.applied_at, ja.cover_letter, ja.status,
        i.id AS interview_id
    FROM job_applications ja
    JOIN jobs j ON j.id = ja.job_id
    JOIN users u ON u.id = ja.applicant_id
    LEFT JOIN profiles p ON p.user_id = ja.applicant_id
    LEFT JOIN interviews i ON i.application_id = ja.id";

#[derive(Debug)]
pub enum ApplyOutcome {
    Submitted(Application),
    AlreadyApplied,
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn has_applied(&self, job_id: i64, applicant_id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM job_applications WHERE job_id = $1 AND applicant_id = $2
            )",
        )
        .bind(job_id)
        .bind(applicant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Files an application against an active job.
    ///
    /// The unique `(job_id, applicant_id)` constraint decides duplicates; an
    /// existing row is only looked up once the insert was skipped.
    pub async fn apply(
        &self,
        job_id: i64,
        applicant_id: i64,
        cover_letter: &str,
    ) -> Result<ApplyOutcome> {
        let inserted = sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO job_applications (job_id, applicant_id, cover_letter)
             SELECT j.id, $2, $3 FROM jobs j WHERE j.id = $1 AND j.is_active
             ON CONFLICT (job_id, applicant_id) DO NOTHING
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(job_id)
        .bind(applicant_id)
        .bind(cover_letter)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(application) => {
                tracing::info!(
                    application_id = application.id,
                    job_id,
                    applicant_id,
                    "application submitted"
                );
                Ok(ApplyOutcome::Submitted(application))
            }
            None if self.has_applied(job_id, applicant_id).await? => {
                Ok(ApplyOutcome::AlreadyApplied)
            }
            None => Err(Error::NotFound("Job not found".into())),
        }
    }

    pub async fn list_for_applicant(&self, applicant_id: i64) -> Result<Vec<SeekerApplication>> {
        let applications = sqlx::query_as::<_, SeekerApplication>(
            "SELECT
                ja.id, ja.job_id, j.title AS job_title, j.location AS job_location,
                COALESCE(p.company_name, '') AS company_name,
                ja.applied_at, ja.status
             FROM job_applications ja
             JOIN jobs j ON j.id = ja.job_id
             LEFT JOIN profiles p ON p.user_id = j.employer_id
             WHERE ja.applicant_id = $1
             ORDER BY ja.applied_at DESC, ja.id DESC",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    pub async fn list_for_employer(&self, employer_id: i64) -> Result<Vec<EmployerApplication>> {
        let applications = sqlx::query_as::<_, EmployerApplication>(&format!(
            "{EMPLOYER_VIEW_SELECT}
             WHERE j.employer_id = $1
             ORDER BY ja.applied_at DESC, ja.id DESC"
        ))
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    /// The application, provided it targets one of the employer's jobs.
    pub async fn get_for_employer(
        &self,
        application_id: i64,
        employer_id: i64,
    ) -> Result<EmployerApplication> {
        sqlx::query_as::<_, EmployerApplication>(&format!(
            "{EMPLOYER_VIEW_SELECT} WHERE ja.id = $1 AND j.employer_id = $2"
        ))
        .bind(application_id)
        .bind(employer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    pub async fn update_status(
        &self,
        application_id: i64,
        employer_id: i64,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let current = self.get_for_employer(application_id, employer_id).await?;
        if !current.status.can_transition_to(status) {
            return Err(Error::BadRequest(format!(
                "Cannot move an application from {} to {}",
                current.status, status
            )));
        }

        let application = sqlx::query_as::<_, Application>(&format!(
            "UPDATE job_applications SET status = $2 WHERE id = $1
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(application_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            application_id,
            from = %current.status,
            to = %status,
            "application status changed"
        );
        Ok(application)
    }

    /// Stored resume path of the applicant, if the employer owns the application.
    pub async fn resume_for_employer(
        &self,
        application_id: i64,
        employer_id: i64,
    ) -> Result<Option<String>> {
        let row = sqlx::query_scalar::<_, Option<String>>(
            "SELECT NULLIF(p.resume_path, '')
             FROM job_applications ja
             JOIN jobs j ON j.id = ja.job_id
             LEFT JOIN profiles p ON p.user_id = ja.applicant_id
             WHERE ja.id = $1 AND j.employer_id = $2",
        )
        .bind(application_id)
        .bind(employer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| Error::NotFound("Application not found".into()))
    }
}
