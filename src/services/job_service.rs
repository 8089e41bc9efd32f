use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::job_dto::JobListQuery;
use crate::error::{Error, Result};
use crate::models::job::{Job, JobListing, JobType};
use crate::services::category_service::CategoryService;
use crate::utils::validation::field_error;

const JOB_COLUMNS: &str = "id, title, description, category_id, job_type, location, salary, employer_id, requirements, skills_required, posted_at, application_deadline, is_active";

const LISTING_SELECT: &str = "SELECT
        j.id, j.title, j.description, j.category_id, j.job_type, j.location, j.salary,
        j.employer_id, j.requirements, j.skills_required, j.posted_at,
        j.application_deadline, j.is_active,
        c.name AS category_name,
        u.username AS employer_username,
        COALESCE(p.company_name, '') AS company_name
    FROM jobs j
    JOIN job_categories c ON c.id = j.category_id
    JOIN users u ON u.id = j.employer_id
    LEFT JOIN profiles p ON p.user_id = j.employer_id";

const LISTING_ORDER: &str = " ORDER BY j.posted_at DESC, j.id DESC";

pub const HOME_PAGE_JOBS: i64 = 8;

pub const PAST_DEADLINE: &str = "Application deadline cannot be in the past.";

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub job_type: JobType,
    pub location: String,
    pub salary: Option<Decimal>,
    pub requirements: String,
    pub skills_required: String,
    pub application_deadline: NaiveDate,
}

/// Catalog filter with every supplied value resolved to its typed form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category_id: Option<i64>,
    pub job_type: Option<JobType>,
    pub search: Option<String>,
}

impl CatalogFilter {
    /// `None` when a supplied value names nothing, so the listing is empty.
    pub fn resolve(query: &JobListQuery) -> Option<Self> {
        let category_id = match query.category.as_deref() {
            Some(raw) => Some(raw.parse::<i64>().ok()?),
            None => None,
        };
        let job_type = match query.job_type.as_deref() {
            Some(raw) => Some(raw.parse::<JobType>().ok()?),
            None => None,
        };
        Some(Self {
            category_id,
            job_type,
            search: query.search.clone(),
        })
    }
}

/// Escapes LIKE metacharacters so the term matches literally as a substring.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            // backslash is Postgres' default LIKE escape character
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

pub fn catalog_query(filter: &CatalogFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(LISTING_SELECT);
    qb.push(" WHERE j.is_active");
    if let Some(category_id) = filter.category_id {
        qb.push(" AND j.category_id = ").push_bind(category_id);
    }
    if let Some(job_type) = filter.job_type {
        qb.push(" AND j.job_type = ").push_bind(job_type);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (j.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.skills_required ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    qb.push(LISTING_ORDER);
    qb
}

pub fn check_deadline(deadline: NaiveDate, today: NaiveDate) -> std::result::Result<(), &'static str> {
    if deadline < today {
        Err(PAST_DEADLINE)
    } else {
        Ok(())
    }
}

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
    categories: CategoryService,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        let categories = CategoryService::new(pool.clone());
        Self { pool, categories }
    }

    /// Persists a posting for `employer_id`; the posting always starts active.
    pub async fn create(&self, employer_id: i64, job: NewJob, today: NaiveDate) -> Result<Job> {
        if let Err(message) = check_deadline(job.application_deadline, today) {
            return Err(Error::Validation(field_error(
                "application_deadline",
                "past_deadline",
                message,
            )));
        }
        if !self.categories.exists(job.category_id).await? {
            return Err(Error::Validation(field_error(
                "category",
                "invalid_choice",
                "Select a valid choice. That choice is not one of the available choices.",
            )));
        }

        let created = sqlx::query_as::<_, Job>(&format!(
            "INSERT INTO jobs (
                title, description, category_id, job_type, location, salary,
                employer_id, requirements, skills_required, application_deadline, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
            RETURNING {JOB_COLUMNS}"
        ))
        .bind(&job.title)
        .bind(&job.description)
        .bind(job.category_id)
        .bind(job.job_type)
        .bind(&job.location)
        .bind(job.salary)
        .bind(employer_id)
        .bind(&job.requirements)
        .bind(&job.skills_required)
        .bind(job.application_deadline)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(job_id = created.id, employer_id, "job posted");
        Ok(created)
    }

    pub async fn list_active(&self, query: &JobListQuery) -> Result<Vec<JobListing>> {
        let Some(filter) = CatalogFilter::resolve(query) else {
            return Ok(Vec::new());
        };
        let jobs = catalog_query(&filter)
            .build_query_as::<JobListing>()
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    pub async fn recent_active(&self, limit: i64) -> Result<Vec<JobListing>> {
        let jobs = sqlx::query_as::<_, JobListing>(&format!(
            "{LISTING_SELECT} WHERE j.is_active{LISTING_ORDER} LIMIT $1"
        ))
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn get_active_listing(&self, id: i64) -> Result<JobListing> {
        sqlx::query_as::<_, JobListing>(&format!(
            "{LISTING_SELECT} WHERE j.id = $1 AND j.is_active"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    /// Every posting of the employer, open or closed.
    pub async fn list_for_employer(&self, employer_id: i64) -> Result<Vec<JobListing>> {
        let jobs = sqlx::query_as::<_, JobListing>(&format!(
            "{LISTING_SELECT} WHERE j.employer_id = $1{LISTING_ORDER}"
        ))
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn close(&self, id: i64, employer_id: i64) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs SET is_active = FALSE
             WHERE id = $1 AND employer_id = $2
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(employer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;

        tracing::info!(job_id = id, employer_id, "job closed");
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: Option<&str>, job_type: Option<&str>, search: Option<&str>) -> JobListQuery {
        JobListQuery {
            category: category.map(str::to_string),
            job_type: job_type.map(str::to_string),
            search: search.map(str::to_string),
        }
    }

    #[test]
    fn absent_filters_only_restrict_to_active_jobs() {
        let filter = CatalogFilter::resolve(&query(None, None, None)).unwrap();
        assert_eq!(filter, CatalogFilter::default());
        let qb = catalog_query(&filter);
        let sql = qb.sql();
        assert!(sql.contains("WHERE j.is_active ORDER BY j.posted_at DESC"));
        assert!(!sql.contains("$1"));
    }

    #[test]
    fn filters_are_and_combined_and_search_is_or_across_fields() {
        let filter =
            CatalogFilter::resolve(&query(Some("3"), Some("remote"), Some("rust"))).unwrap();
        assert_eq!(filter.category_id, Some(3));
        assert_eq!(filter.job_type, Some(JobType::Remote));
        let qb = catalog_query(&filter);
        let sql = qb.sql();
        assert!(sql.contains("AND j.category_id = $1"));
        assert!(sql.contains("AND j.job_type = $2"));
        assert!(sql.contains(
            "AND (j.title ILIKE $3 OR j.description ILIKE $4 OR j.skills_required ILIKE $5)"
        ));
    }

    #[test]
    fn values_that_name_nothing_match_nothing() {
        assert!(CatalogFilter::resolve(&query(Some("abc"), None, None)).is_none());
        assert!(CatalogFilter::resolve(&query(None, Some("freelance"), None)).is_none());
    }

    #[test]
    fn like_metacharacters_are_literal() {
        assert_eq!(like_pattern("backend"), "%backend%");
        assert_eq!(like_pattern("100%_c\\"), "%100\\%\\_c\\\\%");
    }

    #[test]
    fn deadline_today_is_accepted_yesterday_is_not() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(check_deadline(today, today).is_ok());
        assert!(check_deadline(today.succ_opt().unwrap(), today).is_ok());
        assert_eq!(
            check_deadline(today.pred_opt().unwrap(), today),
            Err(PAST_DEADLINE)
        );
    }
}
