use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Form,
};
use tokio_util::io::ReaderStream;

use crate::{
    dto::{
        application_dto::{status_choices, EmployerDashboardPage, StatusForm},
        interview_dto::{interview_type_choices, InterviewForm, ScheduleInterviewPage},
        job_dto::{job_type_choices, JobForm, JobResponse, PostJobPage},
    },
    error::Result,
    middleware::{
        access::{require_role, Capability},
        auth::Actor,
    },
    models::application::ApplicationStatus,
    routes::page::Page,
    services::{interview_service::ScheduleOutcome, media_service::file_name},
    utils::{
        flash::{Flash, FlashRedirect, Flashes},
        time::today,
    },
    AppState,
};

const DASHBOARD: &str = "/employer/dashboard/";
const INTERVIEW_EXISTS: &str = "An interview is already scheduled for this application.";

#[utoipa::path(
    get,
    path = "/employer/dashboard/",
    responses(
        (status = 200, description = "Own jobs and every application to them", body = EmployerDashboardPage),
        (status = 303, description = "Denied")
    )
)]
#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    actor: Actor,
    flashes: Flashes,
) -> Result<Page<EmployerDashboardPage>> {
    let employer = require_role(&state, &actor, Capability::EMPLOYER).await?;
    let jobs = state.job_service.list_for_employer(employer.user.id).await?;
    let applications = state
        .application_service
        .list_for_employer(employer.user.id)
        .await?;
    Ok(Page::new(
        flashes,
        EmployerDashboardPage {
            jobs: JobResponse::many(jobs, today()),
            applications,
            statuses: status_choices(),
        },
    ))
}

#[utoipa::path(
    get,
    path = "/employer/post-job/",
    responses(
        (status = 200, description = "Job form choices", body = PostJobPage),
        (status = 303, description = "Denied")
    )
)]
#[axum::debug_handler]
pub async fn post_job_page(
    State(state): State<AppState>,
    actor: Actor,
    flashes: Flashes,
) -> Result<Page<PostJobPage>> {
    require_role(&state, &actor, Capability::POST_JOB).await?;
    let categories = state.category_service.list().await?;
    Ok(Page::new(
        flashes,
        PostJobPage {
            categories,
            job_types: job_type_choices(),
        },
    ))
}

#[utoipa::path(
    post,
    path = "/employer/post-job/",
    request_body(content = JobForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Job posted, or denied"),
        (status = 400, description = "Field errors")
    )
)]
#[axum::debug_handler]
pub async fn post_job(
    State(state): State<AppState>,
    actor: Actor,
    Form(form): Form<JobForm>,
) -> Result<FlashRedirect> {
    let employer = require_role(&state, &actor, Capability::POST_JOB).await?;
    let today = today();
    let job = form.into_new_job(today)?;
    state
        .job_service
        .create(employer.user.id, job, today)
        .await?;
    Ok(FlashRedirect::new(
        Flash::success("Job posted successfully!"),
        DASHBOARD,
    ))
}

#[utoipa::path(
    post,
    path = "/employer/job/{id}/close/",
    params(
        ("id" = i64, Path, description = "Job ID")
    ),
    responses(
        (status = 303, description = "Job closed, or denied"),
        (status = 404, description = "Not one of the employer's jobs")
    )
)]
#[axum::debug_handler]
pub async fn close_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
) -> Result<FlashRedirect> {
    let employer = require_role(&state, &actor, Capability::EMPLOYER).await?;
    state.job_service.close(id, employer.user.id).await?;
    Ok(FlashRedirect::new(Flash::success("Job closed."), DASHBOARD))
}

#[utoipa::path(
    post,
    path = "/employer/application/{id}/update-status/",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    request_body(content = StatusForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Status changed, refused, or denied"),
        (status = 404, description = "Not an application to the employer's jobs")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    Form(form): Form<StatusForm>,
) -> Result<FlashRedirect> {
    let employer = require_role(&state, &actor, Capability::EMPLOYER).await?;
    state
        .application_service
        .get_for_employer(id, employer.user.id)
        .await?;

    let Ok(status) = form.status.trim().parse::<ApplicationStatus>() else {
        return Ok(FlashRedirect::new(
            Flash::error(format!("Invalid status: {}.", form.status)),
            DASHBOARD,
        ));
    };
    state
        .application_service
        .update_status(id, employer.user.id, status)
        .await?;
    Ok(FlashRedirect::new(
        Flash::success(format!("Application status updated to {}.", status)),
        DASHBOARD,
    ))
}

fn interview_exists() -> FlashRedirect {
    FlashRedirect::new(Flash::warning(INTERVIEW_EXISTS), DASHBOARD)
}

#[utoipa::path(
    get,
    path = "/employer/application/{id}/schedule-interview/",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Interview form for the application", body = ScheduleInterviewPage),
        (status = 303, description = "Denied or already scheduled"),
        (status = 404, description = "Not an application to the employer's jobs")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    flashes: Flashes,
) -> Result<Response> {
    let employer = require_role(&state, &actor, Capability::EMPLOYER).await?;
    let application = state
        .application_service
        .get_for_employer(id, employer.user.id)
        .await?;
    if application.interview_id.is_some() {
        return Ok(interview_exists().into_response());
    }
    let page = ScheduleInterviewPage {
        application,
        interview_types: interview_type_choices(),
    };
    Ok(Page::new(flashes, page).into_response())
}

#[utoipa::path(
    post,
    path = "/employer/application/{id}/schedule-interview/",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    request_body(content = InterviewForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Scheduled, already scheduled, or denied"),
        (status = 400, description = "Field errors"),
        (status = 404, description = "Not an application to the employer's jobs")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    Form(form): Form<InterviewForm>,
) -> Result<FlashRedirect> {
    let employer = require_role(&state, &actor, Capability::EMPLOYER).await?;
    let application = state
        .application_service
        .get_for_employer(id, employer.user.id)
        .await?;
    if application.interview_id.is_some() {
        return Ok(interview_exists());
    }

    let interview = form.into_new_interview()?;
    match state
        .interview_service
        .schedule(id, employer.user.id, interview)
        .await?
    {
        ScheduleOutcome::Scheduled(_) => Ok(FlashRedirect::new(
            Flash::success("Interview scheduled successfully!"),
            DASHBOARD,
        )),
        ScheduleOutcome::AlreadyScheduled => Ok(interview_exists()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }

    /// Flash text when the stored file cannot be read.
    pub fn failure_message(&self, err: &impl std::fmt::Display) -> String {
        let action = match self {
            Disposition::Inline => "opening",
            Disposition::Attachment => "downloading",
        };
        format!("Error {} resume: {}", action, err)
    }

    /// `Content-Disposition` value for a stored file; quotes and control characters are dropped.
    pub fn header_value(&self, stored_name: &str) -> HeaderValue {
        let cleaned: String = stored_name
            .chars()
            .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
            .collect();
        HeaderValue::from_str(&format!("{}; filename=\"{}\"", self.as_str(), cleaned))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
    }
}

async fn serve_resume(
    state: &AppState,
    actor: &Actor,
    application_id: i64,
    disposition: Disposition,
) -> Result<Response> {
    let employer = require_role(state, actor, Capability::EMPLOYER).await?;
    let Some(path) = state
        .application_service
        .resume_for_employer(application_id, employer.user.id)
        .await?
    else {
        return Ok(FlashRedirect::new(
            Flash::error("No resume available for this applicant."),
            DASHBOARD,
        )
        .into_response());
    };

    let file = match state.media_service.open(&path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(application_id, path = %path, error = %err, "resume could not be opened");
            return Ok(FlashRedirect::new(
                Flash::error(disposition.failure_message(&err)),
                DASHBOARD,
            )
            .into_response());
        }
    };

    let body = Body::from_stream(ReaderStream::new(file));
    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(
        CONTENT_DISPOSITION,
        disposition.header_value(file_name(&path)),
    );
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/employer/application/{id}/view-resume/",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Resume shown inline"),
        (status = 303, description = "Denied, no resume, or unreadable file"),
        (status = 404, description = "Not an application to the employer's jobs")
    )
)]
#[axum::debug_handler]
pub async fn view_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
) -> Result<Response> {
    serve_resume(&state, &actor, id, Disposition::Inline).await
}

#[utoipa::path(
    get,
    path = "/employer/application/{id}/download-resume/",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Resume as an attachment"),
        (status = 303, description = "Denied, no resume, or unreadable file"),
        (status = 404, description = "Not an application to the employer's jobs")
    )
)]
#[axum::debug_handler]
pub async fn download_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
) -> Result<Response> {
    serve_resume(&state, &actor, id, Disposition::Attachment).await
}
