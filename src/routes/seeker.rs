use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};

use crate::{
    dto::{
        application_dto::{ApplyForm, ApplyPage, SeekerDashboardPage},
        job_dto::JobResponse,
    },
    error::Result,
    middleware::{
        access::{require_role, Capability},
        auth::Actor,
    },
    routes::page::Page,
    services::application_service::ApplyOutcome,
    utils::{
        flash::{Flash, FlashRedirect, Flashes},
        time::today,
    },
    AppState,
};

const ALREADY_APPLIED: &str = "You have already applied for this job.";

fn already_applied(job_id: i64) -> FlashRedirect {
    FlashRedirect::new(Flash::warning(ALREADY_APPLIED), format!("/job/{}/", job_id))
}

#[utoipa::path(
    get,
    path = "/job/{id}/apply/",
    params(
        ("id" = i64, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Application form for an open job", body = ApplyPage),
        (status = 303, description = "Denied or already applied"),
        (status = 404, description = "Job missing or closed")
    )
)]
#[axum::debug_handler]
pub async fn apply_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    flashes: Flashes,
) -> Result<Response> {
    let seeker = require_role(&state, &actor, Capability::APPLY).await?;
    let listing = state.job_service.get_active_listing(id).await?;

    if state
        .application_service
        .has_applied(listing.job.id, seeker.user.id)
        .await?
    {
        return Ok(already_applied(id).into_response());
    }

    let page = ApplyPage {
        job: JobResponse::from_listing(listing, today()),
    };
    Ok(Page::new(flashes, page).into_response())
}

#[utoipa::path(
    post,
    path = "/job/{id}/apply/",
    params(
        ("id" = i64, Path, description = "Job ID")
    ),
    request_body(content = ApplyForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Submitted, already applied, or denied"),
        (status = 400, description = "Cover letter missing"),
        (status = 404, description = "Job missing or closed")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    Form(form): Form<ApplyForm>,
) -> Result<FlashRedirect> {
    let seeker = require_role(&state, &actor, Capability::APPLY).await?;
    let listing = state.job_service.get_active_listing(id).await?;
    let job_id = listing.job.id;

    if state
        .application_service
        .has_applied(job_id, seeker.user.id)
        .await?
    {
        return Ok(already_applied(job_id));
    }

    let cover_letter = form.into_cover_letter()?;
    match state
        .application_service
        .apply(job_id, seeker.user.id, &cover_letter)
        .await?
    {
        ApplyOutcome::Submitted(_) => Ok(FlashRedirect::new(
            Flash::success("Application submitted successfully!"),
            "/job-seeker/dashboard/",
        )),
        ApplyOutcome::AlreadyApplied => Ok(already_applied(job_id)),
    }
}

#[utoipa::path(
    get,
    path = "/job-seeker/dashboard/",
    responses(
        (status = 200, description = "Own applications and interviews", body = SeekerDashboardPage),
        (status = 303, description = "Denied")
    )
)]
#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    actor: Actor,
    flashes: Flashes,
) -> Result<Page<SeekerDashboardPage>> {
    let seeker = require_role(&state, &actor, Capability::JOB_SEEKER).await?;
    let applications = state
        .application_service
        .list_for_applicant(seeker.user.id)
        .await?;
    let interviews = state
        .interview_service
        .list_for_applicant(seeker.user.id)
        .await?;
    Ok(Page::new(
        flashes,
        SeekerDashboardPage {
            applications,
            interviews,
        },
    ))
}
