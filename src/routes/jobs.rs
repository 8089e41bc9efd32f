use axum::extract::{Path, Query, State};

use crate::{
    dto::job_dto::{
        job_type_choices, HomePage, JobDetailPage, JobListPage, JobListQuery, JobResponse,
    },
    error::Result,
    middleware::auth::Actor,
    routes::page::Page,
    services::job_service::HOME_PAGE_JOBS,
    utils::{flash::Flashes, time::today},
    AppState,
};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Most recent open jobs and all categories", body = HomePage)
    )
)]
#[axum::debug_handler]
pub async fn home(State(state): State<AppState>, flashes: Flashes) -> Result<Page<HomePage>> {
    let jobs = state.job_service.recent_active(HOME_PAGE_JOBS).await?;
    let categories = state.category_service.list().await?;
    Ok(Page::new(
        flashes,
        HomePage {
            jobs: JobResponse::many(jobs, today()),
            categories,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/jobs/",
    params(
        ("category" = Option<String>, Query, description = "Category id"),
        ("job_type" = Option<String>, Query, description = "Job type value"),
        ("search" = Option<String>, Query, description = "Text searched in title, description and skills")
    ),
    responses(
        (status = 200, description = "Filtered catalog of open jobs", body = JobListPage)
    )
)]
#[axum::debug_handler]
pub async fn job_list(
    State(state): State<AppState>,
    flashes: Flashes,
    Query(filters): Query<JobListQuery>,
) -> Result<Page<JobListPage>> {
    let jobs = state.job_service.list_active(&filters).await?;
    let categories = state.category_service.list().await?;
    Ok(Page::new(
        flashes,
        JobListPage {
            jobs: JobResponse::many(jobs, today()),
            categories,
            job_types: job_type_choices(),
            filters,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/job/{id}/",
    params(
        ("id" = i64, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job detail", body = JobDetailPage),
        (status = 404, description = "Job missing or closed")
    )
)]
#[axum::debug_handler]
pub async fn job_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    flashes: Flashes,
) -> Result<Page<JobDetailPage>> {
    let listing = state.job_service.get_active_listing(id).await?;

    let mut has_applied = false;
    if let Some(session) = &actor.user {
        let is_seeker = state
            .account_service
            .find_profile(session.id)
            .await?
            .is_some_and(|p| p.is_job_seeker());
        if is_seeker {
            has_applied = state
                .application_service
                .has_applied(listing.job.id, session.id)
                .await?;
        }
    }

    Ok(Page::new(
        flashes,
        JobDetailPage {
            job: JobResponse::from_listing(listing, today()),
            has_applied,
        },
    ))
}
