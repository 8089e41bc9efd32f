use axum::{
    extract::{Multipart, Query, State},
    Form,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    config::get_config,
    dto::account_dto::{
        LoginForm, LoginPage, LoginQuery, ProfilePage, ProfileSubmission, RegisterForm,
        RegisterPage, Upload,
    },
    error::Result,
    middleware::{
        access::require_login,
        auth::{session_cookie, session_removal_cookie, Actor},
    },
    models::user::User,
    routes::page::Page,
    services::{account_service::ProfileUpdate, media_service::MediaKind},
    utils::{
        flash::{Flash, FlashRedirect, Flashes},
        form::safe_next,
        token::issue_session_token,
    },
    AppState,
};

fn start_session(jar: CookieJar, user: &User) -> Result<CookieJar> {
    let config = get_config();
    let token = issue_session_token(
        user.id,
        &user.username,
        &config.jwt_secret,
        config.session_ttl_hours,
    )?;
    Ok(jar.add(session_cookie(token)))
}

#[utoipa::path(
    get,
    path = "/register/",
    responses(
        (status = 200, description = "Registration form choices", body = RegisterPage)
    )
)]
#[axum::debug_handler]
pub async fn register_page(flashes: Flashes) -> Page<RegisterPage> {
    Page::new(flashes, RegisterPage::new())
}

#[utoipa::path(
    post,
    path = "/register/",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Registered and logged in"),
        (status = 400, description = "Field errors")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, FlashRedirect)> {
    let account = form.into_account()?;
    let (user, _profile) = state.account_service.register(account).await?;
    let jar = start_session(jar, &user)?;
    Ok((
        jar,
        FlashRedirect::new(Flash::success("Registration successful!"), "/"),
    ))
}

#[utoipa::path(
    get,
    path = "/login/",
    responses(
        (status = 200, description = "Login form", body = LoginPage)
    )
)]
#[axum::debug_handler]
pub async fn login_page(flashes: Flashes, Query(query): Query<LoginQuery>) -> Page<LoginPage> {
    Page::new(
        flashes,
        LoginPage {
            next: safe_next(query.next.as_deref()),
        },
    )
}

#[utoipa::path(
    post,
    path = "/login/",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in"),
        (status = 401, description = "Wrong credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, FlashRedirect)> {
    let user = state
        .account_service
        .authenticate(form.username.trim(), &form.password)
        .await?;
    let jar = start_session(jar, &user)?;
    tracing::info!(user_id = user.id, "user logged in");

    let location = safe_next(form.next.as_deref()).unwrap_or_else(|| "/".to_string());
    Ok((jar, FlashRedirect::to(location)))
}

#[utoipa::path(
    post,
    path = "/logout/",
    responses(
        (status = 303, description = "Session cleared")
    )
)]
#[axum::debug_handler]
pub async fn logout(jar: CookieJar) -> (CookieJar, FlashRedirect) {
    (
        jar.remove(session_removal_cookie()),
        FlashRedirect::new(
            Flash::success("You have been successfully logged out."),
            "/",
        ),
    )
}

#[utoipa::path(
    get,
    path = "/profile/",
    responses(
        (status = 200, description = "Own profile", body = ProfilePage),
        (status = 303, description = "Not logged in"),
        (status = 404, description = "Profile missing")
    )
)]
#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    actor: Actor,
    flashes: Flashes,
) -> Result<Page<ProfilePage>> {
    let user = require_login(&state, &actor).await?;
    let profile = state.account_service.get_profile(user.id).await?;
    Ok(Page::new(flashes, ProfilePage::new(user, profile)))
}

async fn read_profile_form(mut multipart: Multipart) -> Result<ProfileSubmission> {
    let mut submission = ProfileSubmission::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "phone" => submission.phone = Some(field.text().await?.trim().to_string()),
            "address" => submission.address = Some(field.text().await?.trim().to_string()),
            "company_name" => {
                submission.company_name = Some(field.text().await?.trim().to_string())
            }
            "resume" | "profile_picture" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await?;
                // browsers send an empty part when no file was chosen
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                let upload = Some(Upload { file_name, data });
                if name == "resume" {
                    submission.resume = upload;
                } else {
                    submission.profile_picture = upload;
                }
            }
            _ => {}
        }
    }
    Ok(submission)
}

#[utoipa::path(
    post,
    path = "/profile/",
    responses(
        (status = 303, description = "Profile updated from multipart form data"),
        (status = 400, description = "Field errors or rejected upload")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    actor: Actor,
    multipart: Multipart,
) -> Result<FlashRedirect> {
    let user = require_login(&state, &actor).await?;
    let current = state.account_service.get_profile(user.id).await?;

    let submission = read_profile_form(multipart).await?;
    submission.check(current.role)?;

    let media = &state.media_service;
    let mut uploads = Vec::new();
    if let Some(resume) = &submission.resume {
        uploads.push((MediaKind::Resume, resume.file_name.as_str(), &resume.data[..]));
    }
    if let Some(picture) = &submission.profile_picture {
        uploads.push((
            MediaKind::ProfilePicture,
            picture.file_name.as_str(),
            &picture.data[..],
        ));
    }
    let saved = media.save_all(&uploads).await?;

    let mut update = ProfileUpdate {
        phone: submission.phone,
        address: submission.address,
        company_name: submission.company_name,
        ..Default::default()
    };
    for ((kind, _, _), relative) in uploads.iter().zip(&saved) {
        match kind {
            MediaKind::Resume => update.resume_path = Some(relative.clone()),
            MediaKind::ProfilePicture => update.profile_picture_path = Some(relative.clone()),
        }
    }

    let replaced_resume = update.resume_path.is_some().then_some(current.resume_path).flatten();
    let replaced_picture = update
        .profile_picture_path
        .is_some()
        .then_some(current.profile_picture_path)
        .flatten();

    if let Err(err) = state.account_service.update_profile(user.id, update).await {
        media.discard(&saved).await;
        return Err(err);
    }

    for old in replaced_resume.iter().chain(replaced_picture.iter()) {
        if !old.is_empty() {
            media.remove(old).await;
        }
    }

    Ok(FlashRedirect::new(
        Flash::success("Profile updated successfully!"),
        "/profile/",
    ))
}
