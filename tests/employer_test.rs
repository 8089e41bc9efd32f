mod common;

use axum::http::{
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    StatusCode,
};
use chrono::Duration;
use sqlx::PgPool;

use common::{
    application_id, assert_redirect, body_bytes, body_json, category_id, db_app, flash, get,
    multipart_body, post_form, post_job, post_multipart, register, send, unique, JobInput,
};
use jobboard_backend::utils::{flash::Level, time::today};

const RESUME: &[u8] = b"%PDF-1.4\n% resume of a careful engineer\n%%EOF\n";
const PICTURE: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

struct Posting {
    app: axum::Router,
    pool: PgPool,
    employer: String,
    seeker: String,
    job_id: i64,
    application: i64,
}

/// An employer with one job and one seeker who applied to it.
async fn posting_with_application(seeker_resume: bool) -> Option<Posting> {
    let (app, pool) = db_app().await?;
    let employer = register(&app, &unique("wayne"), "employer").await;
    let seeker = register(&app, &unique("frank"), "job_seeker").await;

    if seeker_resume {
        let body = multipart_body(
            &[("phone", "555-0199"), ("address", "2 Elm St")],
            &[("resume", "frank-cv.pdf", RESUME)],
        );
        let res = send(&app, post_multipart("/profile/", body, &seeker)).await;
        assert_redirect(&res, "/profile/");
        assert_eq!(
            flash(&res).unwrap().message,
            "Profile updated successfully!"
        );
    }

    let title = unique("Platform Engineer");
    let job_id = post_job(
        &app,
        &pool,
        &employer,
        JobInput {
            title: &title,
            category_id: category_id(&pool, "Engineering").await,
            job_type: "full_time",
            skills: "rust",
            deadline: today() + Duration::days(14),
        },
    )
    .await;
    let res = send(
        &app,
        post_form(
            &format!("/job/{job_id}/apply/"),
            "cover_letter=Ready+to+start.",
            Some(&seeker),
        ),
    )
    .await;
    assert_redirect(&res, "/job-seeker/dashboard/");
    let application = application_id(&pool, job_id).await;

    Some(Posting {
        app,
        pool,
        employer,
        seeker,
        job_id,
        application,
    })
}

async fn status_of(pool: &PgPool, application: i64) -> String {
    sqlx::query_scalar("SELECT status::text FROM job_applications WHERE id = $1")
        .bind(application)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn seekers_are_denied_employer_operations() {
    let Some(p) = posting_with_application(false).await else {
        return;
    };

    let res = send(&p.app, get("/employer/dashboard/", Some(&p.seeker))).await;
    assert_redirect(&res, "/");
    let message = flash(&res).unwrap();
    assert_eq!(message.level, Level::Error);
    assert_eq!(message.message, "Access denied.");

    let res = send(
        &p.app,
        post_form("/employer/post-job/", "title=Sneaky", Some(&p.seeker)),
    )
    .await;
    assert_redirect(&res, "/");
    assert_eq!(flash(&res).unwrap().message, "Only employers can post jobs.");
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE title = 'Sneaky'")
        .fetch_one(&p.pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);

    let res = send(
        &p.app,
        post_form(
            &format!("/employer/application/{}/update-status/", p.application),
            "status=hired",
            Some(&p.seeker),
        ),
    )
    .await;
    assert_redirect(&res, "/");
    assert_eq!(flash(&res).unwrap().message, "Access denied.");
    assert_eq!(status_of(&p.pool, p.application).await, "applied");

    let res = send(
        &p.app,
        post_form(&format!("/employer/job/{}/close/", p.job_id), "", Some(&p.seeker)),
    )
    .await;
    assert_redirect(&res, "/");
    let active: bool = sqlx::query_scalar("SELECT is_active FROM jobs WHERE id = $1")
        .bind(p.job_id)
        .fetch_one(&p.pool)
        .await
        .unwrap();
    assert!(active);

    let res = send(
        &p.app,
        get(&format!("/job/{}/apply/", p.job_id), Some(&p.employer)),
    )
    .await;
    assert_redirect(&res, "/");
    assert_eq!(
        flash(&res).unwrap().message,
        "Only job seekers can apply for jobs."
    );

    let res = send(&p.app, get("/job-seeker/dashboard/", Some(&p.employer))).await;
    assert_redirect(&res, "/");
}

#[tokio::test]
async fn status_updates_accept_known_values_only() {
    let Some(p) = posting_with_application(false).await else {
        return;
    };
    let uri = format!("/employer/application/{}/update-status/", p.application);

    let res = send(&p.app, post_form(&uri, "status=shortlisted", Some(&p.employer))).await;
    assert_redirect(&res, "/employer/dashboard/");
    let message = flash(&res).unwrap();
    assert_eq!(message.level, Level::Success);
    assert_eq!(message.message, "Application status updated to shortlisted.");
    assert_eq!(status_of(&p.pool, p.application).await, "shortlisted");

    let res = send(&p.app, post_form(&uri, "status=promoted", Some(&p.employer))).await;
    assert_redirect(&res, "/employer/dashboard/");
    let message = flash(&res).unwrap();
    assert_eq!(message.level, Level::Error);
    assert_eq!(message.message, "Invalid status: promoted.");
    assert_eq!(status_of(&p.pool, p.application).await, "shortlisted");

    let res = send(&p.app, post_form(&uri, "status=applied", Some(&p.employer))).await;
    assert_redirect(&res, "/employer/dashboard/");
    assert_eq!(status_of(&p.pool, p.application).await, "applied");
}

#[tokio::test]
async fn other_employers_cannot_touch_foreign_applications() {
    let Some(p) = posting_with_application(true).await else {
        return;
    };
    let rival = register(&p.app, &unique("lexcorp"), "employer").await;

    let res = send(
        &p.app,
        post_form(
            &format!("/employer/application/{}/update-status/", p.application),
            "status=rejected",
            Some(&rival),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(status_of(&p.pool, p.application).await, "applied");

    let res = send(
        &p.app,
        post_form(&format!("/employer/job/{}/close/", p.job_id), "", Some(&rival)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    for action in ["view-resume", "download-resume", "schedule-interview"] {
        let res = send(
            &p.app,
            get(
                &format!("/employer/application/{}/{action}/", p.application),
                Some(&rival),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{action}");
    }

    let res = send(&p.app, get("/employer/dashboard/", Some(&rival))).await;
    let body = body_json(res).await;
    assert!(body["page"]["applications"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_resume_sends_employer_back_to_dashboard() {
    let Some(p) = posting_with_application(false).await else {
        return;
    };
    for action in ["view-resume", "download-resume"] {
        let res = send(
            &p.app,
            get(
                &format!("/employer/application/{}/{action}/", p.application),
                Some(&p.employer),
            ),
        )
        .await;
        assert_redirect(&res, "/employer/dashboard/");
        let message = flash(&res).unwrap();
        assert_eq!(message.level, Level::Error);
        assert_eq!(message.message, "No resume available for this applicant.");
    }
}

#[tokio::test]
async fn unreadable_resume_flashes_per_action() {
    let Some(p) = posting_with_application(true).await else {
        return;
    };
    sqlx::query(
        "UPDATE profiles SET resume_path = 'resumes/vanished.pdf'
         WHERE user_id = (SELECT applicant_id FROM job_applications WHERE id = $1)",
    )
    .bind(p.application)
    .execute(&p.pool)
    .await
    .unwrap();

    for (action, prefix) in [
        ("view-resume", "Error opening resume: "),
        ("download-resume", "Error downloading resume: "),
    ] {
        let res = send(
            &p.app,
            get(
                &format!("/employer/application/{}/{action}/", p.application),
                Some(&p.employer),
            ),
        )
        .await;
        assert_redirect(&res, "/employer/dashboard/");
        let message = flash(&res).unwrap();
        assert_eq!(message.level, Level::Error);
        assert!(message.message.starts_with(prefix), "{}", message.message);
    }
}

#[tokio::test]
async fn uploaded_resume_is_served_inline_and_as_attachment() {
    let Some(p) = posting_with_application(true).await else {
        return;
    };

    let res = send(&p.app, get("/employer/dashboard/", Some(&p.employer))).await;
    let body = body_json(res).await;
    assert_eq!(body["page"]["applications"][0]["has_resume"], true);

    for (action, disposition) in [("view-resume", "inline"), ("download-resume", "attachment")] {
        let res = send(
            &p.app,
            get(
                &format!("/employer/application/{}/{action}/", p.application),
                Some(&p.employer),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK, "{action}");
        assert_eq!(res.headers()[CONTENT_TYPE], "application/pdf");
        let header = res.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(
            header.starts_with(&format!("{disposition}; filename=\"")),
            "{header}"
        );
        assert!(header.ends_with(".pdf\""), "{header}");
        assert_eq!(body_bytes(res).await, RESUME);
    }
}

#[tokio::test]
async fn profile_uploads_are_checked_and_pictures_served() {
    let Some((app, _pool)) = db_app().await else {
        return;
    };
    let employer = register(&app, &unique("stark"), "employer").await;

    let body = multipart_body(&[], &[("resume", "cv.pdf", RESUME)]);
    let res = send(&app, post_multipart("/profile/", body, &employer)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors = body_json(res).await;
    assert!(errors["fields"]["resume"].is_array());

    let body = multipart_body(&[], &[("profile_picture", "me.png", RESUME)]);
    let res = send(&app, post_multipart("/profile/", body, &employer)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = multipart_body(
        &[("company_name", "Stark Industries")],
        &[("profile_picture", "me.png", PICTURE)],
    );
    let res = send(&app, post_multipart("/profile/", body, &employer)).await;
    assert_redirect(&res, "/profile/");

    let res = send(&app, get("/profile/", Some(&employer))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["page"]["profile"]["company_name"], "Stark Industries");
    let url = body["page"]["profile_picture_url"]
        .as_str()
        .expect("picture url")
        .to_string();
    assert!(url.starts_with("/media/profile_pics/"), "{url}");
    assert!(url.ends_with(".png"), "{url}");

    let res = send(&app, get(&url, None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_bytes(res).await, PICTURE);
}
