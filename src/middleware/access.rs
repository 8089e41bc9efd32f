//! Role guard shared by every privileged handler.
//!
//! A request passes when the actor is logged in, has a profile, and the
//! profile's role is the one the operation needs. Each failure ends in a
//! redirect before anything is written.

use crate::error::{Error, Result};
use crate::middleware::auth::Actor;
use crate::models::profile::{Profile, Role};
use crate::models::user::User;
use crate::utils::flash::{Flash, FlashRedirect};
use crate::AppState;

pub const ACCESS_DENIED: &str = "Access denied.";
pub const PROFILE_INCOMPLETE: &str = "Please complete your profile first.";

/// An operation's required role and the message shown to everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub role: Role,
    pub denial: &'static str,
}

impl Capability {
    pub const POST_JOB: Capability = Capability {
        role: Role::Employer,
        denial: "Only employers can post jobs.",
    };
    pub const APPLY: Capability = Capability {
        role: Role::JobSeeker,
        denial: "Only job seekers can apply for jobs.",
    };
    pub const EMPLOYER: Capability = Capability {
        role: Role::Employer,
        denial: ACCESS_DENIED,
    };
    pub const JOB_SEEKER: Capability = Capability {
        role: Role::JobSeeker,
        denial: ACCESS_DENIED,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Anonymous,
    MissingProfile,
    WrongRole(&'static str),
}

impl Denial {
    /// Where the denied actor is sent; `path` is what they asked for.
    pub fn redirect(&self, path: &str) -> FlashRedirect {
        match self {
            Denial::Anonymous => FlashRedirect::to(login_url(path)),
            Denial::MissingProfile => FlashRedirect::new(Flash::error(PROFILE_INCOMPLETE), "/profile/"),
            Denial::WrongRole(message) => FlashRedirect::new(Flash::error(*message), "/"),
        }
    }
}

pub fn login_url(next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("/login/?{}", query)
}

pub fn check_capability<'a>(
    actor: &Actor,
    profile: Option<&'a Profile>,
    capability: Capability,
) -> std::result::Result<&'a Profile, Denial> {
    if !actor.is_authenticated() {
        return Err(Denial::Anonymous);
    }
    let profile = profile.ok_or(Denial::MissingProfile)?;
    if profile.role != capability.role {
        return Err(Denial::WrongRole(capability.denial));
    }
    Ok(profile)
}

/// The logged-in user and profile a guarded handler acts for.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub user: User,
    pub profile: Profile,
}

/// Resolves the actor's user; anonymous or deactivated actors go to the login page.
pub async fn require_login(state: &AppState, actor: &Actor) -> Result<User> {
    let Some(session) = &actor.user else {
        return Err(Denial::Anonymous.redirect(&actor.path).into());
    };
    match state.account_service.find_active_user(session.id).await? {
        Some(user) => Ok(user),
        None => {
            tracing::warn!(user_id = session.id, "session for unknown or inactive user");
            Err(Denial::Anonymous.redirect(&actor.path).into())
        }
    }
}

pub async fn require_role(
    state: &AppState,
    actor: &Actor,
    capability: Capability,
) -> Result<Authorized> {
    let user = require_login(state, actor).await?;
    let profile = state.account_service.find_profile(user.id).await?;

    let profile = match check_capability(actor, profile.as_ref(), capability) {
        Ok(granted) => granted.clone(),
        Err(denial) => {
            tracing::warn!(
                user_id = user.id,
                path = %actor.path,
                required = %capability.role,
                ?denial,
                "access denied"
            );
            return Err(Error::Denied(denial.redirect(&actor.path)));
        }
    };
    Ok(Authorized { user, profile })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::SessionUser;
    use chrono::Utc;

    fn actor() -> Actor {
        Actor {
            user: Some(SessionUser {
                id: 1,
                username: "alice".into(),
            }),
            path: "/employer/post-job/".into(),
        }
    }

    fn profile(role: Role) -> Profile {
        Profile {
            id: 1,
            user_id: 1,
            role,
            phone: String::new(),
            address: String::new(),
            company_name: String::new(),
            resume_path: None,
            profile_picture_path: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_actor_is_sent_to_login_with_next() {
        let anonymous = Actor::anonymous("/employer/dashboard/");
        let denial = check_capability(&anonymous, None, Capability::EMPLOYER).unwrap_err();
        assert_eq!(denial, Denial::Anonymous);
        let redirect = denial.redirect(&anonymous.path);
        assert_eq!(redirect.location, "/login/?next=%2Femployer%2Fdashboard%2F");
        assert!(redirect.flash.is_none());
    }

    #[test]
    fn missing_profile_goes_to_profile_page() {
        let denial = check_capability(&actor(), None, Capability::POST_JOB).unwrap_err();
        assert_eq!(denial, Denial::MissingProfile);
        let redirect = denial.redirect("/employer/post-job/");
        assert_eq!(redirect.location, "/profile/");
        assert_eq!(redirect.flash.unwrap().message, PROFILE_INCOMPLETE);
    }

    #[test]
    fn wrong_role_gets_the_operation_message() {
        let seeker = profile(Role::JobSeeker);
        let denial = check_capability(&actor(), Some(&seeker), Capability::POST_JOB).unwrap_err();
        let redirect = denial.redirect("/employer/post-job/");
        assert_eq!(redirect.location, "/");
        assert_eq!(redirect.flash.unwrap().message, "Only employers can post jobs.");

        let employer = profile(Role::Employer);
        let denial = check_capability(&actor(), Some(&employer), Capability::APPLY).unwrap_err();
        assert_eq!(denial, Denial::WrongRole("Only job seekers can apply for jobs."));

        let denial =
            check_capability(&actor(), Some(&seeker), Capability::EMPLOYER).unwrap_err();
        assert_eq!(denial, Denial::WrongRole(ACCESS_DENIED));
    }

    #[test]
    fn matching_role_passes() {
        let employer = profile(Role::Employer);
        let granted = check_capability(&actor(), Some(&employer), Capability::EMPLOYER).unwrap();
        assert_eq!(granted.role, Role::Employer);
    }
}
