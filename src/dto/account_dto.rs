use bytes::Bytes;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::dto::Choice;
use crate::models::profile::{Profile, Role};
use crate::models::user::User;
use crate::services::account_service::NewAccount;
use crate::services::media_service::{check_upload, MediaKind};
use crate::utils::crypto::MIN_PASSWORD_LEN;
use crate::utils::validation::{add_field_error, validate_with};

const USERNAME_EXTRA_CHARS: &str = "@.+-_";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Enter a username of at most 150 characters."))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    #[validate(length(max = 15, message = "Ensure the phone number has at most 15 characters."))]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure the company name has at most 100 characters."))]
    pub company_name: String,
}

impl RegisterForm {
    /// Checks every field and collects all problems before giving up.
    pub fn into_account(mut self) -> Result<NewAccount, ValidationErrors> {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        let role = self.user_type.parse::<Role>();

        validate_with(&self, |errors| {
            let bad_chars = self
                .username
                .chars()
                .any(|c| !(c.is_alphanumeric() || USERNAME_EXTRA_CHARS.contains(c)));
            if bad_chars {
                add_field_error(
                    errors,
                    "username",
                    "invalid",
                    "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
            if self.password1.chars().count() < MIN_PASSWORD_LEN {
                add_field_error(
                    errors,
                    "password1",
                    "password_too_short",
                    format!(
                        "This password is too short. It must contain at least {} characters.",
                        MIN_PASSWORD_LEN
                    ),
                );
            }
            if self.password1 != self.password2 {
                add_field_error(
                    errors,
                    "password2",
                    "password_mismatch",
                    "The two password fields didn't match.",
                );
            }
            if role.is_err() {
                add_field_error(
                    errors,
                    "user_type",
                    "invalid_choice",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        self.user_type
                    ),
                );
            }
        })?;

        let role = role.map_err(|_| ValidationErrors::new())?;
        Ok(NewAccount {
            username: self.username,
            email: self.email,
            password: self.password1,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            role,
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            company_name: self.company_name.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// A file taken from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

/// The multipart profile form; fields that were not sent stay `None`.
#[derive(Debug, Clone, Default)]
pub struct ProfileSubmission {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_name: Option<String>,
    pub resume: Option<Upload>,
    pub profile_picture: Option<Upload>,
}

impl ProfileSubmission {
    /// Checks the whole submission for a profile with `role` before anything is stored.
    pub fn check(&self, role: Role) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.phone.as_deref().is_some_and(|p| p.chars().count() > 15) {
            add_field_error(
                &mut errors,
                "phone",
                "length",
                "Ensure the phone number has at most 15 characters.",
            );
        }
        if self
            .company_name
            .as_deref()
            .is_some_and(|c| c.chars().count() > 100)
        {
            add_field_error(
                &mut errors,
                "company_name",
                "length",
                "Ensure the company name has at most 100 characters.",
            );
        }
        if let Some(resume) = &self.resume {
            if role != Role::JobSeeker {
                add_field_error(
                    &mut errors,
                    "resume",
                    "not_allowed",
                    "Only job seekers can upload a resume.",
                );
            } else if let Err(message) = check_upload(MediaKind::Resume, &resume.file_name, &resume.data) {
                add_field_error(&mut errors, "resume", "invalid_file", message);
            }
        }
        if let Some(picture) = &self.profile_picture {
            if let Err(message) =
                check_upload(MediaKind::ProfilePicture, &picture.file_name, &picture.data)
            {
                add_field_error(&mut errors, "profile_picture", "invalid_file", message);
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPage {
    pub user_types: Vec<Choice>,
}

impl RegisterPage {
    pub fn new() -> Self {
        Self {
            user_types: Role::ALL
                .iter()
                .map(|role| Choice::new(role.as_str(), role.label()))
                .collect(),
        }
    }
}

impl Default for RegisterPage {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginPage {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub user: User,
    pub profile: Profile,
    pub full_name: String,
    pub resume_uploaded: bool,
    pub profile_picture_url: Option<String>,
}

impl ProfilePage {
    pub fn new(user: User, profile: Profile) -> Self {
        let profile_picture_url = profile
            .profile_picture_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("/media/{}", path));
        Self {
            full_name: user.full_name(),
            resume_uploaded: profile
                .resume_path
                .as_deref()
                .is_some_and(|path| !path.is_empty()),
            profile_picture_url,
            user,
            profile,
        }
    }
}
