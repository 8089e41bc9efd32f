use crate::error::{is_unique_violation, Error, Result};
use crate::models::profile::{Profile, Role};
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::validation::field_error;
use sqlx::PgPool;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, is_active, created_at";
const PROFILE_COLUMNS: &str = "id, user_id, role, phone, address, company_name, resume_path, profile_picture_path, created_at";

pub const BAD_CREDENTIALS: &str = "Please enter a correct username and password.";

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: String,
    pub address: String,
    pub company_name: String,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_name: Option<String>,
    pub resume_path: Option<String>,
    pub profile_picture_path: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the user and its profile in one transaction.
    pub async fn register(&self, account: NewAccount) -> Result<(User, Profile)> {
        let taken = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = $1")
            .bind(&account.username)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(username_taken());
        }

        let password_hash = hash_password(&account.password)?;
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, first_name, last_name, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                username_taken()
            } else {
                Error::from(e)
            }
        })?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO profiles (user_id, role, phone, address, company_name)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user.id)
        .bind(account.role)
        .bind(&account.phone)
        .bind(&account.address)
        .bind(&account.company_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(user_id = user.id, role = %profile.role, "user registered");
        Ok((user, profile))
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) if user.is_active && verify_password(password, &user.password_hash) => {
                Ok(user)
            }
            _ => {
                tracing::warn!(username, "failed login attempt");
                Err(Error::Unauthorized(BAD_CREDENTIALS.into()))
            }
        }
    }

    pub async fn find_active_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_profile(&self, user_id: i64) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: i64) -> Result<Profile> {
        self.find_profile(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Profile not found".into()))
    }

    pub async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles
             SET
                phone = COALESCE($2, phone),
                address = COALESCE($3, address),
                company_name = COALESCE($4, company_name),
                resume_path = COALESCE($5, resume_path),
                profile_picture_path = COALESCE($6, profile_picture_path)
             WHERE user_id = $1
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(update.phone)
        .bind(update.address)
        .bind(update.company_name)
        .bind(update.resume_path)
        .bind(update.profile_picture_path)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id, "profile updated");
        Ok(profile)
    }
}

fn username_taken() -> Error {
    Error::Validation(field_error(
        "username",
        "unique",
        "A user with that username already exists.",
    ))
}
