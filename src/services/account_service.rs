use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::user_repo::{self, NewUser};
use crate::database::user_tokens_repo::{self, PURPOSE_CONFIRM_EMAIL, PURPOSE_RESET_PASSWORD};
use crate::database::{sessions_repo, timestamps};
use crate::error::{AppError, ValidationErrors};
use crate::models::{UserTokensRow, UsersRow};
use crate::services::email_service::{self, EmailSender};
use crate::services::password_service;
use crate::services::validation;

/// How long confirmation and reset codes stay valid.
pub const TOKEN_VALID_HOURS: i64 = 24;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub reset_code: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub display_name: String,
    pub email: String,
    pub id: String,
    pub image_url: Option<String>,
}

impl From<UsersRow> for UserInfo {
    fn from(row: UsersRow) -> Self {
        Self {
            display_name: row.display_name.unwrap_or_default(),
            email: row.email,
            id: row.id,
            image_url: row.image_url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_in_seconds: i64,
}

fn random_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

async fn issue_token(pool: &SqlitePool, user_id: &str, purpose: &str) -> Result<String, AppError> {
    user_tokens_repo::delete_tokens_for_user(pool, user_id, purpose).await?;
    let row = UserTokensRow {
        token: random_token(),
        user_id: user_id.to_string(),
        purpose: purpose.to_string(),
        expires_at: timestamps::to_db(Utc::now() + Duration::hours(TOKEN_VALID_HOURS)),
    };
    user_tokens_repo::insert_token(pool, &row).await?;
    Ok(row.token)
}

async fn send_confirmation(
    pool: &SqlitePool,
    mailer: &dyn EmailSender,
    config: &AppConfig,
    user: &UsersRow,
) -> Result<(), AppError> {
    let code = issue_token(pool, &user.id, PURPOSE_CONFIRM_EMAIL).await?;
    let message = email_service::confirmation_email(
        &config.client_app_url,
        &user.email,
        user.display_name.as_deref().unwrap_or_default(),
        &user.id,
        &code,
    )?;
    mailer
        .send(message)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub async fn register(
    pool: &SqlitePool,
    mailer: &dyn EmailSender,
    config: &AppConfig,
    form: &RegisterForm,
) -> Result<(), AppError> {
    let email = form.email.trim();
    let mut errors = ValidationErrors::new();
    validation::validate_display_name(&form.display_name, &mut errors);
    if !validation::is_valid_email(email) {
        errors.add("InvalidEmail", format!("Email '{email}' is invalid."));
    } else if user_repo::load_user_by_email(pool, email).await?.is_some() {
        errors.add("DuplicateUserName", format!("Username '{email}' is already taken."));
        errors.add("DuplicateEmail", format!("Email '{email}' is already taken."));
    }
    password_service::check_password_policy(&form.password, &mut errors);
    errors.into_result()?;

    let id = Uuid::new_v4().to_string();
    let password_hash = password_service::hash_password(&form.password).await?;
    user_repo::insert_user(
        pool,
        NewUser {
            id: &id,
            email,
            display_name: form.display_name.trim(),
            password_hash: &password_hash,
            email_confirmed: !config.require_confirmed_email,
            created_at: &timestamps::now(),
        },
    )
    .await?;
    info!(user_id = %id, "user registered");

    if config.require_confirmed_email {
        let user = user_repo::load_user(pool, &id)
            .await?
            .ok_or_else(|| AppError::Internal("registered user vanished".into()))?;
        send_confirmation(pool, mailer, config, &user).await?;
    }
    Ok(())
}

/// Checks the credentials and opens a session. Every failure is a bare 401.
pub async fn login(
    pool: &SqlitePool,
    config: &AppConfig,
    email: &str,
    password: &str,
) -> Result<Session, AppError> {
    let Some(user) = user_repo::load_user_by_email(pool, email.trim()).await? else {
        return Err(AppError::Unauthorized);
    };
    if !password_service::verify_password(password, &user.password_hash).await? {
        warn!(user_id = %user.id, "login rejected: bad password");
        return Err(AppError::Unauthorized);
    }
    if config.require_confirmed_email && user.email_confirmed == 0 {
        warn!(user_id = %user.id, "login rejected: email not confirmed");
        return Err(AppError::Unauthorized);
    }

    let now = Utc::now();
    let ttl = Duration::hours(config.session_ttl_hours);
    let token = random_token();
    sessions_repo::insert_session(
        pool,
        &token,
        &user.id,
        &timestamps::to_db(now),
        &timestamps::to_db(now + ttl),
    )
    .await?;
    info!(user_id = %user.id, "session opened");

    Ok(Session {
        token,
        user_id: user.id,
        expires_in_seconds: ttl.num_seconds(),
    })
}

pub async fn resolve_session(pool: &SqlitePool, token: &str) -> Result<Option<String>, AppError> {
    Ok(sessions_repo::load_session_user_id(pool, token, &timestamps::now()).await?)
}

pub async fn logout(pool: &SqlitePool, token: &str) -> Result<(), AppError> {
    sessions_repo::delete_session(pool, token).await?;
    Ok(())
}

pub async fn user_info(pool: &SqlitePool, user_id: &str) -> Result<Option<UserInfo>, AppError> {
    Ok(user_repo::load_user(pool, user_id).await?.map(UserInfo::from))
}

pub async fn change_password(
    pool: &SqlitePool,
    user_id: &str,
    form: &ChangePasswordForm,
) -> Result<(), AppError> {
    let user = user_repo::load_user(pool, user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let mut errors = ValidationErrors::new();
    if !password_service::verify_password(&form.current_password, &user.password_hash).await? {
        errors.add("PasswordMismatch", "Incorrect password.");
    }
    password_service::check_password_policy(&form.new_password, &mut errors);
    errors.into_result()?;

    let hash = password_service::hash_password(&form.new_password).await?;
    user_repo::update_password_hash(pool, user_id, &hash).await?;
    info!(user_id, "password changed");
    Ok(())
}

/// 401 for an unknown user or a wrong/expired code.
pub async fn confirm_email(pool: &SqlitePool, user_id: &str, code: &str) -> Result<(), AppError> {
    let consumed = user_tokens_repo::consume_token(
        pool,
        code,
        user_id,
        PURPOSE_CONFIRM_EMAIL,
        &timestamps::now(),
    )
    .await?;
    if !consumed {
        return Err(AppError::Unauthorized);
    }
    user_repo::confirm_email(pool, user_id).await?;
    info!(user_id, "email confirmed");
    Ok(())
}

/// Silently does nothing for unknown or already confirmed addresses.
pub async fn resend_confirmation_email(
    pool: &SqlitePool,
    mailer: &dyn EmailSender,
    config: &AppConfig,
    email: &str,
) -> Result<(), AppError> {
    match user_repo::load_user_by_email(pool, email.trim()).await? {
        Some(user) if user.email_confirmed == 0 => {
            send_confirmation(pool, mailer, config, &user).await
        }
        _ => Ok(()),
    }
}

/// Sends a reset code to confirmed users. Unknown addresses get no mail and
/// no error, so callers cannot probe for accounts.
pub async fn forgot_password(
    pool: &SqlitePool,
    mailer: &dyn EmailSender,
    config: &AppConfig,
    email: &str,
) -> Result<(), AppError> {
    let Some(user) = user_repo::load_user_by_email(pool, email.trim()).await? else {
        return Ok(());
    };
    if config.require_confirmed_email && user.email_confirmed == 0 {
        return Ok(());
    }

    let code = issue_token(pool, &user.id, PURPOSE_RESET_PASSWORD).await?;
    let message = email_service::reset_password_email(
        &config.client_app_url,
        &user.email,
        user.display_name.as_deref().unwrap_or_default(),
        &code,
        TOKEN_VALID_HOURS,
    )?;
    mailer
        .send(message)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub async fn reset_password(pool: &SqlitePool, form: &ResetPasswordForm) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();
    password_service::check_password_policy(&form.new_password, &mut errors);
    errors.into_result()?;

    let invalid = || AppError::invalid("InvalidToken", "Invalid token.");
    let user = user_repo::load_user_by_email(pool, form.email.trim())
        .await?
        .ok_or_else(invalid)?;
    let consumed = user_tokens_repo::consume_token(
        pool,
        form.reset_code.trim(),
        &user.id,
        PURPOSE_RESET_PASSWORD,
        &timestamps::now(),
    )
    .await?;
    if !consumed {
        return Err(invalid());
    }

    let hash = password_service::hash_password(&form.new_password).await?;
    user_repo::update_password_hash(pool, &user.id, &hash).await?;
    sessions_repo::delete_sessions_for_user(pool, &user.id).await?;
    info!(user_id = %user.id, "password reset");
    Ok(())
}
