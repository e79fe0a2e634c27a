use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use cookie::{time::Duration, Cookie, SameSite};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::account_service::{self, ResetPasswordForm};
use crate::state::AppState;
use crate::web::middleware::auth::ACCESS_TOKEN_COOKIE;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginQuery {
    use_cookies: Option<bool>,
    use_session_cookies: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    token_type: &'static str,
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailQuery {
    user_id: String,
    code: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailBody {
    #[serde(default)]
    email: String,
}

/// Cookie mode answers with an empty 200 and `Set-Cookie`; otherwise the
/// token comes back in the body for bearer use.
pub async fn login_handler(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    Json(body): Json<LoginBody>,
) -> Result<Response, AppError> {
    let session =
        account_service::login(&state.pool, &state.config, &body.email, &body.password).await?;

    let use_cookies = query.use_cookies.unwrap_or(false);
    let session_cookie = query.use_session_cookies.unwrap_or(false);
    if !(use_cookies || session_cookie) {
        return Ok(Json(AccessTokenResponse {
            token_type: "Bearer",
            access_token: session.token,
            expires_in: session.expires_in_seconds,
        })
        .into_response());
    }

    let mut cookie = Cookie::build((ACCESS_TOKEN_COOKIE, session.token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .build();
    if use_cookies {
        cookie.set_max_age(Duration::seconds(session.expires_in_seconds));
    }
    Ok(([(header::SET_COOKIE, cookie.to_string())], ()).into_response())
}

pub async fn confirm_email_handler(
    State(state): State<AppState>,
    Query(query): Query<ConfirmEmailQuery>,
) -> Result<(), AppError> {
    account_service::confirm_email(&state.pool, &query.user_id, &query.code).await
}

pub async fn resend_confirmation_handler(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<(), AppError> {
    account_service::resend_confirmation_email(
        &state.pool,
        state.mailer.as_ref(),
        &state.config,
        &body.email,
    )
    .await
}

pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<(), AppError> {
    account_service::forgot_password(&state.pool, state.mailer.as_ref(), &state.config, &body.email)
        .await
}

pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordForm>,
) -> Result<(), AppError> {
    account_service::reset_password(&state.pool, &form).await
}
