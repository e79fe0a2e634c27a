use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use cookie::Cookie;

use crate::error::AppError;
use crate::services::account_service::{self, ChangePasswordForm, RegisterForm};
use crate::state::AppState;
use crate::web::middleware::auth::{self, AuthenticatedUser, ACCESS_TOKEN_COOKIE};

pub async fn register_handler(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<(), AppError> {
    account_service::register(&state.pool, state.mailer.as_ref(), &state.config, &form).await
}

/// Anonymous callers get 204 so the client can probe its login state.
pub async fn user_info_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(auth_user) = auth::resolve_user(&state.pool, &headers).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let info = account_service::user_info(&state.pool, &auth_user.id).await?;
    Ok(match info {
        Some(info) => Json(info).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn logout_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    account_service::logout(&state.pool, &auth_user.token).await?;

    let mut removal = Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").build();
    removal.make_removal();
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, removal.to_string())],
    ))
}

pub async fn change_password_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(form): Json<ChangePasswordForm>,
) -> Result<(), AppError> {
    account_service::change_password(&state.pool, &auth_user.id, &form).await
}
