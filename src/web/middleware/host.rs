use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::services::activities_service;
use crate::web::middleware::auth::AuthenticatedUser;

/// Lets the request through only when the caller hosts the activity in the path.
pub async fn require_host(
    State(pool): State<SqlitePool>,
    Path(activity_id): Path<String>,
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    activities_service::ensure_host(&pool, &activity_id, &user.id).await?;
    Ok(next.run(request).await)
}
