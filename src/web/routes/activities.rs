use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::services::activities_service::{self, ActivityDto, ActivityParams, PagedList};
use crate::services::validation::ActivityForm;
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn list_activities_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Query(params): Query<ActivityParams>,
) -> Result<Json<PagedList<ActivityDto>>, AppError> {
    activities_service::list_activities(&pool, &auth_user.id, &params)
        .await
        .map(Json)
}

pub async fn activity_detail_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<ActivityDto>, AppError> {
    activities_service::get_activity(&pool, &auth_user.id, &activity_id)
        .await
        .map(Json)
}

pub async fn create_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(form): Json<ActivityForm>,
) -> Result<Json<String>, AppError> {
    activities_service::create_activity(&pool, &auth_user.id, &form)
        .await
        .map(Json)
}

pub async fn edit_activity_handler(
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(form): Json<ActivityForm>,
) -> Result<(), AppError> {
    activities_service::edit_activity(&pool, &activity_id, &form).await
}

pub async fn delete_activity_handler(
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<(), AppError> {
    activities_service::delete_activity(&pool, &activity_id).await
}

pub async fn attend_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<(), AppError> {
    activities_service::update_attendance(&pool, &auth_user.id, &activity_id).await?;
    Ok(())
}
