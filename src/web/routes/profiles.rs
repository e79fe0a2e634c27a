use axum::{
    extract::{Multipart, Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::AppError;
use crate::services::photo_service::{self, PhotoDto};
use crate::services::photo_store::PhotoUpload;
use crate::services::profile_service::{
    self, EditProfileForm, FollowPredicate, UserActivityDto, UserActivityFilter, UserProfile,
};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct FollowListQuery {
    predicate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserActivitiesQuery {
    filter: Option<String>,
}

pub async fn profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<UserProfile>, AppError> {
    profile_service::get_profile(&pool, &auth_user.id, &user_id)
        .await
        .map(Json)
}

pub async fn edit_profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(form): Json<EditProfileForm>,
) -> Result<(), AppError> {
    profile_service::edit_profile(&pool, &auth_user.id, &form).await
}

pub async fn user_activities_handler(
    Path(user_id): Path<String>,
    State(pool): State<SqlitePool>,
    Query(query): Query<UserActivitiesQuery>,
) -> Result<Json<Vec<UserActivityDto>>, AppError> {
    let filter = UserActivityFilter::parse(query.filter.as_deref());
    profile_service::get_user_activities(&pool, &user_id, filter)
        .await
        .map(Json)
}

pub async fn follow_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(target_user_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<(), AppError> {
    profile_service::toggle_follow(&pool, &auth_user.id, &target_user_id).await?;
    Ok(())
}

pub async fn follow_list_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(pool): State<SqlitePool>,
    Query(query): Query<FollowListQuery>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let predicate = FollowPredicate::parse(query.predicate.as_deref());
    profile_service::get_followings(&pool, &auth_user.id, &user_id, predicate)
        .await
        .map(Json)
}

/// Reads the `file` part of a multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<PhotoUpload, AppError> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            warn!(error = %e, "malformed multipart body");
            AppError::bad_request("Failed to upload photo")
        })?;
        let Some(field) = field else {
            return Err(AppError::invalid("File", "File is required"));
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            warn!(error = %e, "multipart file read failed");
            AppError::bad_request("Failed to upload photo")
        })?;
        return Ok(PhotoUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}

pub async fn add_photo_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PhotoDto>, AppError> {
    let upload = read_file_field(multipart).await?;
    photo_service::add_photo(&state.pool, state.photos.as_ref(), &auth_user.id, upload)
        .await
        .map(Json)
}

pub async fn photos_handler(
    Path(user_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<PhotoDto>>, AppError> {
    photo_service::get_photos(&pool, &user_id).await.map(Json)
}

pub async fn delete_photo_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(photo_id): Path<String>,
    State(state): State<AppState>,
) -> Result<(), AppError> {
    photo_service::delete_photo(&state.pool, state.photos.as_ref(), &auth_user.id, &photo_id).await
}

pub async fn set_main_photo_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(photo_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<(), AppError> {
    photo_service::set_main_photo(&pool, &auth_user.id, &photo_id).await
}
