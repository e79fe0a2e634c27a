use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::{photos_repo, user_repo};
use crate::error::AppError;
use crate::models::PhotosRow;
use crate::services::photo_store::{PhotoStore, PhotoUpload};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDto {
    pub id: String,
    pub url: String,
    pub public_id: String,
    pub user_id: String,
}

impl From<PhotosRow> for PhotoDto {
    fn from(row: PhotosRow) -> Self {
        Self {
            id: row.id,
            url: row.url,
            public_id: row.public_id,
            user_id: row.user_id,
        }
    }
}

/// Stores the upload and records it. The first photo of a user without an
/// image becomes their main photo.
pub async fn add_photo(
    pool: &SqlitePool,
    store: &dyn PhotoStore,
    user_id: &str,
    upload: PhotoUpload,
) -> Result<PhotoDto, AppError> {
    let stored = store.upload(upload).await.map_err(|e| {
        warn!(user_id, error = %e, "photo upload rejected");
        AppError::bad_request("Failed to upload photo")
    })?;

    let row = PhotosRow {
        id: Uuid::new_v4().to_string(),
        url: stored.url,
        public_id: stored.public_id,
        user_id: user_id.to_string(),
    };
    photos_repo::insert_photo(pool, &row).await?;

    let is_main = user_repo::set_image_url_if_missing(pool, user_id, &row.url).await?;
    info!(user_id, photo_id = %row.id, is_main, "photo added");
    Ok(PhotoDto::from(row))
}

pub async fn get_photos(pool: &SqlitePool, user_id: &str) -> Result<Vec<PhotoDto>, AppError> {
    Ok(photos_repo::list_photos_for_user(pool, user_id)
        .await?
        .into_iter()
        .map(PhotoDto::from)
        .collect())
}

async fn find_own_photo(
    pool: &SqlitePool,
    user_id: &str,
    photo_id: &str,
) -> Result<PhotosRow, AppError> {
    photos_repo::find_photo_for_user(pool, photo_id, user_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Cannot find photo"))
}

pub async fn delete_photo(
    pool: &SqlitePool,
    store: &dyn PhotoStore,
    user_id: &str,
    photo_id: &str,
) -> Result<(), AppError> {
    let photo = find_own_photo(pool, user_id, photo_id).await?;
    let user = user_repo::load_user(pool, user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if user.image_url.as_deref() == Some(photo.url.as_str()) {
        return Err(AppError::bad_request("Cannot delete main photo"));
    }

    // The record goes first; a failed file removal only leaves an orphan file.
    photos_repo::delete_photo(pool, photo_id).await?;
    if let Err(e) = store.delete(&photo.public_id).await {
        warn!(user_id, photo_id, public_id = %photo.public_id, error = %e, "photo file not removed");
    }
    info!(user_id, photo_id, "photo deleted");
    Ok(())
}

pub async fn set_main_photo(
    pool: &SqlitePool,
    user_id: &str,
    photo_id: &str,
) -> Result<(), AppError> {
    let photo = find_own_photo(pool, user_id, photo_id).await?;
    user_repo::set_image_url(pool, user_id, &photo.url).await?;
    info!(user_id, photo_id, "main photo changed");
    Ok(())
}
