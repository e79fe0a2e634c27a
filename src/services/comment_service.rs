use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::comments_repo::{self, NewComment};
use crate::database::{activities_repo, timestamps};
use crate::error::AppError;
use crate::models::CommentsRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub display_name: String,
    pub image_url: Option<String>,
}

impl TryFrom<CommentsRow> for CommentDto {
    type Error = AppError;

    fn try_from(row: CommentsRow) -> Result<Self, Self::Error> {
        let created_at = timestamps::from_db(&row.created_at)
            .ok_or_else(|| AppError::Internal(format!("comment {} has a corrupt date", row.id)))?;
        Ok(Self {
            id: row.id,
            body: row.body,
            created_at,
            user_id: row.user_id,
            display_name: row.display_name.unwrap_or_default(),
            image_url: row.image_url,
        })
    }
}

/// Newest first.
pub async fn list_comments(
    pool: &SqlitePool,
    activity_id: &str,
) -> Result<Vec<CommentDto>, AppError> {
    comments_repo::list_comments(pool, activity_id)
        .await?
        .into_iter()
        .map(CommentDto::try_from)
        .collect()
}

pub async fn add_comment(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
    body: &str,
) -> Result<CommentDto, AppError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::invalid("Body", "Comment body is required"));
    }
    if !activities_repo::activity_exists(pool, activity_id).await? {
        return Err(AppError::not_found("Could not find activity"));
    }

    let id = Uuid::new_v4().to_string();
    comments_repo::insert_comment(
        pool,
        NewComment {
            id: &id,
            body,
            created_at: &timestamps::now(),
            user_id,
            activity_id,
        },
    )
    .await?;

    let row = comments_repo::get_comment(pool, &id)
        .await?
        .ok_or_else(|| AppError::bad_request("Failed to add comment"))?;
    CommentDto::try_from(row)
}
