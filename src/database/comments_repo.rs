use sqlx::SqlitePool;

use crate::models::CommentsRow;

pub struct NewComment<'a> {
    pub id: &'a str,
    pub body: &'a str,
    pub created_at: &'a str,
    pub user_id: &'a str,
    pub activity_id: &'a str,
}

const SQL_INSERT_COMMENT: &str = r#"
INSERT INTO comments (
  id,
  body,
  created_at,
  user_id,
  activity_id
) VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub async fn insert_comment(pool: &SqlitePool, comment: NewComment<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_COMMENT)
        .bind(comment.id)
        .bind(comment.body)
        .bind(comment.created_at)
        .bind(comment.user_id)
        .bind(comment.activity_id)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LIST_COMMENTS: &str = r#"
SELECT
  c.id,
  c.body,
  c.created_at,
  c.user_id,
  u.display_name,
  u.image_url
FROM comments c
JOIN users u ON u.id = c.user_id
WHERE c.activity_id = ?1
ORDER BY c.created_at DESC, c.id DESC
"#;

pub async fn list_comments(pool: &SqlitePool, activity_id: &str) -> sqlx::Result<Vec<CommentsRow>> {
    sqlx::query_as::<_, CommentsRow>(SQL_LIST_COMMENTS)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}

const SQL_GET_COMMENT: &str = r#"
SELECT
  c.id,
  c.body,
  c.created_at,
  c.user_id,
  u.display_name,
  u.image_url
FROM comments c
JOIN users u ON u.id = c.user_id
WHERE c.id = ?1
LIMIT 1
"#;

pub async fn get_comment(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<CommentsRow>> {
    sqlx::query_as::<_, CommentsRow>(SQL_GET_COMMENT)
        .bind(id)
        .fetch_optional(pool)
        .await
}
