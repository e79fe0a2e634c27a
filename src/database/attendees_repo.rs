use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{ActivityAttendeesRow, AttendeeProfileRow};

const SQL_FIND_ATTENDEE: &str = r#"
SELECT activity_id, user_id, is_host, date_joined
FROM activity_attendees
WHERE activity_id = ?1 AND user_id = ?2
LIMIT 1
"#;

pub async fn find_attendee(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<ActivityAttendeesRow>> {
    sqlx::query_as::<_, ActivityAttendeesRow>(SQL_FIND_ATTENDEE)
        .bind(activity_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_ATTENDEE: &str = r#"
INSERT INTO activity_attendees (activity_id, user_id, is_host, date_joined)
VALUES (?1, ?2, ?3, ?4)
"#;

pub async fn insert_attendee(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
    is_host: bool,
    date_joined: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_ATTENDEE)
        .bind(activity_id)
        .bind(user_id)
        .bind(is_host)
        .bind(date_joined)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_DELETE_ATTENDEE: &str =
    "DELETE FROM activity_attendees WHERE activity_id = ?1 AND user_id = ?2";

pub async fn delete_attendee(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_ATTENDEE)
        .bind(activity_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Attendee profiles for several activities at once, in join order.
pub async fn list_attendee_profiles(
    pool: &SqlitePool,
    viewer_id: &str,
    activity_ids: &[String],
) -> sqlx::Result<Vec<AttendeeProfileRow>> {
    if activity_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
SELECT
  aa.activity_id,
  aa.is_host,
  u.id AS user_id,
  u.display_name,
  u.bio,
  u.image_url,
  (SELECT COUNT(*) FROM user_followings f WHERE f.target_id = u.id) AS followers_count,
  (SELECT COUNT(*) FROM user_followings f WHERE f.observer_id = u.id) AS following_count,
  EXISTS (
    SELECT 1 FROM user_followings f
    WHERE f.target_id = u.id AND f.observer_id = "#,
    );
    qb.push_bind(viewer_id.to_string());
    qb.push(
        r#"
  ) AS following
FROM activity_attendees aa
JOIN users u ON u.id = aa.user_id
WHERE aa.activity_id IN ("#,
    );
    let mut ids = qb.separated(", ");
    for id in activity_ids {
        ids.push_bind(id.clone());
    }
    ids.push_unseparated(")");
    qb.push(" ORDER BY aa.date_joined ASC, u.id ASC");

    qb.build_query_as::<AttendeeProfileRow>()
        .fetch_all(pool)
        .await
}
