use sqlx::SqlitePool;

use crate::models::{ActivitiesRow, UserActivityRow};

/// Column values shared by create and edit.
pub struct ActivityFields<'a> {
    pub title: &'a str,
    pub date: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub city: &'a str,
    pub venue: &'a str,
    pub latitude: f64,
    pub longitude: f64,
}

const SQL_LIST_ACTIVITIES: &str = r#"
SELECT
  a.id,
  a.title,
  a.date,
  a.description,
  a.category,
  a.is_cancelled,
  a.city,
  a.venue,
  a.latitude,
  a.longitude
FROM activities a
WHERE a.date >= ?1
  AND (
    ?2 = 'all'
    OR (
      ?2 = 'isGoing'
      AND EXISTS (
        SELECT 1 FROM activity_attendees aa
        WHERE aa.activity_id = a.id AND aa.user_id = ?3
      )
    )
    OR (
      ?2 = 'isHost'
      AND EXISTS (
        SELECT 1 FROM activity_attendees aa
        WHERE aa.activity_id = a.id AND aa.user_id = ?3 AND aa.is_host = 1
      )
    )
  )
ORDER BY a.date ASC, a.id ASC
LIMIT ?4
"#;

/// `filter` is one of `all`, `isGoing`, `isHost`.
pub async fn list_activities_from(
    pool: &SqlitePool,
    from_date: &str,
    filter: &str,
    user_id: &str,
    limit: i64,
) -> sqlx::Result<Vec<ActivitiesRow>> {
    sqlx::query_as::<_, ActivitiesRow>(SQL_LIST_ACTIVITIES)
        .bind(from_date)
        .bind(filter)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

const SQL_GET_ACTIVITY: &str = r#"
SELECT
  id,
  title,
  date,
  description,
  category,
  is_cancelled,
  city,
  venue,
  latitude,
  longitude
FROM activities
WHERE id = ?1
LIMIT 1
"#;

pub async fn get_activity(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<ActivitiesRow>> {
    sqlx::query_as::<_, ActivitiesRow>(SQL_GET_ACTIVITY)
        .bind(id)
        .fetch_optional(pool)
        .await
}

const SQL_ACTIVITY_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM activities WHERE id = ?1)";

pub async fn activity_exists(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let found = sqlx::query_scalar::<_, i64>(SQL_ACTIVITY_EXISTS)
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found == 1)
}

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activities (
  id,
  title,
  date,
  description,
  category,
  is_cancelled,
  city,
  venue,
  latitude,
  longitude
) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8, ?9)
"#;

const SQL_INSERT_HOST_ATTENDEE: &str = r#"
INSERT INTO activity_attendees (activity_id, user_id, is_host, date_joined)
VALUES (?1, ?2, 1, ?3)
"#;

/// Inserts the activity and its host attendee atomically.
pub async fn insert_activity_with_host(
    pool: &SqlitePool,
    id: &str,
    fields: &ActivityFields<'_>,
    host_user_id: &str,
    joined_at: &str,
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(id)
        .bind(fields.title)
        .bind(fields.date)
        .bind(fields.description)
        .bind(fields.category)
        .bind(fields.city)
        .bind(fields.venue)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .execute(&mut *tx)
        .await?;

    sqlx::query(SQL_INSERT_HOST_ATTENDEE)
        .bind(id)
        .bind(host_user_id)
        .bind(joined_at)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

const SQL_UPDATE_ACTIVITY: &str = r#"
UPDATE activities
SET title = ?2,
    date = ?3,
    description = ?4,
    category = ?5,
    city = ?6,
    venue = ?7,
    latitude = ?8,
    longitude = ?9
WHERE id = ?1
"#;

pub async fn update_activity(
    pool: &SqlitePool,
    id: &str,
    fields: &ActivityFields<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_ACTIVITY)
        .bind(id)
        .bind(fields.title)
        .bind(fields.date)
        .bind(fields.description)
        .bind(fields.category)
        .bind(fields.city)
        .bind(fields.venue)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SET_CANCELLED: &str = "UPDATE activities SET is_cancelled = ?2 WHERE id = ?1";

pub async fn set_cancelled(pool: &SqlitePool, id: &str, cancelled: bool) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_CANCELLED)
        .bind(id)
        .bind(cancelled)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_ACTIVITY: &str = "DELETE FROM activities WHERE id = ?1";

pub async fn delete_activity(pool: &SqlitePool, id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_ACTIVITY)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_USER_ACTIVITIES: &str = r#"
SELECT
  a.id,
  a.title,
  a.category,
  a.date
FROM activity_attendees aa
JOIN activities a ON a.id = aa.activity_id
WHERE aa.user_id = ?1
  AND (
    (?2 = 'past' AND a.date <= ?3)
    OR (?2 = 'hosting' AND aa.is_host = 1)
    OR (?2 = 'future' AND a.date >= ?3)
  )
ORDER BY a.date ASC
"#;

/// `filter` is one of `past`, `hosting`, `future`.
pub async fn list_user_activities(
    pool: &SqlitePool,
    user_id: &str,
    filter: &str,
    now: &str,
) -> sqlx::Result<Vec<UserActivityRow>> {
    sqlx::query_as::<_, UserActivityRow>(SQL_LIST_USER_ACTIVITIES)
        .bind(user_id)
        .bind(filter)
        .bind(now)
        .fetch_all(pool)
        .await
}

const SQL_COUNT_ACTIVITIES: &str = "SELECT COUNT(*) FROM activities";

pub async fn count_activities(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_ACTIVITIES)
        .fetch_one(pool)
        .await
}
