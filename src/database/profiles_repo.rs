use sqlx::SqlitePool;

use crate::models::UserProfilesRow;

// ?1 is always the viewing user, used for the `following` flag.
const SQL_LOAD_PROFILE: &str = r#"
SELECT
  u.id,
  u.display_name,
  u.bio,
  u.image_url,
  (SELECT COUNT(*) FROM user_followings f WHERE f.target_id = u.id) AS followers_count,
  (SELECT COUNT(*) FROM user_followings f WHERE f.observer_id = u.id) AS following_count,
  EXISTS (
    SELECT 1 FROM user_followings f WHERE f.target_id = u.id AND f.observer_id = ?1
  ) AS following
FROM users u
WHERE u.id = ?2
LIMIT 1
"#;

pub async fn load_profile(
    pool: &SqlitePool,
    viewer_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<UserProfilesRow>> {
    sqlx::query_as::<_, UserProfilesRow>(SQL_LOAD_PROFILE)
        .bind(viewer_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_LIST_FOLLOWERS: &str = r#"
SELECT
  u.id,
  u.display_name,
  u.bio,
  u.image_url,
  (SELECT COUNT(*) FROM user_followings f WHERE f.target_id = u.id) AS followers_count,
  (SELECT COUNT(*) FROM user_followings f WHERE f.observer_id = u.id) AS following_count,
  EXISTS (
    SELECT 1 FROM user_followings f WHERE f.target_id = u.id AND f.observer_id = ?1
  ) AS following
FROM user_followings uf
JOIN users u ON u.id = uf.observer_id
WHERE uf.target_id = ?2
ORDER BY u.display_name ASC
"#;

/// Users following `user_id`.
pub async fn list_followers(
    pool: &SqlitePool,
    viewer_id: &str,
    user_id: &str,
) -> sqlx::Result<Vec<UserProfilesRow>> {
    sqlx::query_as::<_, UserProfilesRow>(SQL_LIST_FOLLOWERS)
        .bind(viewer_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_FOLLOWINGS: &str = r#"
SELECT
  u.id,
  u.display_name,
  u.bio,
  u.image_url,
  (SELECT COUNT(*) FROM user_followings f WHERE f.target_id = u.id) AS followers_count,
  (SELECT COUNT(*) FROM user_followings f WHERE f.observer_id = u.id) AS following_count,
  EXISTS (
    SELECT 1 FROM user_followings f WHERE f.target_id = u.id AND f.observer_id = ?1
  ) AS following
FROM user_followings uf
JOIN users u ON u.id = uf.target_id
WHERE uf.observer_id = ?2
ORDER BY u.display_name ASC
"#;

/// Users that `user_id` follows.
pub async fn list_followings(
    pool: &SqlitePool,
    viewer_id: &str,
    user_id: &str,
) -> sqlx::Result<Vec<UserProfilesRow>> {
    sqlx::query_as::<_, UserProfilesRow>(SQL_LIST_FOLLOWINGS)
        .bind(viewer_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
