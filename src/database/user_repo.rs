use sqlx::SqlitePool;

use crate::models::UsersRow;

pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub display_name: &'a str,
    pub password_hash: &'a str,
    pub email_confirmed: bool,
    pub created_at: &'a str,
}

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
  id,
  email,
  user_name,
  display_name,
  password_hash,
  email_confirmed,
  created_at
) VALUES (?1, ?2, ?2, ?3, ?4, ?5, ?6)
"#;

pub async fn insert_user(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_USER)
        .bind(user.id)
        .bind(user.email)
        .bind(user.display_name)
        .bind(user.password_hash)
        .bind(user.email_confirmed)
        .bind(user.created_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub const SQL_LOAD_USER_BY_ID: &str = r#"
SELECT
  id,
  email,
  user_name,
  display_name,
  bio,
  image_url,
  password_hash,
  email_confirmed,
  created_at
FROM users
WHERE id = ?1
LIMIT 1
"#;

pub async fn load_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER_BY_ID)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub const SQL_LOAD_USER_BY_EMAIL: &str = r#"
SELECT
  id,
  email,
  user_name,
  display_name,
  bio,
  image_url,
  password_hash,
  email_confirmed,
  created_at
FROM users
WHERE email = ?1
LIMIT 1
"#;

/// Case-insensitive through the column collation.
pub async fn load_user_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER_BY_EMAIL)
        .bind(email.trim())
        .fetch_optional(pool)
        .await
}

const SQL_USER_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM users WHERE id = ?1)";

pub async fn user_exists(pool: &SqlitePool, user_id: &str) -> sqlx::Result<bool> {
    let found = sqlx::query_scalar::<_, i64>(SQL_USER_EXISTS)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(found == 1)
}

const SQL_COUNT_USERS: &str = "SELECT COUNT(*) FROM users";

pub async fn count_users(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_USERS)
        .fetch_one(pool)
        .await
}

const SQL_UPDATE_PROFILE: &str = "UPDATE users SET display_name = ?2, bio = ?3 WHERE id = ?1";

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    display_name: &str,
    bio: Option<&str>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_PROFILE)
        .bind(user_id)
        .bind(display_name)
        .bind(bio)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SET_IMAGE_URL: &str = "UPDATE users SET image_url = ?2 WHERE id = ?1";

pub async fn set_image_url(pool: &SqlitePool, user_id: &str, url: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_IMAGE_URL)
        .bind(user_id)
        .bind(url)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SET_IMAGE_URL_IF_MISSING: &str =
    "UPDATE users SET image_url = ?2 WHERE id = ?1 AND image_url IS NULL";

/// Returns whether the url became the user's main image.
pub async fn set_image_url_if_missing(
    pool: &SqlitePool,
    user_id: &str,
    url: &str,
) -> sqlx::Result<bool> {
    let res = sqlx::query(SQL_SET_IMAGE_URL_IF_MISSING)
        .bind(user_id)
        .bind(url)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() == 1)
}

const SQL_UPDATE_PASSWORD_HASH: &str = "UPDATE users SET password_hash = ?2 WHERE id = ?1";

pub async fn update_password_hash(
    pool: &SqlitePool,
    user_id: &str,
    password_hash: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_PASSWORD_HASH)
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_CONFIRM_EMAIL: &str = "UPDATE users SET email_confirmed = 1 WHERE id = ?1";

pub async fn confirm_email(pool: &SqlitePool, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_CONFIRM_EMAIL)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
