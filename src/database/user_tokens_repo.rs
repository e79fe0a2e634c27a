use sqlx::SqlitePool;

use crate::models::UserTokensRow;

pub const PURPOSE_CONFIRM_EMAIL: &str = "confirm_email";
pub const PURPOSE_RESET_PASSWORD: &str = "reset_password";

const SQL_INSERT_TOKEN: &str = r#"
INSERT INTO user_tokens (token, user_id, purpose, expires_at)
VALUES (?1, ?2, ?3, ?4)
"#;

pub async fn insert_token(pool: &SqlitePool, row: &UserTokensRow) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_TOKEN)
        .bind(&row.token)
        .bind(&row.user_id)
        .bind(&row.purpose)
        .bind(&row.expires_at)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_DELETE_VALID_TOKEN: &str = r#"
DELETE FROM user_tokens
WHERE token = ?1 AND user_id = ?2 AND purpose = ?3 AND expires_at > ?4
"#;

/// Consumes a token; `true` only when it existed, matched and had not expired.
pub async fn consume_token(
    pool: &SqlitePool,
    token: &str,
    user_id: &str,
    purpose: &str,
    now: &str,
) -> sqlx::Result<bool> {
    let res = sqlx::query(SQL_DELETE_VALID_TOKEN)
        .bind(token)
        .bind(user_id)
        .bind(purpose)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() == 1)
}

const SQL_DELETE_TOKENS_FOR_USER: &str =
    "DELETE FROM user_tokens WHERE user_id = ?1 AND purpose = ?2";

pub async fn delete_tokens_for_user(
    pool: &SqlitePool,
    user_id: &str,
    purpose: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_TOKENS_FOR_USER)
        .bind(user_id)
        .bind(purpose)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
