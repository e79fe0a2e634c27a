use sqlx::SqlitePool;

const SQL_INSERT_SESSION: &str = r#"
INSERT INTO sessions (token, user_id, created_at, expires_at)
VALUES (?1, ?2, ?3, ?4)
"#;

pub async fn insert_session(
    pool: &SqlitePool,
    token: &str,
    user_id: &str,
    created_at: &str,
    expires_at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_SESSION)
        .bind(token)
        .bind(user_id)
        .bind(created_at)
        .bind(expires_at)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LOAD_SESSION_USER_ID: &str = r#"
SELECT user_id
FROM sessions
WHERE token = ?1 AND expires_at > ?2
LIMIT 1
"#;

pub async fn load_session_user_id(
    pool: &SqlitePool,
    token: &str,
    now: &str,
) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>(SQL_LOAD_SESSION_USER_ID)
        .bind(token)
        .bind(now)
        .fetch_optional(pool)
        .await
}

const SQL_DELETE_SESSION: &str = "DELETE FROM sessions WHERE token = ?1";

pub async fn delete_session(pool: &SqlitePool, token: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_SESSION)
        .bind(token)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_SESSIONS_FOR_USER: &str = "DELETE FROM sessions WHERE user_id = ?1";

pub async fn delete_sessions_for_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_SESSIONS_FOR_USER)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_EXPIRED_SESSIONS: &str = "DELETE FROM sessions WHERE expires_at <= ?1";

pub async fn delete_expired_sessions(pool: &SqlitePool, now: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_EXPIRED_SESSIONS)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
