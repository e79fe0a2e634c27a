use sqlx::SqlitePool;

const SQL_IS_FOLLOWING: &str = r#"
SELECT EXISTS (
  SELECT 1 FROM user_followings WHERE observer_id = ?1 AND target_id = ?2
)
"#;

pub async fn is_following(
    pool: &SqlitePool,
    observer_id: &str,
    target_id: &str,
) -> sqlx::Result<bool> {
    let found = sqlx::query_scalar::<_, i64>(SQL_IS_FOLLOWING)
        .bind(observer_id)
        .bind(target_id)
        .fetch_one(pool)
        .await?;
    Ok(found == 1)
}

const SQL_INSERT_FOLLOWING: &str =
    "INSERT INTO user_followings (observer_id, target_id) VALUES (?1, ?2)";

pub async fn insert_following(
    pool: &SqlitePool,
    observer_id: &str,
    target_id: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_FOLLOWING)
        .bind(observer_id)
        .bind(target_id)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_DELETE_FOLLOWING: &str =
    "DELETE FROM user_followings WHERE observer_id = ?1 AND target_id = ?2";

pub async fn delete_following(
    pool: &SqlitePool,
    observer_id: &str,
    target_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_FOLLOWING)
        .bind(observer_id)
        .bind(target_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
