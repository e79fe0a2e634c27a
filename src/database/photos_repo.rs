use sqlx::SqlitePool;

use crate::models::PhotosRow;

const SQL_INSERT_PHOTO: &str = r#"
INSERT INTO photos (id, url, public_id, user_id)
VALUES (?1, ?2, ?3, ?4)
"#;

pub async fn insert_photo(pool: &SqlitePool, photo: &PhotosRow) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_PHOTO)
        .bind(&photo.id)
        .bind(&photo.url)
        .bind(&photo.public_id)
        .bind(&photo.user_id)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LIST_PHOTOS_FOR_USER: &str = r#"
SELECT id, url, public_id, user_id
FROM photos
WHERE user_id = ?1
ORDER BY rowid ASC
"#;

pub async fn list_photos_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<PhotosRow>> {
    sqlx::query_as::<_, PhotosRow>(SQL_LIST_PHOTOS_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

const SQL_FIND_PHOTO_FOR_USER: &str = r#"
SELECT id, url, public_id, user_id
FROM photos
WHERE id = ?1 AND user_id = ?2
LIMIT 1
"#;

pub async fn find_photo_for_user(
    pool: &SqlitePool,
    photo_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<PhotosRow>> {
    sqlx::query_as::<_, PhotosRow>(SQL_FIND_PHOTO_FOR_USER)
        .bind(photo_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_DELETE_PHOTO: &str = "DELETE FROM photos WHERE id = ?1";

pub async fn delete_photo(pool: &SqlitePool, photo_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_PHOTO)
        .bind(photo_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
