#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PhotosRow {
    pub id: String,
    pub url: String,
    pub public_id: String,
    pub user_id: String,
}
