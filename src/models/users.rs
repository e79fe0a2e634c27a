#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub id: String,
    pub email: String,
    pub user_name: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub password_hash: String,
    pub email_confirmed: i64,
    pub created_at: String,
}
