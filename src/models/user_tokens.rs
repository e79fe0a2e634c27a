#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserTokensRow {
    pub token: String,
    pub user_id: String,
    pub purpose: String,
    pub expires_at: String,
}
