// Comment joined with its author.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentsRow {
    pub id: String,
    pub body: String,
    pub created_at: String,
    pub user_id: String,
    pub display_name: Option<String>,
    pub image_url: Option<String>,
}
