#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserProfilesRow {
    pub id: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub following: i64,
}
