#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivitiesRow {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub category: String,
    pub is_cancelled: i64,
    pub city: String,
    pub venue: String,
    pub latitude: f64,
    pub longitude: f64,
}

// Slim projection for a profile's activity tab.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserActivityRow {
    pub id: String,
    pub title: String,
    pub category: String,
    pub date: String,
}
