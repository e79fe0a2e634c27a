#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityAttendeesRow {
    pub activity_id: String,
    pub user_id: String,
    pub is_host: i64,
    pub date_joined: String,
}

/// Attendee joined with the user's public profile; `following` is relative to
/// the user the query was run for.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendeeProfileRow {
    pub activity_id: String,
    pub is_host: i64,
    pub user_id: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub following: i64,
}
