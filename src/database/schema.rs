use sqlx::SqlitePool;
use tracing::info;

const SQL_CREATE_TABLES: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS users (
  id TEXT PRIMARY KEY,
  email TEXT NOT NULL UNIQUE COLLATE NOCASE,
  user_name TEXT NOT NULL,
  display_name TEXT,
  bio TEXT,
  image_url TEXT,
  password_hash TEXT NOT NULL,
  email_confirmed INTEGER NOT NULL DEFAULT 0,
  created_at TEXT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS activities (
  id TEXT PRIMARY KEY,
  title TEXT NOT NULL,
  date TEXT NOT NULL,
  description TEXT NOT NULL,
  category TEXT NOT NULL,
  is_cancelled INTEGER NOT NULL DEFAULT 0,
  city TEXT NOT NULL,
  venue TEXT NOT NULL,
  latitude REAL NOT NULL,
  longitude REAL NOT NULL
)
"#,
    "CREATE INDEX IF NOT EXISTS ix_activities_date ON activities (date)",
    r#"
CREATE TABLE IF NOT EXISTS activity_attendees (
  activity_id TEXT NOT NULL REFERENCES activities (id) ON DELETE CASCADE,
  user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
  is_host INTEGER NOT NULL DEFAULT 0,
  date_joined TEXT NOT NULL,
  PRIMARY KEY (activity_id, user_id)
)
"#,
    "CREATE INDEX IF NOT EXISTS ix_activity_attendees_user ON activity_attendees (user_id)",
    r#"
CREATE TABLE IF NOT EXISTS photos (
  id TEXT PRIMARY KEY,
  url TEXT NOT NULL,
  public_id TEXT NOT NULL,
  user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS comments (
  id TEXT PRIMARY KEY,
  body TEXT NOT NULL,
  created_at TEXT NOT NULL,
  user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
  activity_id TEXT NOT NULL REFERENCES activities (id) ON DELETE CASCADE
)
"#,
    "CREATE INDEX IF NOT EXISTS ix_comments_activity ON comments (activity_id, created_at)",
    r#"
CREATE TABLE IF NOT EXISTS user_followings (
  observer_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
  target_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
  PRIMARY KEY (observer_id, target_id)
)
"#,
    "CREATE INDEX IF NOT EXISTS ix_user_followings_target ON user_followings (target_id)",
    r#"
CREATE TABLE IF NOT EXISTS sessions (
  token TEXT PRIMARY KEY,
  user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
  created_at TEXT NOT NULL,
  expires_at TEXT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS user_tokens (
  token TEXT PRIMARY KEY,
  user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
  purpose TEXT NOT NULL,
  expires_at TEXT NOT NULL
)
"#,
];

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for statement in SQL_CREATE_TABLES {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(tables = SQL_CREATE_TABLES.len(), "database schema ensured");
    Ok(())
}
