use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::services::comment_hub::CommentHub;
use crate::services::email_service::{EmailSender, LogEmailSender};
use crate::services::photo_store::{LocalPhotoStore, PhotoStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub hub: Arc<CommentHub>,
    pub photos: Arc<dyn PhotoStore>,
    pub mailer: Arc<dyn EmailSender>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Local photo storage under the configured upload dir and log-only mail.
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        let photos = LocalPhotoStore::new(config.upload_dir.clone(), "/uploads");
        Self {
            pool,
            config: Arc::new(config),
            hub: Arc::new(CommentHub::new()),
            photos: Arc::new(photos),
            mailer: Arc::new(LogEmailSender),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn EmailSender>) -> Self {
        self.mailer = mailer;
        self
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
