#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Url;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use reactivities::config::AppConfig;
use reactivities::database::{self, schema};
use reactivities::services::email_service::{EmailError, EmailMessage, EmailSender};
use reactivities::state::AppState;
use reactivities::web::build_router;

pub const PASSWORD: &str = "Pa$$w0rd";

/// Keeps every outgoing message so tests can read links back.
#[derive(Debug, Default)]
pub struct MemoryEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl MemoryEmailSender {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<EmailMessage> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.to.eq_ignore_ascii_case(to))
    }
}

#[async_trait]
impl EmailSender for MemoryEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// The `code` query parameter of the first link in an email body.
pub fn extract_code(html: &str) -> Option<String> {
    let start = html.find("href=\"")? + "href=\"".len();
    let end = html[start..].find('"')? + start;
    let url = Url::parse(&html[start..end]).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<MemoryEmailSender>,
    pub uploads: TempDir,
}

pub struct Response {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Email confirmation is off unless `configure` turns it back on.
    pub async fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let mut config = AppConfig {
            require_confirmed_email: false,
            upload_dir: uploads.path().to_path_buf(),
            static_dir: uploads.path().join("wwwroot"),
            client_app_url: "https://localhost:3000".to_string(),
            ..AppConfig::default()
        };
        configure(&mut config);

        let pool = database::connect_in_memory().await.unwrap();
        schema::ensure_schema(&pool).await.unwrap();

        let mailer = Arc::new(MemoryEmailSender::default());
        let state = AppState::new(pool, config).with_mailer(mailer.clone());
        let router = build_router(state.clone());

        Self {
            router,
            state,
            mailer,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Response {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, display_name: &str, email: &str) -> Response {
        self.post(
            "/api/account/register",
            None,
            json!({ "displayName": display_name, "email": email, "password": PASSWORD }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post(
            "/api/login",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Registers and logs in; returns `(bearer token, user id)`.
    pub async fn sign_up(&self, display_name: &str, email: &str) -> (String, String) {
        let registered = self.register(display_name, email).await;
        assert_eq!(registered.status, StatusCode::OK, "{:?}", registered.body);

        let login = self.login(email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);
        let token = login.body["accessToken"].as_str().unwrap().to_string();

        let info = self.get("/api/account/user-info", &token).await;
        let id = info.body["id"].as_str().unwrap().to_string();
        (token, id)
    }

    /// Creates an activity `days_ahead` days from now; returns its id.
    pub async fn create_activity(&self, token: &str, title: &str, days_ahead: i64) -> String {
        let response = self
            .post("/api/activities", Some(token), activity_body(title, days_ahead))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body.as_str().unwrap().to_string()
    }
}

pub fn activity_body(title: &str, days_ahead: i64) -> Value {
    json!({
        "title": title,
        "date": (Utc::now() + Duration::days(days_ahead)).to_rfc3339(),
        "description": "Activity description",
        "category": "drinks",
        "city": "London",
        "venue": "Pub",
        "latitude": 51.5073,
        "longitude": -0.1277
    })
}
