use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reactivities::config::AppConfig;
use reactivities::database::{self, schema, seed, sessions_repo, timestamps};
use reactivities::error::expose_error_details;
use reactivities::services::password_service;
use reactivities::state::AppState;
use reactivities::web::build_router;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reactivities=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().expect("invalid configuration");
    expose_error_details(config.environment.is_development());
    info!(database_url = %config.database_url, environment = ?config.environment, "starting");

    let pool = database::connect(&config.database_url)
        .await
        .expect("cannot connect to database");
    schema::ensure_schema(&pool)
        .await
        .expect("cannot create database schema");

    if config.seed_database {
        let hash = password_service::hash_password(seed::SEED_PASSWORD)
            .await
            .expect("cannot hash seed password");
        match seed::seed_data(&pool, &hash).await {
            Ok(report) => info!(
                users = report.users_created,
                activities = report.activities_created,
                "database seeded"
            ),
            Err(e) => warn!(error = %e, "seeding failed"),
        }
    }

    match sessions_repo::delete_expired_sessions(&pool, &timestamps::now()).await {
        Ok(0) => {}
        Ok(n) => info!(removed = n, "expired sessions purged"),
        Err(e) => warn!(error = %e, "session purge failed"),
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.upload_dir).await {
        warn!(dir = %config.upload_dir.display(), error = %e, "cannot create upload dir");
    }

    let host = config.host.clone();
    let port = config.port;
    let app = build_router(AppState::new(pool, config));

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback_port = port.saturating_add(1);
            warn!(%addr, error = %e, fallback_port, "bind failed, trying fallback port");
            let fallback: SocketAddr = format!("{}:{}", host, fallback_port)
                .parse()
                .expect("cannot parse fallback host/port");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("cannot bind fallback port")
        }
    };

    let bound_addr = listener.local_addr().expect("listener has no local address");
    info!("listening on http://{}", bound_addr);

    axum::serve(listener, app).await.expect("server error");
}
