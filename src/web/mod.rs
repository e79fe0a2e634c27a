pub mod middleware;
pub mod routes;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use http::header::{self, HeaderValue, CACHE_CONTROL};
use http::{Method, StatusCode};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;
use middleware::{auth::require_auth, host::require_host};
use routes::{account, activities, comments, identity, location, profiles};

const MAX_PHOTO_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn api_router(state: &AppState) -> Router<AppState> {
    let host_only = axum_middleware::from_fn_with_state(state.clone(), require_host);

    let protected = Router::new()
        .route(
            "/activities",
            get(activities::list_activities_handler).post(activities::create_activity_handler),
        )
        .route(
            "/activities/:id",
            get(activities::activity_detail_handler).merge(
                put(activities::edit_activity_handler)
                    .delete(activities::delete_activity_handler)
                    .route_layer(host_only),
            ),
        )
        .route(
            "/activities/:id/attend",
            post(activities::attend_activity_handler),
        )
        .route("/profiles", put(profiles::edit_profile_handler))
        .route(
            "/profiles/add-photo",
            post(profiles::add_photo_handler).layer(DefaultBodyLimit::max(MAX_PHOTO_UPLOAD_BYTES)),
        )
        .route("/profiles/:id", get(profiles::profile_handler))
        .route(
            "/profiles/:id/photos",
            get(profiles::photos_handler).delete(profiles::delete_photo_handler),
        )
        .route("/profiles/:id/setMain", put(profiles::set_main_photo_handler))
        .route("/profiles/:id/follow", post(profiles::follow_handler))
        .route("/profiles/:id/follow-list", get(profiles::follow_list_handler))
        .route(
            "/profiles/:id/activities",
            get(profiles::user_activities_handler),
        )
        .route("/account/logout", post(account::logout_handler))
        .route(
            "/account/change-password",
            post(account::change_password_handler),
        )
        .route("/location/search", get(location::search_locations))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let anonymous = Router::new()
        .route("/account/register", post(account::register_handler))
        .route("/account/user-info", get(account::user_info_handler))
        .route("/login", post(identity::login_handler))
        .route("/confirmEmail", get(identity::confirm_email_handler))
        .route(
            "/resendConfirmationEmail",
            post(identity::resend_confirmation_handler),
        )
        .route("/forgotPassword", post(identity::forgot_password_handler))
        .route("/resetPassword", post(identity::reset_password_handler));

    protected
        .merge(anonymous)
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

fn cors_layer(client_app_url: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);
    match HeaderValue::from_str(client_app_url) {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            warn!(client_app_url, error = %e, "client app url is not a valid origin; CORS disabled");
            base
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let hub = Router::new()
        .route("/comments", get(comments::comments_hub_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let static_dir = state.config.static_dir.clone();
    let spa = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api_router(&state))
        .merge(hub)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .fallback_service(spa)
        .layer(cors_layer(&state.config.client_app_url))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
