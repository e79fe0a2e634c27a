mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn location_search_needs_two_characters() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("Bob", "bob@test.com").await;

    let response = app.get("/api/location/search?q=a", &token).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!([]));

    let missing = app.get("/api/location/search", &token).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn location_search_without_api_key_is_a_bad_gateway() {
    let app = TestApp::new().await;
    assert!(app.state.config.location_api_key.is_none());
    let (token, _) = app.sign_up("Bob", "bob@test.com").await;

    let response = app.get("/api/location/search?q=london", &token).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn client_routes_fall_back_to_index_html() {
    let app = TestApp::new().await;
    let static_dir = app.state.config.static_dir.clone();
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<html>spa</html>").unwrap();
    std::fs::write(static_dir.join("app.js"), "console.log(1)").unwrap();

    let deep_link = app
        .request(Method::GET, "/activities/some-id", None, None)
        .await;
    assert_eq!(deep_link.status, StatusCode::OK);
    assert_eq!(deep_link.body, json!("<html>spa</html>"));

    let asset = app.request(Method::GET, "/app.js", None, None).await;
    assert_eq!(asset.status, StatusCode::OK);
    assert_eq!(asset.body, json!("console.log(1)"));
}

#[tokio::test]
async fn unknown_api_paths_are_not_served_the_client_app() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/nothing-here", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
