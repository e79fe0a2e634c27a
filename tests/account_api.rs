mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

use common::{extract_code, TestApp, PASSWORD};

async fn confirming_app() -> TestApp {
    TestApp::with_config(|config| config.require_confirmed_email = true).await
}

fn cookie_request(method: Method, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn weak_passwords_report_identity_codes() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/account/register",
            None,
            json!({ "displayName": "Bob", "email": "bob@test.com", "password": "abc" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors = &response.body["errors"];
    for code in [
        "PasswordTooShort",
        "PasswordRequiresNonAlphanumeric",
        "PasswordRequiresDigit",
        "PasswordRequiresUpper",
    ] {
        assert!(errors.get(code).is_some(), "missing {code}");
    }
    assert!(errors.get("PasswordRequiresLower").is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
    let app = TestApp::new().await;
    app.sign_up("Bob", "bob@test.com").await;

    let response = app.register("Bobby", "BOB@test.com").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["errors"].get("DuplicateEmail").is_some());
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = TestApp::new().await;
    app.sign_up("Bob", "bob@test.com").await;

    assert_eq!(
        app.login("bob@test.com", "Wr0ng!pass").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.login("nobody@test.com", PASSWORD).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn email_must_be_confirmed_before_login() {
    let app = confirming_app().await;
    assert_eq!(app.register("Bob", "bob@test.com").await.status, StatusCode::OK);

    assert_eq!(
        app.login("bob@test.com", PASSWORD).await.status,
        StatusCode::UNAUTHORIZED
    );

    let mail = app.mailer.last_to("bob@test.com").expect("confirmation mail");
    assert!(mail.html.contains("https://localhost:3000/confirm-email?userId="));
    let code = extract_code(&mail.html).unwrap();
    let start = mail.html.find("userId=").unwrap() + "userId=".len();
    let user_id: String = mail.html[start..]
        .chars()
        .take_while(|c| *c != '&')
        .collect();

    let wrong = app
        .request(
            Method::GET,
            &format!("/api/confirmEmail?userId={user_id}&code=nope"),
            None,
            None,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let confirmed = app
        .request(
            Method::GET,
            &format!("/api/confirmEmail?userId={user_id}&code={code}"),
            None,
            None,
        )
        .await;
    assert_eq!(confirmed.status, StatusCode::OK);
    assert_eq!(app.login("bob@test.com", PASSWORD).await.status, StatusCode::OK);
}

#[tokio::test]
async fn resend_only_mails_unconfirmed_accounts() {
    let app = confirming_app().await;
    app.register("Bob", "bob@test.com").await;
    assert_eq!(app.mailer.sent().len(), 1);

    let resend = app
        .post("/api/resendConfirmationEmail", None, json!({ "email": "bob@test.com" }))
        .await;
    assert_eq!(resend.status, StatusCode::OK);
    assert_eq!(app.mailer.sent().len(), 2);

    let unknown = app
        .post("/api/resendConfirmationEmail", None, json!({ "email": "x@test.com" }))
        .await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(app.mailer.sent().len(), 2);
}

#[tokio::test]
async fn cookie_session_lifecycle() {
    let app = TestApp::new().await;
    app.register("Bob", "bob@test.com").await;

    let login = app
        .post(
            "/api/login?useCookies=true",
            None,
            json!({ "email": "bob@test.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let set_cookie = login.headers[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    assert!(cookie.starts_with("access_token="));

    let info = app
        .send(cookie_request(Method::GET, "/api/account/user-info", &cookie))
        .await;
    assert_eq!(info.status, StatusCode::OK);
    assert_eq!(info.body["displayName"], "Bob");
    assert_eq!(info.body["email"], "bob@test.com");

    let logout = app
        .send(cookie_request(Method::POST, "/api/account/logout", &cookie))
        .await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);
    assert!(logout.headers[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let after = app
        .send(cookie_request(Method::GET, "/api/account/user-info", &cookie))
        .await;
    assert_eq!(after.status, StatusCode::NO_CONTENT);
    let protected = app
        .send(cookie_request(Method::GET, "/api/activities", &cookie))
        .await;
    assert_eq!(protected.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_checks_the_current_one() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("Bob", "bob@test.com").await;

    let wrong = app
        .post(
            "/api/account/change-password",
            Some(&token),
            json!({ "currentPassword": "Nope!123", "newPassword": "N3w!pass" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert!(wrong.body["errors"].get("PasswordMismatch").is_some());

    let changed = app
        .post(
            "/api/account/change-password",
            Some(&token),
            json!({ "currentPassword": PASSWORD, "newPassword": "N3w!pass" }),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);
    assert_eq!(app.login("bob@test.com", "N3w!pass").await.status, StatusCode::OK);
    assert_eq!(
        app.login("bob@test.com", PASSWORD).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn password_reset_uses_a_single_use_code() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("Bob", "bob@test.com").await;

    let unknown = app
        .post("/api/forgotPassword", None, json!({ "email": "x@test.com" }))
        .await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert!(app.mailer.sent().is_empty());

    app.post("/api/forgotPassword", None, json!({ "email": "bob@test.com" }))
        .await;
    let mail = app.mailer.last_to("bob@test.com").expect("reset mail");
    assert!(mail.html.contains("/resetPassword?email=bob%40test.com"));
    let code = extract_code(&mail.html).unwrap();

    let reset_body = json!({
        "email": "bob@test.com",
        "resetCode": code,
        "newPassword": "R3set!pw"
    });
    let reset = app.post("/api/resetPassword", None, reset_body.clone()).await;
    assert_eq!(reset.status, StatusCode::OK);
    assert_eq!(app.login("bob@test.com", "R3set!pw").await.status, StatusCode::OK);

    let reused = app.post("/api/resetPassword", None, reset_body).await;
    assert_eq!(reused.status, StatusCode::BAD_REQUEST);
    assert!(reused.body["errors"].get("InvalidToken").is_some());

    let old_session = app.get("/api/activities", &token).await;
    assert_eq!(old_session.status, StatusCode::UNAUTHORIZED);
}
