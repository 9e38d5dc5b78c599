//! Session extractor behavior against a live actix test app.

use actix_web::{App, HttpResponse, test, web};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::SecretString;

use buildboard::auth::{MaybeSession, SessionAuth};
use buildboard::config::{Config, Environment, GitHubOAuthSettings, defaults};
use buildboard::models::{SessionClaims, UserRole};
use buildboard::services::github_oauth::SESSION_ISSUER;

fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: defaults::DEV_HOST.to_string(),
        port: defaults::DEV_PORT,
        database_url: defaults::DEV_DATABASE_URL.to_string(),
        github_oauth: GitHubOAuthSettings {
            enabled: true,
            client_id: Some("Iv1.test".to_string()),
            client_secret: Some(SecretString::from("secret".to_string())),
            redirect_url: None,
            frontend_url: defaults::DEV_FRONTEND_URL.to_string(),
            session_secret: SecretString::from("integration-test-secret".to_string()),
            access_token_ttl_secs: defaults::DEV_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: defaults::DEV_REFRESH_TOKEN_TTL_SECS,
        },
    }
}

fn forge_token(secret: &str, role: UserRole) -> String {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: "8f7e1fae-0000-0000-0000-000000000001".to_string(),
        iss: SESSION_ISSUER.to_string(),
        exp: (now + 900) as usize,
        iat: now as usize,
        user_id: "8f7e1fae-0000-0000-0000-000000000001".to_string(),
        github_id: 777,
        username: "kim".to_string(),
        role,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn whoami(auth: SessionAuth) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "username": auth.user.username,
        "role": auth.user.role,
    }))
}

async fn maybe(session: MaybeSession) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "logged_in": session.0.is_some(),
    }))
}

#[actix_web::test]
async fn session_route_rejects_anonymous_requests() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = test::TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn session_route_accepts_valid_cookie() {
    let config = test_config();
    let token = forge_token("integration-test-secret", UserRole::Contributor);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(config))
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Cookie", format!("bb_session={}", token)))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["username"], "kim");
    assert_eq!(body["role"], "contributor");
}

#[actix_web::test]
async fn session_route_rejects_token_signed_with_wrong_secret() {
    let token = forge_token("some-other-secret", UserRole::Admin);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Cookie", format!("bb_session={}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn optional_session_degrades_to_anonymous() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .route("/maybe", web::get().to(maybe)),
    )
    .await;

    // No cookie: anonymous, not an error
    let req = test::TestRequest::get().uri("/maybe").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["logged_in"], false);

    // Garbage cookie: still anonymous
    let req = test::TestRequest::get()
        .uri("/maybe")
        .insert_header(("Cookie", "bb_session=not-a-jwt"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["logged_in"], false);

    // Valid cookie: recognized
    let token = forge_token("integration-test-secret", UserRole::Admin);
    let req = test::TestRequest::get()
        .uri("/maybe")
        .insert_header(("Cookie", format!("bb_session={}", token)))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["logged_in"], true);
}
