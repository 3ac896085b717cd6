//! Shared helpers for the API integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use mutuelle_api::auth::jwt::{generate_access_token, JwtConfig};
use mutuelle_api::auth::password::hash_password;
use mutuelle_api::config::ServerConfig;
use mutuelle_api::documents::{DocumentService, HtmlRenderer};
use mutuelle_api::router::build_app_router;
use mutuelle_api::state::AppState;
use mutuelle_core::cotisation::WindowRule;
use mutuelle_db::models::user::{CreateUser, User};
use mutuelle_db::repositories::UserRepo;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "motdepasse-test";

/// A `ServerConfig` with test defaults, writing documents under `media`.
pub fn test_config(media: &Path) -> ServerConfig {
    ServerConfig {
        database_url: String::new(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        media_root: media.join("media"),
        receipts_dir: media.join("recu_pdfs"),
        window_rule: WindowRule::CalendarMonth,
        jwt: test_jwt_config(),
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 7,
    }
}

/// The production router over `pool`, with documents written to a fresh
/// directory under the system temp dir.
pub fn build_test_app(pool: PgPool) -> Router {
    let media = std::env::temp_dir().join(format!("mutuelle-test-{}", uuid::Uuid::new_v4()));
    build_test_app_in(pool, &media)
}

/// The production router over `pool`, with documents written under `media`.
pub fn build_test_app_in(pool: PgPool, media: &Path) -> Router {
    let config = test_config(media);
    let documents = DocumentService::new(
        Arc::new(HtmlRenderer),
        config.media_root.clone(),
        config.receipts_dir.clone(),
    );
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        documents: Arc::new(documents),
    };
    build_app_router(state, &config)
}

/// Insert a staff user with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, username: &str) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@mutuelle.test"),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
    };
    UserRepo::create(pool, &input).await.unwrap()
}

/// Insert a staff user and sign an access token for it.
pub async fn auth_token(pool: &PgPool) -> String {
    let user = create_user(pool, "agent").await;
    generate_access_token(user.id, &user.username, &test_jwt_config()).unwrap()
}

/// A valid member payload for `POST /api/v1/adherents`.
pub fn adherent_body(cin: &str, a_droit: &str) -> serde_json::Value {
    serde_json::json!({
        "nom": "Bennani",
        "prenom": "Karim",
        "date_naissance": "1980-05-14",
        "cin": cin,
        "sexe": "homme",
        "date_recrutement": "2005-03-01",
        "statut": "actif",
        "a_droit": a_droit,
        "numero_tel": "0612345678",
        "rib": "011780000012345678901234",
        "ville": "Casablanca",
        "adresse": "12 rue du Port",
        "salaire": "8500.00",
        "organisme_employeur": "anp",
        "section_cotisation": "anp"
    })
}

/// Create a member through the API and return its JSON.
pub async fn create_adherent(app: Router, token: &str, cin: &str, a_droit: &str) -> serde_json::Value {
    let response = post_json_auth(app, "/api/v1/adherents", adherent_body(cin, a_droit), token).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some(token)).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
