//! HTTP-level tests for signup, login, token refresh, logout and `/me`.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_auth, post_json, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

async fn login(app: axum::Router, username: &str, password: &str) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": username, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_returns_tokens_and_user(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "username": "fatima",
        "email": "fatima@mutuelle.ma",
        "password": "long-enough",
        "first_name": "Fatima",
    });

    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["message"].is_string());
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 900);
    assert_eq!(json["user"]["username"], "fatima");
    assert_eq!(json["user"]["first_name"], "Fatima");
    assert_eq!(json["user"]["last_name"], "");
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "username": "short", "email": "s@mutuelle.ma", "password": "1234567" });

    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_duplicate_username_conflicts(pool: PgPool) {
    common::create_user(&pool, "taken").await;
    let app = common::build_test_app(pool);
    let body = json!({ "username": "taken", "email": "other@mutuelle.ma", "password": "long-enough" });

    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success_records_last_login(pool: PgPool) {
    let user = common::create_user(&pool, "agent").await;
    assert!(user.last_login_at.is_none());
    let app = common::build_test_app(pool.clone());

    let response = login(app, "agent", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], user.id);

    let reloaded = mutuelle_db::repositories::UserRepo::find_by_id(&pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.last_login_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password_or_unknown_user(pool: PgPool) {
    common::create_user(&pool, "agent").await;
    let app = common::build_test_app(pool);

    let response = login(app.clone(), "agent", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login(app, "nobody", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_inactive_user_forbidden(pool: PgPool) {
    let user = common::create_user(&pool, "gone").await;
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let response = login(app, "gone", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Refresh / logout / me
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_token(pool: PgPool) {
    common::create_user(&pool, "agent").await;
    let app = common::build_test_app(pool);

    let first = body_json(login(app.clone(), "agent", TEST_PASSWORD).await).await;
    let old_refresh = first["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": old_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_ne!(second["refresh_token"], first["refresh_token"]);

    // The old refresh token is single-use.
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": old_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_refresh_tokens(pool: PgPool) {
    common::create_user(&pool, "agent").await;
    let app = common::build_test_app(pool);

    let json = body_json(login(app.clone(), "agent", TEST_PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let response = post_auth(app.clone(), "/api/v1/auth/logout", access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app.clone(), "/api/v1/auth/me", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["username"], "agent");
}
