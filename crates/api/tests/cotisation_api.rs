//! HTTP-level tests for `/api/v1/cotisations`.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_adherent, delete_auth, get_auth, patch_json_auth, post_json_auth};
use serde_json::{json, Value};
use sqlx::PgPool;

/// The cotisation opened for a member at creation.
async fn cotisation_of(app: axum::Router, token: &str, cin: &str) -> Value {
    let list = body_json(get_auth(app, &format!("/api/v1/cotisations?cin={cin}"), token).await).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1, "expected one cotisation for {cin}");
    list[0].clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_detail_embeds_member_fields(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);

    let member = create_adherent(app.clone(), &token, "CO1", "ayant_droit").await;
    let cotisation = cotisation_of(app.clone(), &token, "CO1").await;
    let id = cotisation["id"].as_i64().unwrap();

    let response = get_auth(app, &format!("/api/v1/cotisations/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["nom"], "Bennani");
    assert_eq!(detail["prenom"], "Karim");
    assert_eq!(detail["nax"], member["nax"]);
    assert_eq!(detail["rib"], member["rib"]);
    assert_eq!(detail["date_recrutement"], "2005-03-01");
    assert_eq!(detail["a_droit"], "ayant_droit");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivation_revokes_member_rights(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);

    let member = create_adherent(app.clone(), &token, "CO2", "ayant_droit").await;
    let cotisation = cotisation_of(app.clone(), &token, "CO2").await;
    let id = cotisation["id"].as_i64().unwrap();

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/cotisations/{id}"),
        json!({ "cotisation": "non" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["cotisation"], "non");
    assert_eq!(detail["a_droit"], "sans_droit");
    assert_eq!(detail["date_debut"], cotisation["date_debut"]);

    let member_id = member["id"].as_i64().unwrap();
    let reloaded =
        body_json(get_auth(app, &format!("/api/v1/adherents/{member_id}"), &token).await).await;
    assert_eq!(reloaded["a_droit"], "sans_droit");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activation_recomputes_window_and_grants_rights(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);

    create_adherent(app.clone(), &token, "CO3", "sans_droit").await;
    let cotisation = cotisation_of(app.clone(), &token, "CO3").await;
    assert_eq!(cotisation["cotisation"], "non");
    let id = cotisation["id"].as_i64().unwrap();

    let response = patch_json_auth(
        app,
        &format!("/api/v1/cotisations/{id}"),
        json!({ "cotisation": "oui", "date_debut": "2024-01-31", "date_fin": "2030-01-01" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["cotisation"], "oui");
    assert_eq!(detail["date_debut"], "2024-01-31");
    assert_eq!(detail["date_fin"], "2024-02-29");
    assert_eq!(detail["a_droit"], "ayant_droit");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_null_date_debut_clears_window(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);

    create_adherent(app.clone(), &token, "CO4", "ayant_droit").await;
    let id = cotisation_of(app.clone(), &token, "CO4").await["id"]
        .as_i64()
        .unwrap();

    let response = patch_json_auth(
        app,
        &format!("/api/v1/cotisations/{id}"),
        json!({ "date_debut": null }),
        &token,
    )
    .await;
    let detail = body_json(response).await;
    assert!(detail["date_debut"].is_null());
    assert!(detail["date_fin"].is_null());
    assert_eq!(detail["cotisation"], "oui");
    assert_eq!(detail["a_droit"], "ayant_droit");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_explicit_creation(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);

    let member = create_adherent(app.clone(), &token, "CO5", "sans_droit").await;
    let member_id = member["id"].as_i64().unwrap();
    let body = json!({ "adherent_id": member_id, "cotisation": "oui", "date_debut": "2024-03-15" });

    // The member already has one.
    let response =
        post_json_auth(app.clone(), "/api/v1/cotisations", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let existing = cotisation_of(app.clone(), &token, "CO5").await["id"]
        .as_i64()
        .unwrap();
    let response =
        delete_auth(app.clone(), &format!("/api/v1/cotisations/{existing}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json_auth(app.clone(), "/api/v1/cotisations", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let detail = body_json(response).await;
    assert_eq!(detail["cin"], "CO5");
    assert_eq!(detail["date_fin"], "2024-04-15");
    assert_eq!(detail["a_droit"], "sans_droit", "explicit creation leaves the member alone");

    let response = post_json_auth(
        app,
        "/api/v1/cotisations",
        json!({ "adherent_id": 9999, "cotisation": "oui", "date_debut": null }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);

    let first = create_adherent(app.clone(), &token, "FLT-A", "ayant_droit").await;
    create_adherent(app.clone(), &token, "FLT-B", "sans_droit").await;

    let list = |uri: &'static str| {
        let app = app.clone();
        let token = token.clone();
        async move { body_json(get_auth(app, uri, &token).await).await }
    };

    assert_eq!(list("/api/v1/cotisations?cin=flt").await.as_array().unwrap().len(), 2);
    assert_eq!(list("/api/v1/cotisations?cotisation=OUI").await.as_array().unwrap().len(), 1);
    assert_eq!(list("/api/v1/cotisations?cotisation=maybe").await.as_array().unwrap().len(), 2);
    assert!(list("/api/v1/cotisations?nax=12ab").await.as_array().unwrap().is_empty());

    let nax = first["nax"].as_str().unwrap().to_string();
    let by_nax = body_json(
        get_auth(app.clone(), &format!("/api/v1/cotisations?nax={nax}"), &token).await,
    )
    .await;
    assert_eq!(by_nax.as_array().unwrap().len(), 1);
    assert_eq!(by_nax[0]["cin"], "FLT-A");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_cotisation_returns_404(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/cotisations/9999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = patch_json_auth(
        app.clone(),
        "/api/v1/cotisations/9999",
        json!({ "cotisation": "oui" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, "/api/v1/cotisations/9999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
