#![cfg(feature = "test-utils")]
//! Integration tests for the site content API.
//!
//! Tests:
//! - Settings, contact, catalog, schedule and testimonial routes end to end
//! - Validation errors answer 400 with a JSON `{error}` body
//! - Backend failures answer 500 with the route's generic message
//! - Privileged routes without the service-role key
mod support;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use jonco_core::api::CONFIG_MISSING;
use jonco_core::site::memory::MemorySiteRepository;
use serde_json::json;

use crate::support::TestApp;

#[tokio::test]
async fn test_configuracion_lifecycle() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/configuracion",
            json!({ "clave": "hero_title", "valor": "Delta" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clave"], "hero_title");
    assert_eq!(body["descripcion"], "");

    let (status, body) = app
        .json(
            Method::PUT,
            "/api/configuracion",
            json!({ "clave": "about_text", "valor": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valor"], "");
    assert!(body["updated_at"].is_string());

    let (status, body) = app
        .json(
            Method::PUT,
            "/api/configuracion",
            json!({ "clave": "hero_title", "valor": "Tigre" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valor"], "Tigre");

    let (status, body) = app.get("/api/configuracion").await;
    assert_eq!(status, StatusCode::OK);
    let claves: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["clave"].as_str().unwrap())
        .collect();
    assert_eq!(claves, vec!["about_text", "hero_title"]);

    let (status, body) = app
        .json(
            Method::DELETE,
            "/api/configuracion",
            json!({ "clave": "about_text" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = app.get("/api/configuracion").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_configuracion_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .json(Method::PUT, "/api/configuracion", json!({ "clave": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "clave and valor are required" }));

    let (status, body) = app
        .json(
            Method::POST,
            "/api/configuracion",
            json!({ "clave": "", "valor": "v" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "clave and valor are required" }));

    let (status, body) = app
        .json(Method::DELETE, "/api/configuracion", json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "clave is required" }));
}

#[tokio::test]
async fn test_duplicate_config_key_is_a_backend_error() {
    let app = TestApp::new();
    let entry = json!({ "clave": "hero_title", "valor": "Delta" });

    let (status, _) = app.json(Method::POST, "/api/configuracion", entry.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.json(Method::POST, "/api/configuracion", entry).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to create configuracion" }));
}

#[tokio::test]
async fn test_contacto_merges_by_key() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::PUT,
            "/api/contacto",
            json!({ "telefono": "5491140765354", "email": "a@b.c" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    app.json(
        Method::PUT,
        "/api/contacto",
        json!({ "email": "expediciones@jonco.com.ar" }),
    )
    .await;

    let (status, body) = app.get("/api/contacto").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "email": "expediciones@jonco.com.ar", "telefono": "5491140765354" })
    );

    let (status, body) = app
        .json(Method::PUT, "/api/contacto", json!({ "telefono": 123 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_expediciones_lifecycle() {
    let app = TestApp::new();
    app.repo.seed_expedicion("Retirada", Some(1.0), 0);

    let (status, created) = app
        .json(
            Method::POST,
            "/api/expediciones",
            json!({
                "title": "Kayak Nocturno",
                "category": "Agua",
                "description": "Remada bajo las estrellas",
                "price": 45000,
                "image": "https://cdn/kayak.webp"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Kayak Nocturno");
    assert_eq!(created["gallery"], "");
    assert_eq!(created["activo"], 1);
    let id = created["id"].as_i64().unwrap();

    let (status, list) = app.get("/api/expediciones").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Kayak Nocturno"]);

    let (status, updated) = app
        .json(
            Method::PUT,
            "/api/expediciones",
            json!({ "id": id, "title": "Kayak Nocturno", "price": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], serde_json::Value::Null);
    assert_eq!(updated["activo"], 1);

    let (status, _) = app
        .json(
            Method::PUT,
            "/api/expediciones",
            json!({ "id": id, "title": "Kayak Nocturno", "activo": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = app.get("/api/expediciones").await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, body) = app
        .json(Method::DELETE, "/api/expediciones", json!({ "id": id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn test_expediciones_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .json(Method::POST, "/api/expediciones", json!({ "title": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "title is required" }));

    let (status, body) = app
        .json(
            Method::POST,
            "/api/expediciones",
            json!({ "title": "Delta", "price": -1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "price must be a non-negative number" }));

    let (status, body) = app
        .json(Method::PUT, "/api/expediciones", json!({ "title": "Delta" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "id is required" }));

    let (status, body) = app
        .json(
            Method::PUT,
            "/api/expediciones",
            json!({ "id": 999, "title": "Delta" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_partial_update_keeps_missing_columns() {
    let app = TestApp::new();

    let (_, created) = app
        .json(
            Method::POST,
            "/api/expediciones",
            json!({
                "title": "Delta",
                "category": "Agua",
                "description": "Remada por los canales",
                "price": 30000,
                "image": "https://cdn/delta.webp",
                "gallery": "https://cdn/a.webp"
            }),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .json(
            Method::PUT,
            "/api/expediciones",
            json!({ "id": id, "title": "Delta del Paraná" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Delta del Paraná");
    assert_eq!(updated["category"], "Agua");
    assert_eq!(updated["description"], "Remada por los canales");
    assert_eq!(updated["image"], "https://cdn/delta.webp");
    // These three always get written.
    assert_eq!(updated["price"], serde_json::Value::Null);
    assert_eq!(updated["gallery"], "");
    assert_eq!(updated["activo"], 1);

    let (_, horario) = app
        .json(
            Method::POST,
            "/api/horarios",
            json!({
                "expedicion_id": id,
                "dias": "Sábados",
                "hora_salida": "08:00",
                "hora_regreso": "13:00",
                "cupos": 12
            }),
        )
        .await;
    assert_eq!(horario["cupos"], 12);

    let (status, updated) = app
        .json(
            Method::PUT,
            "/api/horarios",
            json!({
                "id": horario["id"],
                "expedicion_id": id,
                "dias": "Domingos",
                "hora_salida": "08:00",
                "hora_regreso": "13:00"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["dias"], "Domingos");
    assert_eq!(updated["cupos"], 12);

    let (status, body) = app
        .json(
            Method::PUT,
            "/api/horarios",
            json!({
                "id": horario["id"],
                "expedicion_id": id,
                "dias": "Domingos",
                "hora_salida": "08:00",
                "hora_regreso": "13:00",
                "cupos": -1
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "cupos must not be negative" }));
}

#[tokio::test]
async fn test_horarios_join_title_and_filter() {
    let app = TestApp::new();
    let delta = app.repo.seed_expedicion("Delta", Some(1000.0), 1);
    let kayak = app.repo.seed_expedicion("Kayak", Some(2000.0), 1);

    let (status, created) = app
        .json(
            Method::POST,
            "/api/horarios",
            json!({
                "expedicion_id": kayak.id,
                "dias": "Sábados",
                "hora_salida": "20:00",
                "hora_regreso": "23:00"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["cupos"], 6);
    assert_eq!(created["expedicion_title"], "Kayak");

    app.json(
        Method::POST,
        "/api/horarios",
        json!({
            "expedicion_id": delta.id,
            "dias": "Domingos",
            "hora_salida": "07:00",
            "hora_regreso": "12:00",
            "cupos": 10
        }),
    )
    .await;

    let (status, list) = app.get("/api/horarios").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["expedicion_title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Delta", "Kayak"]);

    let (_, filtered) = app
        .get(&format!("/api/horarios?expedicion_id={}", kayak.id))
        .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["dias"], "Sábados");

    let (status, body) = app.get("/api/horarios?expedicion_id=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let id = created["id"].as_i64().unwrap();
    let (status, updated) = app
        .json(
            Method::PUT,
            "/api/horarios",
            json!({
                "id": id,
                "expedicion_id": kayak.id,
                "dias": "Viernes",
                "hora_salida": "21:00",
                "hora_regreso": "23:30",
                "cupos": 4
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["dias"], "Viernes");
    assert_eq!(updated["activo"], 1);

    let (status, _) = app
        .json(Method::DELETE, "/api/horarios", json!({ "id": id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = app.get("/api/horarios").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_horarios_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/horarios",
            json!({
                "expedicion_id": 1,
                "dias": "Lunes",
                "hora_salida": "",
                "hora_regreso": "10:00"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "dias, hora_salida and hora_regreso are required" })
    );

    let (status, body) = app
        .json(
            Method::POST,
            "/api/horarios",
            json!({
                "expedicion_id": 1,
                "dias": "Lunes",
                "hora_salida": "08:00",
                "hora_regreso": "10:00",
                "cupos": -2
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "cupos must not be negative" }));
}

#[tokio::test]
async fn test_testimonios_soft_delete() {
    let app = TestApp::new();

    let (status, body) = app
        .json(Method::POST, "/api/testimonios", json!({ "name": "Ana" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "name and text are required" }));

    let (status, first) = app
        .json(
            Method::POST,
            "/api/testimonios",
            json!({ "name": "Ana", "location": "Rosario", "text": "Inolvidable" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["activo"], true);

    app.json(
        Method::POST,
        "/api/testimonios",
        json!({ "name": "Luis", "text": "Volvemos seguro" }),
    )
    .await;

    let (_, list) = app.get("/api/testimonios").await;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Luis", "Ana"]);

    let (status, body) = app
        .json(Method::DELETE, "/api/testimonios", json!({ "id": first["id"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, list) = app.get("/api/testimonios").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(app.repo.all_testimonios().len(), 2);

    let (status, body) = app
        .json(Method::DELETE, "/api/testimonios", json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "id is required" }));
}

#[tokio::test]
async fn test_keepalive() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/keepalive").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(body["ts"].as_i64().unwrap() > 0);

    let down = TestApp::with(MemorySiteRepository::failing(), None);
    let (status, body) = down.get("/api/keepalive").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);
    assert!(body["ts"].is_i64());
}

#[tokio::test]
async fn test_privileged_routes_without_service_role() {
    let app = TestApp::with(MemorySiteRepository::without_service_role(), None);

    for uri in ["/api/horarios", "/api/testimonios"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, json!({ "error": CONFIG_MISSING }), "{uri}");
    }

    // Public tables keep working with the anonymous key alone.
    let (status, _) = app.get("/api/expediciones").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/configuracion").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_backend_failure_is_generic() {
    let app = TestApp::with(MemorySiteRepository::failing(), None);

    let cases = [
        ("/api/expediciones", "Error fetching expediciones"),
        ("/api/contacto", "Error fetching contacto"),
        ("/api/configuracion", "Failed to fetch configuracion"),
        ("/api/horarios", "Error fetching horarios"),
        ("/api/testimonios", "Failed to fetch testimonios"),
    ];
    for (uri, message) in cases {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, json!({ "error": message }), "{uri}");
    }
}

#[tokio::test]
async fn test_malformed_json_is_a_json_error() {
    let app = TestApp::new();
    let req = Request::builder()
        .method(Method::PUT)
        .uri("/api/configuracion")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
