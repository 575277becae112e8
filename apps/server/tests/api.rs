use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use propdesk_server::{api::app_router, build_state, config::Config};

fn seed_documents() -> Value {
    json!({
        "properties": {
            "P-1": {
                "propertyId": "P-1",
                "name": "Sea View 2BHK",
                "micromarket": "Bandra",
                "assetType": "Apartment",
                "areaSqft": 1000,
                "price": 95,
                "status": "Available"
            },
            "P-2": {
                "propertyId": "P-2",
                "micromarket": "Powai",
                "assetType": "Apartment",
                "price": 140,
                "status": "Sold"
            }
        },
        "builders": {
            "B-1": { "name": "Lodha" }
        }
    })
}

async fn build_test_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let seed_path = tmp.path().join("seed.json");
    std::fs::write(&seed_path, seed_documents().to_string()).unwrap();
    let seed_file = seed_path.display().to_string();

    let config = Config::from_lookup(|key| match key {
        "PD_SEED_FILE" => Some(seed_file.clone()),
        _ => None,
    })
    .unwrap();
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn healthz_responds_ok() {
    let (app, _tmp) = build_test_router().await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn unknown_property_is_not_found() {
    let (app, _tmp) = build_test_router().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/properties/P-404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn price_change_updates_property_and_history() {
    let (app, _tmp) = build_test_router().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/properties/P-1/price",
        Some(json!({ "newPrice": 100, "changedBy": "asha" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 100.0);
    assert_eq!(body["pricePerSqft"], 10000.0);
    let history = body["priceHistory"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history[0]["id"].as_str().unwrap().starts_with("temp-"));

    let (status, body) = send(&app, Method::GET, "/api/v1/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inFlightMutations"], 0);
}

#[tokio::test]
async fn unchanged_price_is_rejected() {
    let (app, _tmp) = build_test_router().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/properties/P-1/price",
        Some(json!({ "newPrice": 95 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("same as the current price"));
}

#[tokio::test]
async fn property_summary_uses_fallbacks() {
    let (app, _tmp) = build_test_router().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/properties/P-2/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "N/A");
}

#[tokio::test]
async fn requirement_with_new_builder_registers_name() {
    let (app, _tmp) = build_test_router().await;
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/requirements",
        Some(json!({
            "clientName": "Mehta",
            "budget": { "from": 80, "to": 120 },
            "assetType": "Apartment",
            "micromarket": "Bandra",
            "builderName": "Godrej"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let requirement_id = created["requirementId"].as_str().unwrap().to_string();

    let (_, names) = send(&app, Method::GET, "/api/v1/builders", None).await;
    let names: Vec<&str> = names
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(names.contains(&"Godrej"));
    assert!(names.contains(&"Lodha"));

    let (status, linked) = send(
        &app,
        Method::POST,
        &format!("/api/v1/requirements/{}/matching-properties", requirement_id),
        Some(json!({ "propertyId": "P-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(linked["matchingProperties"], json!(["P-1"]));

    let (status, matches) = send(
        &app,
        Method::GET,
        &format!("/api/v1/requirements/{}/matching-properties", requirement_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(matches[0]["propertyId"], "P-1");
}

#[tokio::test]
async fn inverted_budget_is_rejected() {
    let (app, _tmp) = build_test_router().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/requirements",
        Some(json!({
            "clientName": "Shah",
            "budget": { "from": 120, "to": 80 },
            "assetType": "Apartment",
            "micromarket": "Powai"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn property_search_filters_by_facet() {
    let (app, _tmp) = build_test_router().await;
    let (status, page) = send(
        &app,
        Method::POST,
        "/api/v1/properties/search",
        Some(json!({
            "query": "",
            "facetFilters": [{ "attribute": "status", "values": ["Available"] }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["nbHits"], 1);
}

#[tokio::test]
async fn invalid_project_stage_is_bad_request() {
    let (app, _tmp) = build_test_router().await;
    let (status, _) = send(&app, Method::GET, "/api/v1/projects/launched", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tasks_can_be_created_listed_and_completed() {
    let (app, _tmp) = build_test_router().await;
    let (status, task) = send(
        &app,
        Method::POST,
        "/api/v1/tasks",
        Some(json!({ "title": "Call Mehta", "assignee": "asha" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = task["taskId"].as_str().unwrap().to_string();

    let (status, done) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/tasks/{}/status", task_id),
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "done");

    let (status, tasks) = send(&app, Method::GET, "/api/v1/tasks?assignee=asha", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn caller_request_id_is_echoed_on_errors() {
    let (app, _tmp) = build_test_router().await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/properties/P-404")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("req-42")
    );
}
