use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::assessment::assessment_router;
use crate::workflows::assessment::router::scenario_handler;

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn scenario_handler_hides_ground_truth() {
    let (service, _) = build_service(ScriptedGenerator::failing());

    let response = scenario_handler::<ScriptedGenerator>(
        State(Arc::new(service)),
        Path("chest-pain-er".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("patientName"), Some(&json!("Mr. Lopez")));
    assert!(payload.get("testOverrides").is_none());
    assert!(payload.get("finalDxId").is_none());
}

#[tokio::test]
async fn lists_bundled_scenarios() {
    let (service, _) = build_service(ScriptedGenerator::failing());
    let router = assessment_router(Arc::new(service));

    let response = router
        .oneshot(get("/api/v1/scenarios"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let ids: Vec<&str> = payload
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|entry| entry.get("id").and_then(Value::as_str))
        .collect();
    assert_eq!(ids.len(), 5);
    assert!(ids.contains(&"chest-pain-er"));
}

#[tokio::test]
async fn unknown_scenario_is_not_found() {
    let (service, _) = build_service(ScriptedGenerator::failing());
    let router = assessment_router(Arc::new(service));

    let response = router
        .oneshot(get("/api/v1/scenarios/not-a-case/tests/ecg"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("error"), Some(&json!("Scenario not found")));
    assert_eq!(payload.get("details"), Some(&json!("not-a-case")));
}

#[tokio::test]
async fn unknown_test_is_not_found() {
    let (service, _) = build_service(ScriptedGenerator::failing());
    let router = assessment_router(Arc::new(service));

    let response = router
        .oneshot(get("/api/v1/scenarios/chest-pain-er/tests/unobtainium_panel"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("details"), Some(&json!("unobtainium_panel")));
}

#[tokio::test]
async fn resolves_test_with_yield() {
    let (service, _) = build_service(ScriptedGenerator::failing());
    let router = assessment_router(Arc::new(service));

    let response = router
        .oneshot(get("/api/v1/scenarios/chest-pain-er/tests/troponin"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("yield"), Some(&json!("high")));
    assert_eq!(
        payload.pointer("/test/id").and_then(Value::as_str),
        Some("troponin")
    );
}

#[tokio::test]
async fn catalog_filters_by_query_params() {
    let (service, _) = build_service(ScriptedGenerator::failing());
    let router = assessment_router(Arc::new(service));

    let response = router
        .oneshot(get(
            "/api/v1/catalog/tests?category=Cardiac&kind=Lab&commonOnly=true&exclude=bnp",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let entries = payload.as_array().expect("array");
    assert!(!entries.is_empty());
    for entry in entries {
        assert_eq!(entry.get("category"), Some(&json!("Cardiac")));
        assert_eq!(entry.get("kind"), Some(&json!("Lab")));
        assert_ne!(entry.get("id"), Some(&json!("bnp")));
    }
}

#[tokio::test]
async fn score_route_returns_report() {
    let (service, _) = build_service(ScriptedGenerator::failing());
    let router = assessment_router(Arc::new(service));

    let body = serde_json::to_value(stemi_only_request()).unwrap();
    let response = router
        .oneshot(post_json("/api/v1/scenarios/chest-pain-er/score", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("totalScorePercentage"), Some(&json!(50)));
    assert_eq!(payload.get("maxScore"), Some(&json!(12.0)));
}

#[tokio::test]
async fn assess_route_merges_scores() {
    let (service, _) = build_service(ScriptedGenerator::replying(model_assessment()));
    let router = assessment_router(Arc::new(service));

    let body = serde_json::to_value(assessment_request()).unwrap();
    let response = router
        .oneshot(post_json("/api/v1/assess", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("totalScore"), Some(&json!(6.0)));
    assert_eq!(payload.get("summary"), Some(&json!("Solid work.")));
}

#[tokio::test]
async fn assess_route_maps_upstream_failure_to_bad_gateway() {
    let (service, _) = build_service(ScriptedGenerator::failing());
    let router = assessment_router(Arc::new(service));

    let body = serde_json::to_value(assessment_request()).unwrap();
    let response = router
        .oneshot(post_json("/api/v1/assess", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("details")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("500"));
}

#[tokio::test]
async fn explain_term_rejects_blank_selection() {
    let (service, _) = build_service(ScriptedGenerator::failing());
    let router = assessment_router(Arc::new(service));

    let response = router
        .oneshot(post_json("/api/v1/explain-term", &json!({ "selectedText": "" })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("error"),
        Some(&json!("Missing or invalid selectedText"))
    );
}

#[tokio::test]
async fn llm_status_reports_failure_details() {
    let (service, _) = build_service(ScriptedGenerator::failing());
    let router = assessment_router(Arc::new(service));

    let response = router
        .oneshot(get("/api/v1/llm/status"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("success"), Some(&json!(false)));
    assert_eq!(payload.get("model"), Some(&json!("scripted")));
}
