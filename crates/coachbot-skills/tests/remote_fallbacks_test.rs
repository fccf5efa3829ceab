//! Integration test: remote clients against in-process HTTP stubs.
//!
//! Verifies that:
//! 1. The wearable client parses `{data: [...]}` and sends the bearer token and date range.
//! 2. Non-200, unreachable host or malformed JSON from the wearable API yield no records.
//! 3. The coach client trims the first generated text and sends both chat roles.
//! 4. Any coach failure yields the sentinel string.

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use coachbot_core::CoreConfig;
use coachbot_skills::{
    CohereCoach, DailyRecord, MetricKind, OuraClient, Recommender, WearableSource,
    RECOMMENDATION_SENTINEL,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on.
async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn oura(base: &str) -> OuraClient {
    OuraClient::new("oura-test-token", base, Duration::from_secs(5))
}

fn coach(base: &str) -> CohereCoach {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = CoreConfig::load_from(&dir.path().join("absent")).unwrap();
    cfg.cohere_base_url = base.to_string();
    cfg.http_timeout_secs = 5;
    CohereCoach::new("cohere-test-key", &cfg)
}

fn empty() -> DailyRecord {
    DailyRecord::default()
}

#[tokio::test]
async fn sleep_records_are_parsed_with_auth_and_range() {
    async fn sleep(
        headers: HeaderMap,
        Query(q): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer oura-test-token");
        if !authorized || !q.contains_key("start_date") || !q.contains_key("end_date") {
            return (StatusCode::BAD_REQUEST, Json(json!({"detail": "bad request"})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "data": [
                    {"day": "2025-01-29", "score": 70, "total_sleep_duration": 25200},
                    {"day": "2025-01-30", "score": 82, "total_sleep_duration": 28800}
                ],
                "next_token": null
            })),
        )
    }
    let base = spawn_stub(Router::new().route("/sleep", get(sleep))).await;

    let records = oura(&base).fetch_recent(MetricKind::Sleep, 4).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].day(), Some("2025-01-29"));
    assert_eq!(records[1].metric_text(&["score"]), "82");
    assert_eq!(records[1].number("total_sleep_duration"), Some(28800.0));
}

#[tokio::test]
async fn activity_uses_daily_activity_endpoint() {
    let base = spawn_stub(Router::new().route(
        "/daily_activity",
        get(|| async { Json(json!({"data": [{"day": "2025-01-30", "score": 91}]})) }),
    ))
    .await;

    let latest = oura(&base).latest(MetricKind::Activity).await;
    assert_eq!(latest.metric_text(&["score"]), "91");
}

#[tokio::test]
async fn non_200_yields_no_records() {
    let base = spawn_stub(Router::new().route(
        "/readiness",
        get(|| async { (StatusCode::UNAUTHORIZED, "invalid token") }),
    ))
    .await;

    assert!(oura(&base).fetch_recent(MetricKind::Readiness, 1).await.is_empty());
    assert_eq!(oura(&base).latest(MetricKind::Readiness).await, empty());
}

#[tokio::test]
async fn unreachable_wearable_api_yields_no_records() {
    let base = dead_base_url().await;
    assert!(oura(&base).fetch_recent(MetricKind::Sleep, 4).await.is_empty());
}

#[tokio::test]
async fn malformed_wearable_body_yields_no_records() {
    let base = spawn_stub(Router::new().route("/sleep", get(|| async { "not json" }))).await;
    assert!(oura(&base).fetch_recent(MetricKind::Sleep, 1).await.is_empty());
}

#[tokio::test]
async fn recommendation_is_first_text_trimmed() {
    async fn chat(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer cohere-test-key");
        let roles: Vec<&str> = body["messages"]
            .as_array()
            .map(|m| m.iter().filter_map(|x| x["role"].as_str()).collect())
            .unwrap_or_default();
        let user = body["messages"][1]["content"].as_str().unwrap_or_default();
        if !authorized
            || roles != ["system", "user"]
            || body["max_tokens"] != json!(160)
            || !user.contains("examens demain")
        {
            return (StatusCode::BAD_REQUEST, Json(json!({"message": "bad request"})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "id": "abc",
                "message": {
                    "role": "assistant",
                    "content": [
                        {"type": "text", "text": "  Faites une pause de 10 minutes.\n"},
                        {"type": "text", "text": "ignored"}
                    ]
                },
                "finish_reason": "COMPLETE"
            })),
        )
    }
    let base = spawn_stub(Router::new().route("/v2/chat", post(chat))).await;

    let reco = coach(&base)
        .generate("examens demain", &empty(), &empty(), &empty())
        .await;
    assert_eq!(reco, "Faites une pause de 10 minutes.");
}

#[tokio::test]
async fn server_error_yields_sentinel() {
    let base = spawn_stub(Router::new().route(
        "/v2/chat",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;

    let reco = coach(&base).generate("fatigué", &empty(), &empty(), &empty()).await;
    assert_eq!(reco, RECOMMENDATION_SENTINEL);
}

#[tokio::test]
async fn unreachable_coach_yields_sentinel() {
    let base = dead_base_url().await;
    let reco = coach(&base).generate("fatigué", &empty(), &empty(), &empty()).await;
    assert_eq!(reco, "Erreur");
}

#[tokio::test]
async fn empty_content_yields_sentinel() {
    let base = spawn_stub(Router::new().route(
        "/v2/chat",
        post(|| async { Json(json!({"message": {"role": "assistant", "content": []}})) }),
    ))
    .await;

    let reco = coach(&base).generate("fatigué", &empty(), &empty(), &empty()).await;
    assert_eq!(reco, RECOMMENDATION_SENTINEL);
}
