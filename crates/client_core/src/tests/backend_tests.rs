use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{HackCode, TeamId},
    protocol::{SubmitRequest, TeamDetailsRequest},
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

use super::*;
use crate::PortalBackend;

type SubmitCapture = (HashMap<String, String>, Value);

#[derive(Clone)]
struct ServerState {
    submit_tx: Arc<Mutex<Option<oneshot::Sender<SubmitCapture>>>>,
}

async fn handle_fetch_hackathon(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    match params.get("hackCode").map(String::as_str) {
        Some("BROKEN") => Err(StatusCode::INTERNAL_SERVER_ERROR),
        Some(code) => Ok(Json(json!({
            "hackCode": code,
            "eventName": "Hatch 2026",
            "eventTagline": "Build better hackathons",
            "eventStartDate": "2026-03-01T09:00:00Z",
            "eventEndDate": "2026-03-03T18:00:00Z",
            "mode": "online",
            "teamSize": "4",
            "maxTeams": "100",
            "hasFee": false,
            "phases": [{
                "name": "Ideation",
                "description": "Pitch",
                "startDate": "2026-03-01T09:00:00Z",
                "endDate": "2026-03-02T09:00:00Z",
                "deliverables": [{"type": "pdf", "description": "One-pager"}]
            }],
            "prizes": [{"title": "Winner", "description": "Trophy"}],
            "sponsors": [{"name": "Acme"}]
        }))),
        None => Err(StatusCode::BAD_REQUEST),
    }
}

async fn handle_team_details(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let bearer = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok());
    if bearer != Some("Bearer token-1") {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if body["email"] != "member@example.com"
        || body["hackCode"] != "HACK26"
        || body["auth_token"] != "token-1"
    {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({
        "team": {"teamId": "t-1", "teamName": "Rustaceans", "status": "inactive"},
        "members": [{"email": "member@example.com", "name": "M", "role": "leader"}]
    })))
}

async fn handle_fetch_submissions(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    if params.get("teamId").map(String::as_str) != Some("t-1") {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!([
        {"phaseIndex": 0, "submissions": {"pdf": "http://x"}}
    ])))
}

async fn handle_submit(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> StatusCode {
    if let Some(tx) = state.submit_tx.lock().await.take() {
        let _ = tx.send((params, body));
    }
    StatusCode::OK
}

async fn handle_check_plagiarism(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if headers.get("auth_token").and_then(|value| value.to_str().ok()) != Some("token-1") {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let repository_url = body["repository_url"].as_str().unwrap_or_default();
    Ok(Json(json!({
        "success": true,
        "data": {
            "analysis": {
                "commit_patterns": {
                    "commit_count": 12,
                    "details": {
                        "author_score": 0.0,
                        "message_score": 10.0,
                        "size_score": 5.0,
                        "timing_score": 0.0
                    },
                    "indicators": ["uniform commit sizes"],
                    "score": 7.5
                },
                "final_assessment": {
                    "component_scores": {
                        "commit_patterns": 7.5,
                        "inter_repository_similarity": 0.0,
                        "intra_repository_similarity": 12.0
                    },
                    "confidence": "high",
                    "final_score": 9.1,
                    "indicators": [],
                    "risk_level": "low"
                },
                "inter_repository_similarity": {
                    "files_checked": 40,
                    "matches": [],
                    "score": 0.0,
                    "search_attempts": 8
                },
                "intra_repository_similarity": {
                    "file_count": 40,
                    "score": 12.0,
                    "similar_files": [
                        {"file1": "a.rs", "file2": "b.rs", "similarity": 0.91}
                    ]
                }
            },
            "repository": {
                "created_at": "2026-02-20T00:00:00Z",
                "language": "Rust",
                "name": "demo",
                "owner": "rustaceans",
                "size": 512,
                "updated_at": "2026-03-01T00:00:00Z",
                "url": repository_url
            },
            "timestamp": "2026-03-01T12:00:00Z",
            "version": "1.0"
        }
    })))
}

async fn spawn_portal_server() -> Result<(String, oneshot::Receiver<SubmitCapture>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        submit_tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/fetchhack", get(handle_fetch_hackathon))
        .route("/getTeamDetails", post(handle_team_details))
        .route("/fetchsubmissions", get(handle_fetch_submissions))
        .route("/submissions", post(handle_submit))
        .route("/check-plagiarism", post(handle_check_plagiarism))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), rx))
}

#[tokio::test]
async fn fetch_hackathon_parses_definition() {
    let (server_url, _rx) = spawn_portal_server().await.expect("spawn server");
    let backend = HttpPortalBackend::new(server_url);

    let hackathon = backend
        .fetch_hackathon(&HackCode::from("HACK26"))
        .await
        .expect("fetch");
    assert_eq!(hackathon.event_name, "Hatch 2026");
    assert_eq!(hackathon.phases.len(), 1);
    assert_eq!(hackathon.phases[0].deliverables[0].kind, "pdf");
    assert_eq!(hackathon.prizes[0].title, "Winner");
}

#[tokio::test]
async fn fetch_hackathon_surfaces_server_errors() {
    let (server_url, _rx) = spawn_portal_server().await.expect("spawn server");
    let backend = HttpPortalBackend::new(server_url);

    backend
        .fetch_hackathon(&HackCode::from("BROKEN"))
        .await
        .expect_err("500 must fail the load");
}

#[tokio::test]
async fn fetch_team_details_sends_bearer_and_flattens_document() {
    let (server_url, _rx) = spawn_portal_server().await.expect("spawn server");
    let backend = HttpPortalBackend::new(server_url);

    let request = TeamDetailsRequest {
        email: "member@example.com".to_string(),
        hack_code: HackCode::from("HACK26"),
        auth_token: "token-1".to_string(),
    };
    let team = backend.fetch_team_details(&request).await.expect("fetch");
    assert_eq!(team.team_id.as_str(), "t-1");
    assert_eq!(team.team_name, "Rustaceans");
    assert!(team.activity.is_inactive());
    assert_eq!(team.members.len(), 1);
}

#[tokio::test]
async fn fetch_submissions_returns_loose_payload() {
    let (server_url, _rx) = spawn_portal_server().await.expect("spawn server");
    let backend = HttpPortalBackend::new(server_url);

    let payload = backend
        .fetch_submissions(&TeamId::from("t-1"), &HackCode::from("HACK26"), Some("token-1"))
        .await
        .expect("fetch");
    assert!(payload.is_array());
    assert_eq!(payload[0]["phaseIndex"], 0);
}

#[tokio::test]
async fn submit_posts_query_params_and_payload() {
    let (server_url, capture_rx) = spawn_portal_server().await.expect("spawn server");
    let backend = HttpPortalBackend::new(server_url);

    let request = SubmitRequest {
        submissions: HashMap::from([("pdf".to_string(), "http://x".to_string())]),
        team_id: TeamId::from("t-1"),
        hack_code: HackCode::from("HACK26"),
        phase_index: 0,
    };
    backend.submit(request, Some("token-1")).await.expect("submit");

    let (params, body) = capture_rx.await.expect("captured payload");
    assert_eq!(params.get("teamId").map(String::as_str), Some("t-1"));
    assert_eq!(params.get("hackCode").map(String::as_str), Some("HACK26"));
    assert_eq!(body["phaseIndex"], 0);
    assert_eq!(body["teamId"], "t-1");
    assert_eq!(body["submissions"]["pdf"], "http://x");
}

#[tokio::test]
async fn check_plagiarism_unwraps_the_envelope() {
    let (server_url, _rx) = spawn_portal_server().await.expect("spawn server");
    let backend = HttpPortalBackend::new(server_url);

    let report = backend
        .check_plagiarism("https://github.com/rustaceans/demo", "token-1")
        .await
        .expect("check");
    assert_eq!(report.repository.name, "demo");
    assert_eq!(report.analysis.final_assessment.risk_level, "low");
    assert_eq!(
        report.analysis.intra_repository_similarity.similar_files[0].file1,
        "a.rs"
    );
}

#[tokio::test]
async fn check_plagiarism_requires_the_auth_token_header() {
    let (server_url, _rx) = spawn_portal_server().await.expect("spawn server");
    let backend = HttpPortalBackend::new(server_url);

    backend
        .check_plagiarism("https://github.com/rustaceans/demo", "wrong-token")
        .await
        .expect_err("401 must surface");
}
