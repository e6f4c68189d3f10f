//! Pipeline mirroring integration tests
//!
//! Drives the studio engine with status events directly (no upstream
//! connection) and checks the diagram, the event feed and the HTTP surface.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use nova_common::events::{NodeStatus, StageName, StatusEvent, StudioEvent};
use nova_st::api::{create_router, AppContext};
use nova_st::pipeline::GraphLayout;
use nova_st::studio::StudioEngine;
use tower::ServiceExt;

fn engine() -> StudioEngine {
    StudioEngine::new(
        "http://unused.invalid".to_string(),
        "http://unused.invalid/assets".to_string(),
    )
}

fn status(stage: StageName, progress: f32) -> StatusEvent {
    StatusEvent {
        stage,
        progress,
        message: format!("{} in progress", stage.as_str()),
        is_complete: false,
    }
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<StudioEvent>) -> Vec<StudioEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn status_sequence_drives_the_diagram() {
    let engine = engine();
    let mut rx = engine.subscribe();

    let stages = [
        StageName::Splitting,
        StageName::Scripting,
        StageName::Designing,
        StageName::Generating,
        StageName::Editing,
        StageName::Finalizing,
        StageName::Completed,
    ];
    for stage in stages {
        engine.apply_status(status(stage, 50.0)).await;
    }

    let snapshot = engine.graph_snapshot(GraphLayout::Upload).await;
    for node in &snapshot.nodes {
        match node.id.as_str() {
            "complete" => assert_eq!(node.status, NodeStatus::Active),
            _ => assert_eq!(node.status, NodeStatus::Completed),
        }
    }

    let events = drain(&mut rx);
    let mirrored = events
        .iter()
        .filter(|e| matches!(e, StudioEvent::PipelineStatus { .. }))
        .count();
    assert_eq!(mirrored, stages.len());

    // scripting repeats the script node and completed repeats the complete
    // node, so those two apply no graph change
    let graph_changes = events
        .iter()
        .filter(|e| matches!(e, StudioEvent::GraphChanged { .. }))
        .count();
    assert_eq!(graph_changes, 5);
}

#[tokio::test]
async fn error_stage_becomes_a_banner() {
    let engine = engine();
    engine.apply_status(status(StageName::Designing, 30.0)).await;
    let before = engine.graph_snapshot(GraphLayout::Upload).await;

    let mut rx = engine.subscribe();
    engine
        .apply_status(StatusEvent {
            stage: StageName::Error,
            progress: 30.0,
            message: "scene generation failed".to_string(),
            is_complete: false,
        })
        .await;

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        StudioEvent::PipelineFailed { message, .. } if message == "scene generation failed"
    )));
    assert!(!events
        .iter()
        .any(|e| matches!(e, StudioEvent::GraphChanged { .. })));

    let after = engine.graph_snapshot(GraphLayout::Upload).await;
    assert_eq!(after.nodes, before.nodes);
    assert_eq!(after.edges, before.edges);
}

#[tokio::test]
async fn graph_endpoint_serves_the_snapshot() {
    let engine = engine();
    engine.apply_status(status(StageName::Designing, 30.0)).await;
    let app = create_router(AppContext { engine });

    let response = app
        .oneshot(
            Request::builder()
                .uri("/pipeline/graph")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let nodes = json["nodes"].as_array().unwrap();
    let director = nodes.iter().find(|n| n["id"] == "director").unwrap();
    assert_eq!(director["status"], "active");
    let script = nodes.iter().find(|n| n["id"] == "script").unwrap();
    assert_eq!(script["status"], "completed");
}

#[tokio::test]
async fn showcase_layout_is_served_with_the_same_stage() {
    let engine = engine();
    engine.apply_status(status(StageName::Generating, 60.0)).await;
    let app = create_router(AppContext { engine });

    let response = app
        .oneshot(
            Request::builder()
                .uri("/pipeline/graph?layout=showcase")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let nodes = json["nodes"].as_array().unwrap();
    for id in ["production", "imageTool", "audioTool", "effectTool"] {
        let node = nodes.iter().find(|n| n["id"] == id).unwrap();
        assert_eq!(node["status"], "active", "{}", id);
    }
    let director = nodes.iter().find(|n| n["id"] == "director").unwrap();
    assert_eq!(director["status"], "completed");
}

#[tokio::test]
async fn library_starts_empty() {
    let app = create_router(AppContext { engine: engine() });

    let response = app
        .oneshot(Request::builder().uri("/library").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn upload_requires_a_file_field() {
    let app = create_router(AppContext { engine: engine() });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header("content-type", "multipart/form-data; boundary=xyz")
                .body(Body::from("--xyz--\r\n"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_the_module() {
    let app = create_router(AppContext { engine: engine() });

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["module"], "studio");
}
