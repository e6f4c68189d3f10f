//! Studio engine
//!
//! Owns the pipeline graph, the generated-book library and the studio event
//! channel. Upload forwarding and the status-stream mirror run against this
//! shared handle; clones share state.

use crate::error::{Error, Result};
use crate::library;
use crate::pipeline::{monitor, GraphLayout, PipelineGraph};
use nova_common::events::{StageName, StatusEvent, StudioEvent};
use nova_common::models::BookEntry;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// Wire form of the whole diagram, served as the graph snapshot
#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<nova_common::events::NodeState>,
    pub edges: Vec<nova_common::events::EdgeState>,
}

/// Both diagram layouts, kept in step so either can be served at any time
struct Diagrams {
    upload: PipelineGraph,
    showcase: PipelineGraph,
}

impl Diagrams {
    fn get(&self, layout: GraphLayout) -> &PipelineGraph {
        match layout {
            GraphLayout::Upload => &self.upload,
            GraphLayout::Showcase => &self.showcase,
        }
    }
}

/// The studio engine
#[derive(Clone)]
pub struct StudioEngine {
    graphs: Arc<RwLock<Diagrams>>,
    library: Arc<RwLock<Vec<BookEntry>>>,
    session: Arc<RwLock<Option<Uuid>>>,
    event_tx: broadcast::Sender<StudioEvent>,
    client: reqwest::Client,
    pipeline_url: String,
    assets_url: String,
}

impl StudioEngine {
    pub fn new(pipeline_url: String, assets_url: String) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            graphs: Arc::new(RwLock::new(Diagrams {
                upload: PipelineGraph::upload_view(),
                showcase: PipelineGraph::showcase(),
            })),
            library: Arc::new(RwLock::new(Vec::new())),
            session: Arc::new(RwLock::new(None)),
            event_tx,
            client: reqwest::Client::new(),
            pipeline_url,
            assets_url,
        }
    }

    /// Subscribe to the studio event stream (SSE feed)
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, event: StudioEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn pipeline_url(&self) -> &str {
        &self.pipeline_url
    }

    // ------------------------------------------------------------------
    // Upload forwarding
    // ------------------------------------------------------------------

    /// Forward an uploaded novel to the pipeline's processing endpoint
    ///
    /// Any non-error upstream status counts as accepted: the graph resets
    /// for the new session, the upload node is marked done and the status
    /// mirror starts. Only one session is mirrored at a time.
    pub async fn upload(&self, file_name: String, data: Vec<u8>) -> Result<Uuid> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.clone())
            .mime_str("text/plain")
            .map_err(|e| Error::Internal(format!("multipart build failed: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/process-novel", self.pipeline_url);
        info!("Forwarding novel upload to {}: {}", url, file_name);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("pipeline unreachable: {}", e)))?;
        if !response.status().is_success() {
            let status = response.status();
            self.pipeline_failed("novel processing could not be started")
                .await;
            return Err(Error::Upstream(format!(
                "pipeline rejected upload: {}",
                status
            )));
        }

        let session_id = Uuid::new_v4();
        *self.session.write().await = Some(session_id);
        {
            let mut graphs = self.graphs.write().await;
            let graphs = &mut *graphs;
            for graph in [&mut graphs.upload, &mut graphs.showcase] {
                graph.reset();
                graph.mark_upload_done();
            }
        }
        info!("Upload accepted, session {}", session_id);
        self.broadcast(StudioEvent::UploadAccepted {
            session_id,
            file_name,
            timestamp: chrono::Utc::now(),
        });
        self.broadcast_graph().await;

        // Mirror this session's status stream until it completes
        let engine = self.clone();
        tokio::spawn(async move {
            monitor::mirror_status_stream(engine).await;
        });

        Ok(session_id)
    }

    // ------------------------------------------------------------------
    // Status mirroring
    // ------------------------------------------------------------------

    /// Apply one pipeline status event: rebroadcast it, update the diagram,
    /// and turn the `error` stage into a banner instead of a graph change.
    pub async fn apply_status(&self, event: StatusEvent) {
        self.broadcast(StudioEvent::PipelineStatus {
            stage: event.stage,
            progress: event.progress,
            message: event.message.clone(),
            is_complete: event.is_complete,
            timestamp: chrono::Utc::now(),
        });

        if event.stage == StageName::Error {
            self.pipeline_failed(&event.message).await;
            return;
        }

        let changed = {
            let mut graphs = self.graphs.write().await;
            let upload_changed = graphs.upload.apply_stage(event.stage);
            let showcase_changed = graphs.showcase.apply_stage(event.stage);
            upload_changed || showcase_changed
        };
        if changed {
            self.broadcast_graph().await;
        }
    }

    /// Surface a pipeline failure as a dismissible banner
    pub async fn pipeline_failed(&self, message: &str) {
        warn!("Pipeline failure: {}", message);
        self.broadcast(StudioEvent::PipelineFailed {
            message: message.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }

    pub async fn graph_snapshot(&self, layout: GraphLayout) -> GraphSnapshot {
        let graphs = self.graphs.read().await;
        let graph = graphs.get(layout);
        GraphSnapshot {
            nodes: graph.node_states(),
            edges: graph.edge_states(),
        }
    }

    /// The event feed carries the upload layout; the showcase layout is
    /// pulled on demand from the graph endpoint.
    async fn broadcast_graph(&self) {
        let snapshot = self.graph_snapshot(GraphLayout::Upload).await;
        self.broadcast(StudioEvent::GraphChanged {
            nodes: snapshot.nodes,
            edges: snapshot.edges,
            timestamp: chrono::Utc::now(),
        });
    }

    // ------------------------------------------------------------------
    // Library
    // ------------------------------------------------------------------

    pub async fn library(&self) -> Vec<BookEntry> {
        self.library.read().await.clone()
    }

    /// Fetch the published listing and merge it into the known list
    ///
    /// Fetch failures are logged and leave the known list intact.
    pub async fn refresh_library(&self) {
        let url = format!("{}/books/all.json", self.assets_url);
        let fetched = match self.fetch_listing(&url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Library refresh failed ({}): {}", url, e);
                return;
            }
        };

        let count = {
            let mut known = self.library.write().await;
            library::merge_entries(&mut known, fetched);
            known.len()
        };
        info!("Library refreshed, {} books", count);
        self.broadcast(StudioEvent::LibraryUpdated {
            count,
            timestamp: chrono::Utc::now(),
        });
    }

    async fn fetch_listing(&self, url: &str) -> Result<Vec<BookEntry>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "listing fetch returned {}",
                response.status()
            )));
        }
        response
            .json::<Vec<BookEntry>>()
            .await
            .map_err(|e| Error::Upstream(format!("malformed listing: {}", e)))
    }
}
