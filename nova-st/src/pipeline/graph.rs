//! Pipeline node diagram
//!
//! A fixed directed graph that visualizes where the processing pipeline is.
//! The studio has no control authority over the pipeline; the graph only
//! mirrors the status stream. Nodes are tri-state and an edge is highlighted
//! exactly while its source node is active.
//!
//! Stage-to-node table:
//! `splitting`/`scripting` light the script node, `designing` the director,
//! `generating` the production node (plus the tool nodes in the showcase
//! layout), `editing` the editor, `finalizing`/`completed` the complete node.
//! Earlier nodes are marked completed. The `error` stage never touches the
//! graph; it is surfaced as a banner instead.

use nova_common::events::{EdgeState, NodeState, NodeStatus, StageName};
use serde::Deserialize;
use std::ops::RangeInclusive;

/// Which diagram layout to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphLayout {
    #[default]
    Upload,
    Showcase,
}

/// Stage ranks along the pipeline. Tool nodes sit one rank after production
/// so they activate with `generating` and complete with `editing`.
const RANK_UPLOAD: u8 = 0;
const RANK_SCRIPT: u8 = 1;
const RANK_DIRECTOR: u8 = 2;
const RANK_PRODUCTION: u8 = 3;
const RANK_TOOLS: u8 = 4;
const RANK_EDITOR: u8 = 5;
const RANK_COMPLETE: u8 = 6;

struct Node {
    id: &'static str,
    label: &'static str,
    rank: u8,
    status: NodeStatus,
}

impl Node {
    fn new(id: &'static str, label: &'static str, rank: u8) -> Self {
        Self {
            id,
            label,
            rank,
            status: NodeStatus::Inactive,
        }
    }
}

/// The node diagram with its current highlight state
pub struct PipelineGraph {
    nodes: Vec<Node>,
    edges: &'static [(&'static str, &'static str)],
}

/// Compact layout shown next to the upload box. The editor-to-director edge
/// is the revision feedback loop.
const UPLOAD_EDGES: &[(&str, &str)] = &[
    ("upload", "script"),
    ("script", "director"),
    ("director", "production"),
    ("production", "editor"),
    ("editor", "complete"),
    ("editor", "director"),
];

/// Richer layout with the three production tool nodes fanned out
const SHOWCASE_EDGES: &[(&str, &str)] = &[
    ("upload", "script"),
    ("script", "director"),
    ("director", "production"),
    ("production", "imageTool"),
    ("production", "audioTool"),
    ("production", "effectTool"),
    ("imageTool", "editor"),
    ("audioTool", "editor"),
    ("effectTool", "editor"),
    ("editor", "complete"),
    ("editor", "director"),
];

impl PipelineGraph {
    /// Six-node layout used on the upload view
    pub fn upload_view() -> Self {
        Self {
            nodes: vec![
                Node::new("upload", "Novel Upload", RANK_UPLOAD),
                Node::new("script", "Script Writer", RANK_SCRIPT),
                Node::new("director", "Director", RANK_DIRECTOR),
                Node::new("production", "Production", RANK_PRODUCTION),
                Node::new("editor", "Editor", RANK_EDITOR),
                Node::new("complete", "Complete", RANK_COMPLETE),
            ],
            edges: UPLOAD_EDGES,
        }
    }

    /// Nine-node layout with the production tool nodes
    pub fn showcase() -> Self {
        Self {
            nodes: vec![
                Node::new("upload", "Novel Upload", RANK_UPLOAD),
                Node::new("script", "Script Writer", RANK_SCRIPT),
                Node::new("director", "Director", RANK_DIRECTOR),
                Node::new("production", "Production", RANK_PRODUCTION),
                Node::new("imageTool", "Image Tool", RANK_TOOLS),
                Node::new("audioTool", "Audio Tool", RANK_TOOLS),
                Node::new("effectTool", "Effect Tool", RANK_TOOLS),
                Node::new("editor", "Editor", RANK_EDITOR),
                Node::new("complete", "Complete", RANK_COMPLETE),
            ],
            edges: SHOWCASE_EDGES,
        }
    }

    /// Clear all highlight state (new processing session)
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.status = NodeStatus::Inactive;
        }
    }

    /// Mark the upload node done once the pipeline accepted the novel
    pub fn mark_upload_done(&mut self) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == "upload") {
            node.status = NodeStatus::Completed;
        }
    }

    /// Apply a status-stream stage to the diagram. Returns whether any node
    /// changed. The `error` stage is not a graph position and changes nothing.
    pub fn apply_stage(&mut self, stage: StageName) -> bool {
        let active: RangeInclusive<u8> = match stage {
            StageName::Splitting | StageName::Scripting => RANK_SCRIPT..=RANK_SCRIPT,
            StageName::Designing => RANK_DIRECTOR..=RANK_DIRECTOR,
            StageName::Generating => RANK_PRODUCTION..=RANK_TOOLS,
            StageName::Editing => RANK_EDITOR..=RANK_EDITOR,
            StageName::Finalizing | StageName::Completed => RANK_COMPLETE..=RANK_COMPLETE,
            StageName::Error => return false,
        };

        let mut changed = false;
        for node in &mut self.nodes {
            let next = if active.contains(&node.rank) {
                NodeStatus::Active
            } else if node.rank < *active.start() {
                NodeStatus::Completed
            } else {
                NodeStatus::Inactive
            };
            if node.status != next {
                node.status = next;
                changed = true;
            }
        }
        changed
    }

    pub fn node_states(&self) -> Vec<NodeState> {
        self.nodes
            .iter()
            .map(|n| NodeState {
                id: n.id.to_string(),
                label: n.label.to_string(),
                status: n.status,
            })
            .collect()
    }

    /// Edge highlight mirrors the source node
    pub fn edge_states(&self) -> Vec<EdgeState> {
        self.edges
            .iter()
            .map(|(source, target)| EdgeState {
                source: source.to_string(),
                target: target.to_string(),
                active: self.status_of(source) == NodeStatus::Active,
            })
            .collect()
    }

    fn status_of(&self, id: &str) -> NodeStatus {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.status)
            .unwrap_or(NodeStatus::Inactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(graph: &PipelineGraph, id: &str) -> NodeStatus {
        graph
            .node_states()
            .into_iter()
            .find(|n| n.id == id)
            .unwrap()
            .status
    }

    #[test]
    fn stage_sequence_walks_the_diagram() {
        let mut graph = PipelineGraph::upload_view();
        graph.mark_upload_done();

        assert!(graph.apply_stage(StageName::Splitting));
        assert_eq!(status(&graph, "script"), NodeStatus::Active);
        assert_eq!(status(&graph, "upload"), NodeStatus::Completed);
        assert_eq!(status(&graph, "director"), NodeStatus::Inactive);

        // scripting keeps the same node lit
        assert!(!graph.apply_stage(StageName::Scripting));

        assert!(graph.apply_stage(StageName::Designing));
        assert_eq!(status(&graph, "script"), NodeStatus::Completed);
        assert_eq!(status(&graph, "director"), NodeStatus::Active);

        assert!(graph.apply_stage(StageName::Generating));
        assert_eq!(status(&graph, "production"), NodeStatus::Active);

        assert!(graph.apply_stage(StageName::Editing));
        assert_eq!(status(&graph, "production"), NodeStatus::Completed);
        assert_eq!(status(&graph, "editor"), NodeStatus::Active);

        assert!(graph.apply_stage(StageName::Completed));
        assert_eq!(status(&graph, "complete"), NodeStatus::Active);
        for id in ["upload", "script", "director", "production", "editor"] {
            assert_eq!(status(&graph, id), NodeStatus::Completed);
        }
    }

    #[test]
    fn tool_nodes_follow_production() {
        let mut graph = PipelineGraph::showcase();
        graph.apply_stage(StageName::Generating);
        for id in ["production", "imageTool", "audioTool", "effectTool"] {
            assert_eq!(status(&graph, id), NodeStatus::Active);
        }

        graph.apply_stage(StageName::Editing);
        for id in ["production", "imageTool", "audioTool", "effectTool"] {
            assert_eq!(status(&graph, id), NodeStatus::Completed);
        }
        assert_eq!(status(&graph, "editor"), NodeStatus::Active);
    }

    #[test]
    fn error_stage_leaves_the_graph_alone() {
        let mut graph = PipelineGraph::upload_view();
        graph.apply_stage(StageName::Designing);
        let before = graph.node_states();
        assert!(!graph.apply_stage(StageName::Error));
        assert_eq!(graph.node_states(), before);
    }

    #[test]
    fn edges_are_active_with_their_source() {
        let mut graph = PipelineGraph::upload_view();
        graph.apply_stage(StageName::Designing);

        let edges = graph.edge_states();
        let active: Vec<_> = edges
            .iter()
            .filter(|e| e.active)
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(active, vec![("director", "production")]);
    }

    #[test]
    fn reset_clears_all_highlighting() {
        let mut graph = PipelineGraph::showcase();
        graph.apply_stage(StageName::Completed);
        graph.reset();
        assert!(graph
            .node_states()
            .iter()
            .all(|n| n.status == NodeStatus::Inactive));
        assert!(graph.edge_states().iter().all(|e| !e.active));
    }
}
