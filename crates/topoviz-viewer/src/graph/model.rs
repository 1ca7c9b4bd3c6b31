use anyhow::Context;
use bevy::math::Vec2;
use topoviz_core::{Edge, Graph, Node, NodeId};

/// The user-edited topology. Duplicate ids are accepted; lookups return the first match.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: Graph,
}

impl GraphStore {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.graph.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn add_node(&mut self, id: &str, ip: &str) -> bool {
        if id.is_empty() || ip.is_empty() {
            tracing::debug!(id, ip, "add node ignored: empty field");
            return false;
        }
        self.graph.nodes.push(Node::new(id, ip));
        true
    }

    pub fn add_edge(&mut self, source: &str, target: &str, cost: i64) -> bool {
        if source.is_empty() || target.is_empty() || source == target {
            tracing::debug!(source, target, "add link ignored: empty or self-loop");
            return false;
        }
        self.graph.edges.push(Edge::new(source, target, cost));
        true
    }

    pub fn clear(&mut self) {
        self.graph = Graph::default();
    }

    pub fn replace(&mut self, graph: Graph) {
        self.graph = graph;
    }

    /// Parses `text` and swaps it in. On error the store keeps its previous graph.
    pub fn import_json(&mut self, text: &str) -> anyhow::Result<()> {
        let graph: Graph = serde_json::from_str(text).context("invalid topology JSON")?;
        self.replace(graph);
        Ok(())
    }

    /// Writes `pos(id)` into each node's `x`/`y`; nodes without a position keep theirs.
    pub fn set_positions(&mut self, pos: impl Fn(&NodeId) -> Option<Vec2>) {
        for n in &mut self.graph.nodes {
            if let Some(p) = pos(&n.id) {
                n.x = Some(p.x);
                n.y = Some(p.y);
            }
        }
    }

    pub fn export_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(&self.graph).context("failed to serialize topology")
    }
}
