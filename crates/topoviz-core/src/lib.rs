use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A router in the topology. `x`/`y` are layout coordinates, present only when
/// the node came from an export or a step that carried them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id: NodeId(id.into()),
            ip: Some(ip.into()),
            x: None,
            y: None,
            attrs: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    #[serde(deserialize_with = "endpoint")]
    pub source: NodeId,
    #[serde(deserialize_with = "endpoint")]
    pub target: NodeId,
    #[serde(default)]
    pub cost: i64,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, cost: i64) -> Self {
        Self {
            source: NodeId(source.into()),
            target: NodeId(target.into()),
            cost,
        }
    }

    pub fn key(&self) -> (NodeId, NodeId) {
        (self.source.clone(), self.target.clone())
    }
}

// Exporters that ran a layout may have replaced endpoint ids with whole node objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum Endpoint {
    Id(NodeId),
    Node { id: NodeId },
}

fn endpoint<'de, D>(de: D) -> Result<NodeId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Endpoint::deserialize(de)? {
        Endpoint::Id(id) | Endpoint::Node { id } => id,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        find_node(&self.nodes, id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// First node with a matching id; duplicates after it are shadowed.
pub fn find_node<'a>(nodes: &'a [Node], id: &NodeId) -> Option<&'a Node> {
    nodes.iter().find(|n| &n.id == id)
}

/// `[id, attributes]` as sent by the simulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepNode(pub NodeId, #[serde(default)] pub Map<String, Value>);

impl StepNode {
    pub fn to_node(&self) -> Node {
        let mut attrs = self.1.clone();
        let ip = match attrs.remove("ip") {
            Some(Value::String(s)) => Some(s),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        };
        let x = attrs.remove("x").and_then(|v| v.as_f64()).map(|v| v as f32);
        let y = attrs.remove("y").and_then(|v| v.as_f64()).map(|v| v as f32);
        // the tuple id wins over any "id" attribute
        attrs.remove("id");
        Node {
            id: self.0.clone(),
            ip,
            x,
            y,
            attrs,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Step {
    #[serde(default)]
    pub nodes: Vec<StepNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Value>,
}

impl Step {
    pub fn resolved_nodes(&self) -> Vec<Node> {
        self.nodes.iter().map(StepNode::to_node).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnimateRequest {
    pub protocol: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimateResponse {
    #[serde(default)]
    pub steps: Option<Vec<Step>>,
}
