use bevy::math::Vec2;
use std::time::Duration;
use topoviz_core::{find_node, Edge, Node, NodeId};

use crate::graph::reconcile::{reconcile, Keyed, ReconcileStats};

pub type PrimitiveId = u64;
pub type EdgeKey = (NodeId, NodeId);

pub const NODE_RADIUS: f32 = 18.0;
pub const NODE_STROKE_WIDTH: f32 = 2.0;
pub const LINK_STROKE_WIDTH: f32 = 2.0;
pub const LABEL_FONT_SIZE: f32 = 12.0;

#[derive(Debug, Clone)]
pub struct NodeMarker {
    pub prim: PrimitiveId,
    pub datum: Node,
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct NodeLabel {
    pub prim: PrimitiveId,
    pub text: String,
    pub pos: Vec2,
}

/// An edge whose endpoints were found in the node set being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub cost: i64,
}

#[derive(Debug, Clone)]
pub struct LinkLine {
    pub prim: PrimitiveId,
    pub datum: ResolvedEdge,
    pub from: Vec2,
    pub to: Vec2,
    /// Stroke transition from the entering grey to the settled green, 0..=1.
    pub stroke_t: f32,
}

#[derive(Debug, Clone)]
pub struct LinkLabel {
    pub prim: PrimitiveId,
    pub text: String,
    pub pos: Vec2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub markers: ReconcileStats,
    pub labels: ReconcileStats,
    pub links: ReconcileStats,
    pub link_labels: ReconcileStats,
    pub dangling_edges: usize,
}

pub struct Scene {
    next_prim: PrimitiveId,
    link_transition: Duration,
    node_radius: f32,
    pub markers: Keyed<NodeId, NodeMarker>,
    pub labels: Keyed<NodeId, NodeLabel>,
    pub links: Keyed<EdgeKey, LinkLine>,
    pub link_labels: Keyed<EdgeKey, LinkLabel>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Duration::from_millis(800))
    }
}

/// Resolves edge endpoints against `nodes`, dropping edges that reference ids
/// not present there. Returns the resolved edges and the number dropped.
pub fn resolve_edges(nodes: &[Node], edges: &[Edge]) -> (Vec<ResolvedEdge>, usize) {
    let mut out = Vec::with_capacity(edges.len());
    let mut dropped = 0;
    for e in edges {
        match (find_node(nodes, &e.source), find_node(nodes, &e.target)) {
            (Some(s), Some(t)) => out.push(ResolvedEdge {
                source: s.id.clone(),
                target: t.id.clone(),
                cost: e.cost,
            }),
            _ => dropped += 1,
        }
    }
    (out, dropped)
}

impl Scene {
    pub fn new(link_transition: Duration) -> Self {
        Self {
            next_prim: 0,
            link_transition,
            node_radius: NODE_RADIUS,
            markers: Keyed::default(),
            labels: Keyed::default(),
            links: Keyed::default(),
            link_labels: Keyed::default(),
        }
    }

    /// Applies to markers created from now on.
    pub fn with_node_radius(mut self, radius: f32) -> Self {
        self.node_radius = radius.max(1.0);
        self
    }

    /// Brings the primitive sets in line with `nodes`/`edges`. Edges are
    /// resolved against `nodes` only.
    pub fn render(&mut self, nodes: &[Node], edges: &[Edge]) -> (RenderReport, Vec<ResolvedEdge>) {
        let (resolved, dangling_edges) = resolve_edges(nodes, edges);
        let mut report = RenderReport {
            dangling_edges,
            ..Default::default()
        };

        let radius = self.node_radius;
        let mut next = self.next_prim;
        let mut alloc = || {
            next += 1;
            next
        };

        report.links = reconcile(
            &mut self.links,
            resolved.iter().map(|e| ((e.source.clone(), e.target.clone()), e)),
            |_, e| LinkLine {
                prim: alloc(),
                datum: e.clone(),
                from: Vec2::ZERO,
                to: Vec2::ZERO,
                stroke_t: 0.0,
            },
            |_, line, e| line.datum = e.clone(),
            |_, _| {},
        );

        report.markers = reconcile(
            &mut self.markers,
            nodes.iter().map(|n| (n.id.clone(), n)),
            |_, n| NodeMarker {
                prim: alloc(),
                datum: n.clone(),
                center: Vec2::ZERO,
                radius,
            },
            |_, marker, n| marker.datum = n.clone(),
            |_, _| {},
        );

        report.labels = reconcile(
            &mut self.labels,
            nodes.iter().map(|n| (n.id.clone(), n)),
            |id, _| NodeLabel {
                prim: alloc(),
                text: id.0.clone(),
                pos: Vec2::ZERO,
            },
            |id, label, _| label.text = id.0.clone(),
            |_, _| {},
        );

        report.link_labels = reconcile(
            &mut self.link_labels,
            resolved.iter().map(|e| ((e.source.clone(), e.target.clone()), e)),
            |_, e| LinkLabel {
                prim: alloc(),
                text: e.cost.to_string(),
                pos: Vec2::ZERO,
            },
            |_, label, e| label.text = e.cost.to_string(),
            |_, _| {},
        );

        self.next_prim = next;

        tracing::debug!(
            nodes = self.markers.len(),
            links = self.links.len(),
            entered = report.markers.entered + report.links.entered,
            exited = report.markers.exited + report.links.exited,
            dangling = report.dangling_edges,
            "scene reconciled"
        );
        (report, resolved)
    }

    pub fn node_position(&self, id: &NodeId) -> Option<Vec2> {
        self.markers.get(id).map(|m| m.center)
    }

    /// Moves every primitive to the positions reported by `pos`.
    pub fn publish_positions(&mut self, pos: impl Fn(&NodeId) -> Option<Vec2>) {
        let ids: Vec<NodeId> = self.markers.keys().cloned().collect();
        for id in &ids {
            let Some(p) = pos(id) else {
                continue;
            };
            if let Some(m) = self.markers.get_mut(id) {
                m.center = p;
            }
            if let Some(l) = self.labels.get_mut(id) {
                l.pos = p;
            }
        }

        let keys: Vec<EdgeKey> = self.links.keys().cloned().collect();
        for key in &keys {
            let (Some(a), Some(b)) = (pos(&key.0), pos(&key.1)) else {
                continue;
            };
            if let Some(line) = self.links.get_mut(key) {
                line.from = a;
                line.to = b;
            }
            if let Some(label) = self.link_labels.get_mut(key) {
                label.pos = (a + b) * 0.5;
            }
        }
    }

    pub fn advance_transitions(&mut self, dt: Duration) {
        let span = self.link_transition.as_secs_f32();
        let step = if span <= 0.0 {
            1.0
        } else {
            dt.as_secs_f32() / span
        };
        for line in self.links.values_mut() {
            line.stroke_t = (line.stroke_t + step).min(1.0);
        }
    }

    /// Marker under `p`, preferring the one drawn last.
    pub fn hit_test(&self, p: Vec2) -> Option<NodeId> {
        let hits: Vec<&NodeId> = self
            .markers
            .iter()
            .filter(|(_, m)| m.center.distance(p) <= m.radius)
            .map(|(id, _)| id)
            .collect();
        hits.last().map(|id| (*id).clone())
    }

    #[cfg(test)]
    pub fn primitive_ids(&self) -> std::collections::HashSet<PrimitiveId> {
        let mut out = std::collections::HashSet::new();
        out.extend(self.markers.iter().map(|(_, m)| m.prim));
        out.extend(self.labels.iter().map(|(_, l)| l.prim));
        out.extend(self.links.iter().map(|(_, l)| l.prim));
        out.extend(self.link_labels.iter().map(|(_, l)| l.prim));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use topoviz_core::Node;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .map(|id| Node::new(*id, format!("10.0.0.{}", id.len())))
            .collect()
    }

    fn key(a: &str, b: &str) -> EdgeKey {
        (NodeId::from(a), NodeId::from(b))
    }

    #[test]
    fn surviving_ids_keep_their_primitives() {
        let mut scene = Scene::default();
        scene.render(&nodes(&["A", "B"]), &[Edge::new("A", "B", 1)]);
        let marker_a = scene.markers.get(&NodeId::from("A")).map(|m| m.prim);
        let label_a = scene.labels.get(&NodeId::from("A")).map(|l| l.prim);
        let link_ab = scene.links.get(&key("A", "B")).map(|l| l.prim);

        let (report, _) = scene.render(
            &nodes(&["A", "B", "C"]),
            &[Edge::new("A", "B", 7), Edge::new("B", "C", 2)],
        );

        assert_eq!(scene.markers.get(&NodeId::from("A")).map(|m| m.prim), marker_a);
        assert_eq!(scene.labels.get(&NodeId::from("A")).map(|l| l.prim), label_a);
        assert_eq!(scene.links.get(&key("A", "B")).map(|l| l.prim), link_ab);
        assert_eq!(report.markers.entered, 1);
        assert_eq!(report.markers.exited, 0);
    }

    #[test]
    fn removing_an_id_removes_only_its_primitives() {
        let mut scene = Scene::default();
        scene.render(
            &nodes(&["A", "B", "C"]),
            &[Edge::new("A", "B", 1), Edge::new("B", "C", 1)],
        );
        let keep: HashSet<PrimitiveId> = [
            scene.markers.get(&NodeId::from("A")).map(|m| m.prim),
            scene.labels.get(&NodeId::from("A")).map(|l| l.prim),
            scene.markers.get(&NodeId::from("B")).map(|m| m.prim),
            scene.labels.get(&NodeId::from("B")).map(|l| l.prim),
            scene.links.get(&key("A", "B")).map(|l| l.prim),
            scene.link_labels.get(&key("A", "B")).map(|l| l.prim),
        ]
        .into_iter()
        .flatten()
        .collect();

        let (report, _) = scene.render(
            &nodes(&["A", "B"]),
            &[Edge::new("A", "B", 1), Edge::new("B", "C", 1)],
        );

        assert_eq!(scene.primitive_ids(), keep);
        assert_eq!(report.markers.exited, 1);
        assert_eq!(report.labels.exited, 1);
        assert_eq!(report.links.exited, 1);
        assert_eq!(report.link_labels.exited, 1);
        assert_eq!(report.dangling_edges, 1);
    }

    #[test]
    fn dangling_edges_are_dropped_without_panicking() {
        let mut scene = Scene::default();
        let (report, resolved) = scene.render(
            &nodes(&["A"]),
            &[Edge::new("A", "ghost", 3), Edge::new("nope", "A", 1)],
        );

        assert!(scene.links.is_empty());
        assert!(scene.link_labels.is_empty());
        assert!(resolved.is_empty());
        assert_eq!(report.dangling_edges, 2);
    }

    #[test]
    fn edges_resolve_against_the_rendered_nodes_only() {
        let mut scene = Scene::default();
        scene.render(&nodes(&["A", "B"]), &[Edge::new("A", "B", 1)]);
        // B no longer exists in this render target even though it did a moment ago.
        scene.render(&nodes(&["A"]), &[Edge::new("A", "B", 1)]);
        assert!(scene.links.is_empty());
    }

    #[test]
    fn cost_labels_follow_updates() {
        let mut scene = Scene::default();
        scene.render(&nodes(&["A", "B"]), &[Edge::new("A", "B", 1)]);
        scene.render(&nodes(&["A", "B"]), &[Edge::new("A", "B", 9)]);

        let label = scene.link_labels.get(&key("A", "B")).expect("label");
        assert_eq!(label.text, "9");
        let line = scene.links.get(&key("A", "B")).expect("line");
        assert_eq!(line.datum.cost, 9);
    }

    #[test]
    fn positions_reach_every_primitive() {
        let mut scene = Scene::default();
        scene.render(&nodes(&["A", "B"]), &[Edge::new("A", "B", 1)]);
        scene.publish_positions(|id| match id.as_str() {
            "A" => Some(Vec2::new(0.0, 0.0)),
            "B" => Some(Vec2::new(10.0, 20.0)),
            _ => None,
        });

        let line = scene.links.get(&key("A", "B")).expect("line");
        assert_eq!(line.to, Vec2::new(10.0, 20.0));
        let label = scene.link_labels.get(&key("A", "B")).expect("label");
        assert_eq!(label.pos, Vec2::new(5.0, 10.0));
        assert_eq!(scene.node_position(&NodeId::from("B")), Some(Vec2::new(10.0, 20.0)));
        assert_eq!(scene.hit_test(Vec2::new(12.0, 18.0)), Some(NodeId::from("B")));
    }

    #[test]
    fn node_label_sits_on_its_marker() {
        let mut scene = Scene::default();
        scene.render(&nodes(&["A"]), &[]);
        scene.publish_positions(|_| Some(Vec2::new(30.0, -4.0)));
        let label = scene.labels.get(&NodeId::from("A")).map(|l| l.pos);
        assert_eq!(label, Some(Vec2::new(30.0, -4.0)));
    }

    #[test]
    fn overlapping_markers_hit_the_one_drawn_last() {
        let mut scene = Scene::default();
        scene.render(&nodes(&["A", "B", "C"]), &[]);
        scene.publish_positions(|id| match id.as_str() {
            "A" => Some(Vec2::new(0.0, 0.0)),
            "B" => Some(Vec2::new(10.0, 0.0)),
            _ => Some(Vec2::new(200.0, 0.0)),
        });

        // (5, 0) lies inside both A and B; B comes later in draw order
        assert_eq!(scene.hit_test(Vec2::new(5.0, 0.0)), Some(NodeId::from("B")));
        assert_eq!(scene.hit_test(Vec2::new(-15.0, 0.0)), Some(NodeId::from("A")));
        assert_eq!(scene.hit_test(Vec2::new(100.0, 0.0)), None);

        // draw order follows the latest render
        scene.render(&nodes(&["B", "A", "C"]), &[]);
        assert_eq!(scene.hit_test(Vec2::new(5.0, 0.0)), Some(NodeId::from("A")));
    }

    #[test]
    fn link_stroke_transition_saturates() {
        let mut scene = Scene::new(Duration::from_millis(800));
        scene.render(&nodes(&["A", "B"]), &[Edge::new("A", "B", 1)]);
        scene.advance_transitions(Duration::from_millis(400));
        let t = scene.links.get(&key("A", "B")).map(|l| l.stroke_t).unwrap_or(0.0);
        assert!((t - 0.5).abs() < 1e-4);

        scene.advance_transitions(Duration::from_secs(5));
        let t = scene.links.get(&key("A", "B")).map(|l| l.stroke_t).unwrap_or(0.0);
        assert_eq!(t, 1.0);
    }
}
