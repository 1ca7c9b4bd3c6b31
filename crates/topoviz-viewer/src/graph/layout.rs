use bevy::math::Vec2;
use std::collections::HashMap;
use topoviz_core::{Node, NodeId};

use crate::graph::scene::ResolvedEdge;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    pub link_distance: f32,
    pub charge_strength: f32,
    pub center: Vec2,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 150.0,
            charge_strength: -500.0,
            center: Vec2::ZERO,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimNode {
    pub id: NodeId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub pin: Option<Vec2>,
}

#[derive(Debug, Clone, Copy)]
struct SimLink {
    source: usize,
    target: usize,
    strength: f32,
    bias: f32,
}

// Same generator d3 uses for jiggle, so coincident nodes split reproducibly.
#[derive(Debug, Clone)]
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f32 {
        self.0 = (1_664_525 * self.0 + 1_013_904_223) % 4_294_967_296;
        (self.0 as f64 / 4_294_967_296.0) as f32
    }

    fn jiggle(&mut self) -> f32 {
        (self.next() - 0.5) * 1e-6
    }
}

/// Force-directed layout with link, many-body and centering forces.
///
/// A new node/link set means a new simulation: call [`LayoutEngine::rebuild`],
/// which restarts the energy at 1 and seeds positions from the caller.
pub struct LayoutEngine {
    params: ForceParams,
    nodes: Vec<SimNode>,
    index: HashMap<NodeId, usize>,
    links: Vec<SimLink>,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    rng: Lcg,
}

impl LayoutEngine {
    pub fn new(params: ForceParams) -> Self {
        Self {
            params,
            nodes: Vec::new(),
            index: HashMap::new(),
            links: Vec::new(),
            alpha: 1.0,
            alpha_target: 0.0,
            running: false,
            rng: Lcg(1),
        }
    }

    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.params.center = center;
    }

    pub fn set_link_distance(&mut self, d: f32) {
        self.params.link_distance = d.max(0.1);
    }

    pub fn set_charge_strength(&mut self, s: f32) {
        self.params.charge_strength = s;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn node(&self, id: &NodeId) -> Option<&SimNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn position(&self, id: &NodeId) -> Option<Vec2> {
        self.node(id).map(|n| n.pos)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Replaces the simulation with one over `nodes`/`links`.
    ///
    /// Each node's start position is `seed(id)` if known, then the node's own
    /// `x`/`y`, then a phyllotaxis spot around the center. Pins on surviving
    /// ids carry over, as does the energy target while a drag holds it up.
    pub fn rebuild(
        &mut self,
        nodes: &[Node],
        links: &[ResolvedEdge],
        seed: impl Fn(&NodeId) -> Option<Vec2>,
    ) {
        let old_pins: HashMap<NodeId, Vec2> = self
            .nodes
            .iter()
            .filter_map(|n| n.pin.map(|p| (n.id.clone(), p)))
            .collect();

        self.nodes.clear();
        self.index.clear();
        self.links.clear();

        let golden = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        for n in nodes {
            if self.index.contains_key(&n.id) {
                continue;
            }
            let i = self.nodes.len();
            let pos = seed(&n.id)
                .or_else(|| match (n.x, n.y) {
                    (Some(x), Some(y)) => Some(Vec2::new(x, y)),
                    _ => None,
                })
                .unwrap_or_else(|| {
                    let r = 10.0 * (0.5 + i as f32).sqrt();
                    let a = i as f32 * golden;
                    self.params.center + Vec2::new(r * a.cos(), r * a.sin())
                });
            let pin = old_pins.get(&n.id).copied();
            self.index.insert(n.id.clone(), i);
            self.nodes.push(SimNode {
                id: n.id.clone(),
                pos: pin.unwrap_or(pos),
                vel: Vec2::ZERO,
                pin,
            });
        }

        let mut degree = vec![0usize; self.nodes.len()];
        let mut pairs = Vec::with_capacity(links.len());
        for l in links {
            let (Some(&s), Some(&t)) = (self.index.get(&l.source), self.index.get(&l.target))
            else {
                continue;
            };
            degree[s] += 1;
            degree[t] += 1;
            pairs.push((s, t));
        }
        for (s, t) in pairs {
            let (ds, dt) = (degree[s] as f32, degree[t] as f32);
            self.links.push(SimLink {
                source: s,
                target: t,
                strength: 1.0 / ds.min(dt),
                bias: ds / (ds + dt),
            });
        }

        if old_pins.is_empty() {
            self.alpha_target = 0.0;
        }
        self.alpha = 1.0;
        self.running = true;
    }

    /// Lifts the energy target to at least `floor` and wakes the simulation.
    pub fn reheat(&mut self, floor: f32) {
        if self.alpha_target < floor {
            self.alpha_target = floor;
        }
        self.running = true;
    }

    /// Puts full energy back into the current simulation.
    pub fn restart(&mut self) {
        self.alpha = 1.0;
        self.running = true;
    }

    /// Lets the energy decay back to rest.
    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    pub fn pin(&mut self, id: &NodeId, at: Vec2) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        self.nodes[i].pin = Some(at);
        true
    }

    pub fn unpin(&mut self, id: &NodeId) {
        if let Some(&i) = self.index.get(id) {
            self.nodes[i].pin = None;
        }
    }

    /// One integration step. Returns false once the energy has run out.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        self.apply_links();
        self.apply_charge();
        self.apply_center();

        let keep = 1.0 - self.params.velocity_decay.clamp(0.0, 1.0);
        for n in &mut self.nodes {
            match n.pin {
                Some(p) => {
                    n.pos = p;
                    n.vel = Vec2::ZERO;
                }
                None => {
                    n.vel *= keep;
                    n.pos += n.vel;
                }
            }
        }

        if self.alpha < self.params.alpha_min {
            self.running = false;
        }
        true
    }

    fn apply_links(&mut self) {
        let distance = self.params.link_distance.max(0.1);
        for l in &self.links {
            let (s, t) = (&self.nodes[l.source], &self.nodes[l.target]);
            let mut d = (t.pos + t.vel) - (s.pos + s.vel);
            if d.x == 0.0 {
                d.x = self.rng.jiggle();
            }
            if d.y == 0.0 {
                d.y = self.rng.jiggle();
            }
            let len = d.length();
            let k = (len - distance) / len * self.alpha * l.strength;
            d *= k;
            self.nodes[l.target].vel -= d * l.bias;
            self.nodes[l.source].vel += d * (1.0 - l.bias);
        }
    }

    fn apply_charge(&mut self) {
        let strength = self.params.charge_strength;
        let n = self.nodes.len();
        let mut dv = vec![Vec2::ZERO; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut d = self.nodes[j].pos - self.nodes[i].pos;
                if d.x == 0.0 {
                    d.x = self.rng.jiggle();
                }
                if d.y == 0.0 {
                    d.y = self.rng.jiggle();
                }
                let mut l = d.length_squared();
                if l < 1.0 {
                    l = l.sqrt();
                }
                dv[i] += d * strength * self.alpha / l;
            }
        }
        for (node, dv) in self.nodes.iter_mut().zip(dv) {
            node.vel += dv;
        }
    }

    fn apply_center(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        let sum: Vec2 = self.nodes.iter().map(|n| n.pos).sum();
        let shift = sum / self.nodes.len() as f32 - self.params.center;
        for n in &mut self.nodes {
            n.pos -= shift;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn chain(ids: &[&str]) -> (Vec<Node>, Vec<ResolvedEdge>) {
        let nodes = ids.iter().map(|i| Node::new(*i, "10.0.0.1")).collect();
        let links = ids
            .windows(2)
            .map(|w| ResolvedEdge {
                source: id(w[0]),
                target: id(w[1]),
                cost: 1,
            })
            .collect();
        (nodes, links)
    }

    fn engine() -> LayoutEngine {
        LayoutEngine::new(ForceParams {
            center: Vec2::new(400.0, 300.0),
            ..Default::default()
        })
    }

    #[test]
    fn settles_and_stops_ticking() {
        let (nodes, links) = chain(&["A", "B", "C"]);
        let mut layout = engine();
        layout.rebuild(&nodes, &links, |_| None);

        let mut ticks = 0;
        while layout.tick() {
            ticks += 1;
            assert!(ticks < 1000, "simulation never cooled");
        }
        assert!(!layout.is_running());
        assert!(layout.alpha() < layout.params().alpha_min);
        // 1 - 0.001^(1/300) per tick from alpha 1 cools in about 300 ticks.
        assert!((290..=310).contains(&ticks));
    }

    #[test]
    fn linked_pair_approaches_link_distance() {
        let (nodes, links) = chain(&["A", "B"]);
        let mut layout = engine();
        layout.rebuild(&nodes, &links, |_| None);
        while layout.tick() {}

        let a = layout.position(&id("A")).expect("A");
        let b = layout.position(&id("B")).expect("B");
        // repulsion pushes the pair somewhat past the rest length
        let d = a.distance(b);
        assert!(d > 100.0 && d < 400.0, "distance {d}");
    }

    #[test]
    fn layout_is_centered_on_viewport() {
        let (nodes, links) = chain(&["A", "B", "C", "D"]);
        let mut layout = engine();
        layout.rebuild(&nodes, &links, |_| None);
        layout.tick();

        let mean: Vec2 = nodes
            .iter()
            .filter_map(|n| layout.position(&n.id))
            .sum::<Vec2>()
            / nodes.len() as f32;
        assert!(mean.distance(Vec2::new(400.0, 300.0)) < 50.0);
    }

    #[test]
    fn rebuild_seeds_surviving_positions_and_resets_energy() {
        let (nodes, links) = chain(&["A", "B"]);
        let mut layout = engine();
        layout.rebuild(&nodes, &links, |_| None);
        for _ in 0..50 {
            layout.tick();
        }
        assert!(layout.alpha() < 1.0);

        let seeded = Vec2::new(123.0, 456.0);
        layout.rebuild(&nodes, &links, |n| (n.as_str() == "A").then_some(seeded));
        assert_eq!(layout.position(&id("A")), Some(seeded));
        assert_eq!(layout.alpha(), 1.0);
        assert!(layout.is_running());
    }

    #[test]
    fn imported_coordinates_seed_new_nodes() {
        let mut node = Node::new("A", "10.0.0.1");
        node.x = Some(7.0);
        node.y = Some(9.0);
        let mut layout = engine();
        layout.rebuild(&[node], &[], |_| None);
        assert_eq!(layout.position(&id("A")), Some(Vec2::new(7.0, 9.0)));
    }

    #[test]
    fn pinned_node_stays_put() {
        let (nodes, links) = chain(&["A", "B", "C"]);
        let mut layout = engine();
        layout.rebuild(&nodes, &links, |_| None);
        let at = Vec2::new(50.0, 60.0);
        assert!(layout.pin(&id("B"), at));

        for _ in 0..20 {
            layout.tick();
        }
        let b = layout.node(&id("B")).expect("B");
        assert_eq!(b.pos, at);
        assert_eq!(b.vel, Vec2::ZERO);
    }

    #[test]
    fn reheat_keeps_simulation_alive() {
        let (nodes, links) = chain(&["A", "B"]);
        let mut layout = engine();
        layout.rebuild(&nodes, &links, |_| None);
        layout.reheat(0.3);

        for _ in 0..2000 {
            assert!(layout.tick());
        }
        assert!((layout.alpha() - 0.3).abs() < 0.01);

        layout.cool();
        let mut guard = 0;
        while layout.tick() {
            guard += 1;
            assert!(guard < 2000);
        }
        assert!(!layout.is_running());
    }

    #[test]
    fn coincident_nodes_separate() {
        let mut a = Node::new("A", "10.0.0.1");
        a.x = Some(0.0);
        a.y = Some(0.0);
        let mut b = a.clone();
        b.id = id("B");
        let mut layout = engine();
        layout.rebuild(&[a, b], &[], |_| None);
        for _ in 0..30 {
            layout.tick();
        }
        let pa = layout.position(&id("A")).expect("A");
        let pb = layout.position(&id("B")).expect("B");
        assert!(pa.distance(pb) > 1.0);
    }
}
