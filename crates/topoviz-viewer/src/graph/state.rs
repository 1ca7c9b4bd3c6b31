use bevy::math::Vec2;
use bevy::prelude::Resource;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use topoviz_core::{Edge, Node, NodeId};

use crate::graph::interaction::Interaction;
use crate::graph::layout::{ForceParams, LayoutEngine};
use crate::graph::model::GraphStore;
use crate::graph::playback::{PlayOutcome, PlaybackController};
use crate::graph::scene::Scene;
use crate::net::{Incoming, IncomingKind, SimulateRequest};
use crate::util::config::ViewerConfig;

pub const NO_STEPS_MESSAGE: &str =
    "No steps returned from simulation. Check your topology or algorithm.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Who last handed the scene a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderSource {
    #[default]
    Static,
    Playback,
}

#[derive(Debug, Default)]
pub struct SimState {
    pub generation: u64,
    pub pending: Option<u64>,
    pub protocol: String,
}

#[derive(Debug, Default)]
pub struct UiState {
    pub router_id: String,
    pub router_ip: String,
    pub link_source: Option<NodeId>,
    pub link_target: Option<NodeId>,
    pub link_cost: String,
    pub protocols: Vec<String>,

    pub import_open: bool,
    pub import_text: String,
    pub export_open: bool,
    pub export_text: String,

    pub dragging: Option<NodeId>,
    pub hovered: Option<NodeId>,
    pub viewport: Vec2,
    pub background: [u8; 3],
    pub help_open: bool,
}

#[derive(Debug, Default)]
pub struct PerfState {
    pub fps: f32,
    pub layout_ticks: u64,
}

#[derive(Resource)]
pub struct GraphState {
    pub store: GraphStore,
    pub scene: Scene,
    pub layout: LayoutEngine,
    pub drag: Interaction,
    pub playback: PlaybackController,
    pub sim: SimState,
    pub ui: UiState,
    pub perf: PerfState,
    pub notices: VecDeque<Notice>,
    pub source: RenderSource,
    cfg: ViewerConfig,
}

impl Default for GraphState {
    fn default() -> Self {
        let mut st = Self {
            store: GraphStore::default(),
            scene: Scene::default(),
            layout: LayoutEngine::new(ForceParams::default()),
            drag: Interaction::default(),
            playback: PlaybackController::default(),
            sim: SimState::default(),
            ui: UiState::default(),
            perf: PerfState::default(),
            notices: VecDeque::new(),
            source: RenderSource::Static,
            cfg: ViewerConfig::default(),
        };
        st.apply_viewer_config(&ViewerConfig::default());
        st
    }
}

// Shared by static and playback renders; edges resolve against `nodes` only.
// Nodes already on screen restart the layout from where they are drawn.
fn render_target(
    scene: &mut Scene,
    layout: &mut LayoutEngine,
    drag: &mut Interaction,
    nodes: &[Node],
    edges: &[Edge],
) {
    let drawn: HashMap<NodeId, Vec2> = scene
        .markers
        .iter()
        .map(|(id, m)| (id.clone(), m.center))
        .collect();
    let (_, resolved) = scene.render(nodes, edges);
    layout.rebuild(nodes, &resolved, |id| drawn.get(id).copied());
    drag.reapply(layout);
    scene.publish_positions(|id| layout.position(id));
}

impl GraphState {
    pub fn from_config(cfg: &ViewerConfig) -> Self {
        let mut st = Self::default();
        st.apply_viewer_config(cfg);
        st
    }

    pub fn apply_viewer_config(&mut self, cfg: &ViewerConfig) {
        self.cfg = cfg.clone();
        self.layout.set_link_distance(cfg.link_distance);
        self.layout.set_charge_strength(cfg.charge_strength);
        self.drag.set_floor(cfg.drag_alpha_floor);
        self.playback
            .set_interval(Duration::from_millis(cfg.step_interval_ms));
        self.scene = Scene::new(Duration::from_millis(cfg.link_transition_ms))
            .with_node_radius(cfg.node_radius);
        self.ui.protocols = cfg.protocols.clone();
        self.ui.background = cfg.background;
        self.sim.protocol = cfg.default_protocol.clone();
        self.render_static();
    }

    /// The loaded config with the settings tuned in the panel folded back in.
    pub fn current_config(&self) -> ViewerConfig {
        let params = self.layout.params();
        ViewerConfig {
            link_distance: params.link_distance,
            charge_strength: params.charge_strength,
            step_interval_ms: self.playback.interval().as_millis() as u64,
            default_protocol: self.sim.protocol.clone(),
            ..self.cfg.clone()
        }
    }

    pub fn set_viewport(&mut self, size: Vec2) {
        if size == self.ui.viewport {
            return;
        }
        self.ui.viewport = size;
        self.layout.set_center(size * 0.5);
        self.layout.restart();
    }

    // ----- Static view -----
    pub fn render_static(&mut self) {
        self.source = RenderSource::Static;
        let graph = self.store.graph();
        render_target(
            &mut self.scene,
            &mut self.layout,
            &mut self.drag,
            &graph.nodes,
            &graph.edges,
        );
    }

    pub fn add_node(&mut self, id: &str, ip: &str) -> bool {
        let added = self.store.add_node(id, ip);
        if added {
            self.render_static();
        }
        added
    }

    /// `cost` is the raw form text; anything that is not an integer is ignored.
    pub fn add_link(&mut self, source: &str, target: &str, cost: &str) -> bool {
        let Ok(cost) = cost.trim().parse::<i64>() else {
            tracing::debug!(cost, "add link ignored: cost is not an integer");
            return false;
        };
        let added = self.store.add_edge(source, target, cost);
        if added {
            self.render_static();
        }
        added
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.ui.link_source = None;
        self.ui.link_target = None;
        self.render_static();
    }

    /// Replaces the topology with `text`. Blank input is ignored; on a parse
    /// error the current topology stays as it was.
    pub fn import_topology(&mut self, text: &str) -> anyhow::Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        if let Err(e) = self.store.import_json(text) {
            tracing::warn!(error = ?e, "topology import failed");
            self.notify(NoticeLevel::Error, format!("Import failed: {e:#}"));
            return Err(e);
        }
        tracing::info!(
            nodes = self.store.nodes().len(),
            edges = self.store.edges().len(),
            "topology imported"
        );
        self.ui.link_source = None;
        self.ui.link_target = None;
        self.render_static();
        Ok(())
    }

    /// The stored topology with current layout positions filled into `x`/`y`.
    pub fn export_topology(&self) -> anyhow::Result<String> {
        let mut snapshot = self.store.clone();
        snapshot.set_positions(|id| self.layout.position(id));
        snapshot.export_json()
    }

    // ----- Simulation -----
    /// Cancels playback, clears the log and captures the request to send.
    pub fn begin_simulate(&mut self) -> SimulateRequest {
        self.playback.stop();
        self.playback.clear_log();
        self.sim.generation += 1;
        self.sim.pending = Some(self.sim.generation);
        tracing::info!(
            generation = self.sim.generation,
            protocol = %self.sim.protocol,
            "simulate requested"
        );
        SimulateRequest {
            generation: self.sim.generation,
            topology: self.store.graph().clone(),
            protocol: self.sim.protocol.clone(),
        }
    }

    pub fn is_requesting(&self) -> bool {
        self.sim.pending.is_some()
    }

    pub fn apply(&mut self, inc: Incoming) {
        if self.sim.pending != Some(inc.generation) {
            tracing::debug!(
                generation = inc.generation,
                pending = ?self.sim.pending,
                "dropping result of superseded request"
            );
            return;
        }
        match inc.kind {
            IncomingKind::TopologyAccepted => {
                tracing::debug!(generation = inc.generation, "topology accepted");
            }
            IncomingKind::Steps(steps) => {
                self.sim.pending = None;
                match self.playback.play(steps) {
                    PlayOutcome::Started { .. } => self.source = RenderSource::Playback,
                    PlayOutcome::NoSteps => self.notify(NoticeLevel::Info, NO_STEPS_MESSAGE),
                }
            }
            IncomingKind::Failed(e) => {
                self.sim.pending = None;
                self.playback.stop();
                tracing::warn!(stage = e.stage(), generation = inc.generation, "simulate failed");
                self.notify(NoticeLevel::Error, format!("{e}. See log for details."));
            }
        }
    }

    pub fn stop_playback(&mut self) {
        self.playback.stop();
    }

    // ----- Per-frame -----
    pub fn tick(&mut self, dt: Duration) {
        let Self {
            playback,
            scene,
            layout,
            drag,
            source,
            ..
        } = self;
        playback.advance(dt, |step| {
            *source = RenderSource::Playback;
            let nodes = step.resolved_nodes();
            render_target(scene, layout, drag, &nodes, &step.edges);
        });

        self.scene.advance_transitions(dt);
        if self.layout.tick() {
            self.perf.layout_ticks += 1;
            let layout = &self.layout;
            self.scene.publish_positions(|id| layout.position(id));
        }
    }

    // ----- Drag -----
    pub fn drag_start(&mut self, id: &NodeId) -> bool {
        self.drag.drag_start(&mut self.layout, id)
    }

    pub fn drag_move(&mut self, id: &NodeId, to: Vec2) {
        self.drag.drag_move(&mut self.layout, id, to);
    }

    pub fn drag_end(&mut self, id: &NodeId) {
        self.drag.drag_end(&mut self.layout, id);
    }

    // ----- Notices -----
    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        let text = text.into();
        match level {
            NoticeLevel::Info => tracing::info!("{text}"),
            NoticeLevel::Error => tracing::warn!("{text}"),
        }
        self.notices.push_back(Notice { level, text });
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }
}
