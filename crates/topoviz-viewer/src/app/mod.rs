use bevy::prelude::*;

use crate::app::resources::{NetRuntime, NetRx, NetTx, SimClient};
use crate::graph::GraphState;
use crate::net::spawn_simulate;
use crate::util::config::ViewerConfig;

pub mod resources;

pub struct TopoVizViewerPlugin {
    pub cfg: ViewerConfig,
    /// Topology JSON loaded before the first frame.
    pub initial_topology: Option<String>,
}

impl Plugin for TopoVizViewerPlugin {
    fn build(&self, app: &mut App) {
        let mut st = GraphState::from_config(&self.cfg);
        if let Some(text) = &self.initial_topology {
            // failures are already queued as a notice
            let _ = st.import_topology(text);
        }
        app.insert_resource(st)
            .add_systems(Startup, crate::render::setup_camera)
            .add_systems(
                Update,
                (
                    pump_network,
                    crate::ui::handle_shortcuts,
                    crate::ui::ui_panel,
                    crate::ui::log_panel,
                    crate::ui::hud_overlay,
                    crate::ui::help_overlay,
                    crate::ui::topology_windows,
                    crate::ui::notice_windows,
                    crate::render::draw_canvas,
                    advance_frame,
                )
                    .chain(),
            );
    }
}

fn pump_network(mut st: ResMut<GraphState>, rx: Res<NetRx>) {
    for msg in rx.0.try_iter().take(1_000) {
        st.apply(msg);
    }
}

fn advance_frame(time: Res<Time>, mut st: ResMut<GraphState>) {
    let dt = time.delta();
    let secs = dt.as_secs_f32();
    if secs > 0.0 {
        let fps = 1.0 / secs;
        st.perf.fps = if st.perf.fps == 0.0 {
            fps
        } else {
            st.perf.fps * 0.9 + fps * 0.1
        };
    }
    st.tick(dt);
}

/// Starts a simulate round trip for the current topology and protocol.
pub fn request_simulation(st: &mut GraphState, rt: &NetRuntime, client: &SimClient, tx: &NetTx) {
    let req = st.begin_simulate();
    spawn_simulate(rt.0.handle(), client.0.clone(), req, tx.0.clone());
}
