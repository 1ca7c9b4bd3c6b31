use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::playback::PlaybackPhase;
use crate::graph::{GraphState, RenderSource};

pub fn hud_overlay(mut contexts: EguiContexts, st: Res<GraphState>) {
    egui::Area::new("hud".into())
        .order(egui::Order::Foreground)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.group(|ui| {
                ui.label(format!("FPS: {:.0}", st.perf.fps));
                ui.label(format!(
                    "Scene: {} nodes / {} links",
                    st.scene.markers.len(),
                    st.scene.links.len()
                ));
                ui.label(format!(
                    "Layout: alpha {:.3}{}",
                    st.layout.alpha(),
                    if st.layout.is_running() { "" } else { " (at rest)" }
                ));
                let status = match (st.is_requesting(), st.playback.phase()) {
                    (true, _) => format!("Simulating with {}...", st.sim.protocol),
                    (false, PlaybackPhase::Running) => format!(
                        "Playing step {}/{}",
                        st.playback.cursor(),
                        st.playback.total_steps()
                    ),
                    (false, PlaybackPhase::Idle) => "Idle".to_string(),
                };
                ui.label(status);
                if st.source == RenderSource::Playback {
                    ui.label("Showing simulation snapshot");
                }
            });
        });
}
