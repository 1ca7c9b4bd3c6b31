use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::GraphState;

pub fn log_panel(mut contexts: EguiContexts, st: Res<GraphState>) {
    egui::TopBottomPanel::bottom("log")
        .resizable(true)
        .default_height(140.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                ui.heading("Routing log");
                ui.label(format!(
                    "{}/{}",
                    st.playback.log().len(),
                    st.playback.total_steps().max(st.playback.log().len())
                ));
            });
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for entry in st.playback.log() {
                        ui.monospace(&entry.text);
                    }
                });
        });
}
