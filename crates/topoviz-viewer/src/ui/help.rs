use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::GraphState;

pub fn help_overlay(mut contexts: EguiContexts, st: Res<GraphState>) {
    if !st.ui.help_open {
        return;
    }

    egui::Window::new("Help / Shortcuts")
        .collapsible(false)
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.label("Drag a router to pin it while the layout settles");
            ui.label("Space: stop playback");
            ui.label("Esc: close windows and notices");
            ui.label("?: toggle help");
        });
}
