use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};

use crate::graph::GraphState;

pub fn handle_shortcuts(mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    let ctx = contexts.ctx_mut();
    let esc_pressed = ctx.input(|i| i.key_pressed(egui::Key::Escape));
    let wants_keyboard = ctx.wants_keyboard_input();

    if esc_pressed {
        st.ui.import_open = false;
        st.ui.export_open = false;
        st.ui.help_open = false;
        st.dismiss_notice();
    }

    if wants_keyboard {
        return;
    }

    if ctx.input(|i| i.key_pressed(egui::Key::Space)) && st.playback.is_running() {
        tracing::info!("playback stopped from keyboard");
        st.stop_playback();
    }
    if ctx.input(|i| i.key_pressed(egui::Key::Questionmark)) {
        st.ui.help_open = !st.ui.help_open;
    }
}
