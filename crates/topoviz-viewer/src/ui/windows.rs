use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};

use crate::graph::{GraphState, NoticeLevel};

pub fn topology_windows(mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    let ctx = contexts.ctx_mut();

    if st.ui.export_open {
        let mut open = true;
        egui::Window::new("Export topology")
            .open(&mut open)
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.label("Copied to clipboard.");
                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut st.ui.export_text.as_str())
                            .code_editor()
                            .desired_width(f32::INFINITY),
                    );
                });
                if ui.button("Copy again").clicked() {
                    let text = st.ui.export_text.clone();
                    ui.ctx().output_mut(|o| o.copied_text = text);
                }
            });
        st.ui.export_open = open;
    }

    if st.ui.import_open {
        let mut open = true;
        let mut submit = false;
        egui::Window::new("Import topology")
            .open(&mut open)
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.label("Paste topology JSON:");
                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut st.ui.import_text)
                            .code_editor()
                            .desired_rows(12)
                            .desired_width(f32::INFINITY),
                    );
                });
                submit = ui.button("Load").clicked();
            });
        if submit {
            let text = std::mem::take(&mut st.ui.import_text);
            // a failed import keeps the window open with the text for fixing
            match st.import_topology(&text) {
                Ok(()) => open = false,
                Err(_) => st.ui.import_text = text,
            }
        }
        st.ui.import_open = open;
    }
}

pub fn notice_windows(mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    let Some(notice) = st.notices.front().cloned() else {
        return;
    };
    let title = match notice.level {
        NoticeLevel::Info => "Notice",
        NoticeLevel::Error => "Error",
    };
    let mut dismissed = false;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 40.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.label(&notice.text);
            if st.notices.len() > 1 {
                ui.weak(format!("{} more", st.notices.len() - 1));
            }
            dismissed = ui.button("OK").clicked();
        });
    if dismissed {
        st.dismiss_notice();
    }
}
