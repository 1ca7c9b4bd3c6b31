use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};
use std::time::Duration;
use topoviz_core::NodeId;

use crate::app::request_simulation;
use crate::app::resources::{NetRuntime, NetTx, SimClient};
use crate::graph::{GraphState, NoticeLevel};
use crate::util::config;

fn node_picker(
    ui: &mut egui::Ui,
    salt: &str,
    label: &str,
    ids: &[NodeId],
    pick: &mut Option<NodeId>,
) {
    if pick.as_ref().is_some_and(|p| !ids.contains(p)) {
        *pick = None;
    }
    egui::ComboBox::from_id_source(salt)
        .selected_text(pick.as_ref().map(|p| p.as_str()).unwrap_or("(select)"))
        .show_ui(ui, |ui| {
            for id in ids {
                ui.selectable_value(pick, Some(id.clone()), id.as_str());
            }
        });
    ui.label(label);
}

pub fn ui_panel(
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
    rt: Res<NetRuntime>,
    client: Res<SimClient>,
    tx: Res<NetTx>,
) {
    egui::SidePanel::left("left")
        .default_width(260.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("TopoViz");
            ui.label(format!("routers: {}", st.store.nodes().len()));
            ui.label(format!("links: {}", st.store.edges().len()));
            ui.separator();

            // ----- Add router -----
            ui.heading("Add router");
            ui.horizontal(|ui| {
                ui.label("ID:");
                ui.text_edit_singleline(&mut st.ui.router_id);
            });
            ui.horizontal(|ui| {
                ui.label("IP:");
                ui.text_edit_singleline(&mut st.ui.router_ip);
            });
            if ui.button("Add Router").clicked() {
                let (id, ip) = (st.ui.router_id.clone(), st.ui.router_ip.clone());
                if st.add_node(&id, &ip) {
                    st.ui.router_id.clear();
                    st.ui.router_ip.clear();
                }
            }

            // ----- Add link -----
            ui.add_space(8.0);
            ui.separator();
            ui.heading("Add link");
            let ids = st.store.node_ids();
            let ui_state = &mut st.ui;
            ui.horizontal(|ui| {
                node_picker(ui, "link_source", "source", &ids, &mut ui_state.link_source);
            });
            ui.horizontal(|ui| {
                node_picker(ui, "link_target", "target", &ids, &mut ui_state.link_target);
            });
            ui.horizontal(|ui| {
                ui.label("Cost:");
                ui.text_edit_singleline(&mut ui_state.link_cost);
            });
            if ui.button("Add Link").clicked() {
                let source = st.ui.link_source.clone().map(|n| n.0).unwrap_or_default();
                let target = st.ui.link_target.clone().map(|n| n.0).unwrap_or_default();
                let cost = st.ui.link_cost.clone();
                if st.add_link(&source, &target, &cost) {
                    st.ui.link_cost.clear();
                }
            }

            // ----- Simulation -----
            ui.add_space(8.0);
            ui.separator();
            ui.heading("Simulation");
            let protocols = st.ui.protocols.clone();
            let selected = st.sim.protocol.clone();
            egui::ComboBox::from_label("protocol")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for p in &protocols {
                        ui.selectable_value(&mut st.sim.protocol, p.clone(), p.as_str());
                    }
                });
            let mut ms = st.playback.interval().as_millis() as u64;
            if ui
                .add(egui::Slider::new(&mut ms, 100..=5000).text("step ms"))
                .changed()
            {
                st.playback.set_interval(Duration::from_millis(ms));
            }
            ui.horizontal(|ui| {
                // a second click supersedes the pending request
                if ui.button("Simulate").clicked() {
                    request_simulation(&mut st, &rt, &client, &tx);
                }
                if ui
                    .add_enabled(st.playback.is_running(), egui::Button::new("Stop"))
                    .clicked()
                {
                    st.stop_playback();
                }
            });

            // ----- Topology -----
            ui.add_space(8.0);
            ui.separator();
            ui.heading("Topology");
            ui.horizontal(|ui| {
                if ui.button("Export").clicked() {
                    match st.export_topology() {
                        Ok(text) => {
                            tracing::info!(topology = %text, "topology exported");
                            ui.ctx().output_mut(|o| o.copied_text = text.clone());
                            st.ui.export_text = text;
                            st.ui.export_open = true;
                        }
                        Err(e) => st.notify(NoticeLevel::Error, format!("Export failed: {e:#}")),
                    }
                }
                if ui.button("Import").clicked() {
                    st.ui.import_text.clear();
                    st.ui.import_open = true;
                }
                if ui.button("Clear").clicked() {
                    st.clear();
                }
            });

            // ----- Layout -----
            ui.add_space(8.0);
            ui.separator();
            ui.heading("Layout");
            let mut distance = st.layout.params().link_distance;
            let mut charge = st.layout.params().charge_strength;
            let dist_changed = ui
                .add(egui::Slider::new(&mut distance, 20.0..=400.0).text("link distance"))
                .changed();
            let charge_changed = ui
                .add(egui::Slider::new(&mut charge, -2000.0..=0.0).text("charge"))
                .changed();
            if dist_changed || charge_changed {
                st.layout.set_link_distance(distance);
                st.layout.set_charge_strength(charge);
                st.layout.restart();
            }

            if ui.button("Save settings").clicked() {
                match config::save(&st.current_config()) {
                    Ok(()) => tracing::info!("viewer settings saved"),
                    Err(e) => {
                        st.notify(NoticeLevel::Error, format!("Saving settings failed: {e:#}"))
                    }
                }
            }

            ui.add_space(10.0);
            ui.separator();
            if ui.button("Help (?)").clicked() {
                st.ui.help_open = true;
            }
        });
}
