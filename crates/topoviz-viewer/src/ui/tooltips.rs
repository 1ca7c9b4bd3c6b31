use bevy_egui::egui;
use topoviz_core::Node;

pub fn node_tooltip(ctx: &egui::Context, pos: egui::Pos2, node: &Node) {
    egui::Area::new(egui::Id::new("node_tooltip"))
        .order(egui::Order::Tooltip)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            ui.group(|ui| {
                ui.strong(node.id.as_str());
                if let Some(ip) = &node.ip {
                    ui.label(format!("ip: {ip}"));
                }
                for (k, v) in &node.attrs {
                    ui.label(format!("{k}: {v}"));
                }
            });
        });
}
