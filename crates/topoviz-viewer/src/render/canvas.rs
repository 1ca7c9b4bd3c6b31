use bevy::math::Vec2;
use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};
use egui::{Align2, Color32, FontId, Pos2, Sense, Stroke};
use topoviz_core::NodeId;

use crate::graph::interaction::DragPhase;
use crate::graph::scene::{Scene, LABEL_FONT_SIZE, LINK_STROKE_WIDTH, NODE_STROKE_WIDTH};
use crate::graph::GraphState;
use crate::ui::tooltips::node_tooltip;

const NODE_FILL: Color32 = Color32::from_rgb(0x21, 0x96, 0xf3);
const NODE_STROKE: Color32 = Color32::WHITE;
const NODE_DRAG_STROKE: Color32 = Color32::from_rgb(0xff, 0x98, 0x00);
const LINK_IDLE: Color32 = Color32::from_rgb(0xaa, 0xaa, 0xaa);
const LINK_ACTIVE: Color32 = Color32::from_rgb(0x4c, 0xaf, 0x50);
const LABEL_COLOR: Color32 = Color32::WHITE;
const COST_COLOR: Color32 = Color32::BLACK;
const HINT_COLOR: Color32 = Color32::from_rgb(0x77, 0x77, 0x77);

fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}

fn to_screen(origin: Pos2, p: Vec2) -> Pos2 {
    origin + egui::vec2(p.x, p.y)
}

fn to_canvas(origin: Pos2, p: Pos2) -> Vec2 {
    let d = p - origin;
    Vec2::new(d.x, d.y)
}

/// The marker under the press position, falling back to the current pointer.
fn drag_target(scene: &Scene, pressed_at: Option<Vec2>, pointer: Option<Vec2>) -> Option<NodeId> {
    pressed_at.or(pointer).and_then(|p| scene.hit_test(p))
}

pub fn draw_canvas(mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    let [r, g, b] = st.ui.background;
    let frame = egui::Frame::none().fill(Color32::from_rgb(r, g, b));

    egui::CentralPanel::default()
        .frame(frame)
        .show(contexts.ctx_mut(), |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
            let rect = response.rect;
            let origin = rect.min;
            st.set_viewport(Vec2::new(rect.width(), rect.height()));

            // ----- Pointer -----
            let pointer = response
                .interact_pointer_pos()
                .or_else(|| response.hover_pos())
                .map(|p| to_canvas(origin, p));

            if response.drag_started() {
                // the drag is reported past egui's threshold; pick where the press began
                let pressed_at = ui
                    .input(|i| i.pointer.press_origin())
                    .map(|p| to_canvas(origin, p));
                if let Some(id) = drag_target(&st.scene, pressed_at, pointer) {
                    if st.drag_start(&id) {
                        st.ui.dragging = Some(id);
                    }
                }
            }
            if response.dragged() {
                if let (Some(id), Some(p)) = (st.ui.dragging.clone(), pointer) {
                    st.drag_move(&id, p);
                }
            }
            if response.drag_stopped() {
                if let Some(id) = st.ui.dragging.take() {
                    st.drag_end(&id);
                }
            }
            st.ui.hovered = match (st.ui.dragging.is_some(), pointer) {
                (false, Some(p)) if response.hovered() => st.scene.hit_test(p),
                _ => None,
            };

            // ----- Links, then nodes on top -----
            let font = FontId::proportional(LABEL_FONT_SIZE);
            for (_, line) in st.scene.links.iter() {
                let color = lerp_color(LINK_IDLE, LINK_ACTIVE, line.stroke_t);
                painter.line_segment(
                    [to_screen(origin, line.from), to_screen(origin, line.to)],
                    Stroke::new(LINK_STROKE_WIDTH, color),
                );
            }
            for (_, label) in st.scene.link_labels.iter() {
                painter.text(
                    to_screen(origin, label.pos),
                    Align2::CENTER_CENTER,
                    &label.text,
                    font.clone(),
                    COST_COLOR,
                );
            }
            for (id, marker) in st.scene.markers.iter() {
                let stroke = match st.drag.phase(id) {
                    DragPhase::Dragging => NODE_DRAG_STROKE,
                    DragPhase::Idle => NODE_STROKE,
                };
                painter.circle(
                    to_screen(origin, marker.center),
                    marker.radius,
                    NODE_FILL,
                    Stroke::new(NODE_STROKE_WIDTH, stroke),
                );
            }
            for (_, label) in st.scene.labels.iter() {
                painter.text(
                    to_screen(origin, label.pos),
                    Align2::CENTER_CENTER,
                    &label.text,
                    font.clone(),
                    LABEL_COLOR,
                );
            }

            if st.scene.markers.is_empty() {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "Add a router or import a topology to begin",
                    FontId::proportional(14.0),
                    HINT_COLOR,
                );
            }

            if let Some(marker) = st.ui.hovered.as_ref().and_then(|id| st.scene.markers.get(id)) {
                let at = to_screen(origin, marker.center) + egui::vec2(marker.radius + 6.0, 0.0);
                node_tooltip(ui.ctx(), at, &marker.datum);
            }
        });
}
