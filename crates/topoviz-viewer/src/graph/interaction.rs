use bevy::math::Vec2;
use std::collections::HashMap;
use topoviz_core::NodeId;

use crate::graph::layout::LayoutEngine;

pub const DRAG_ALPHA_FLOOR: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
}

/// Per-node drag gestures: idle -> dragging -> idle.
#[derive(Debug)]
pub struct Interaction {
    floor: f32,
    active: HashMap<NodeId, Vec2>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(DRAG_ALPHA_FLOOR)
    }
}

impl Interaction {
    pub fn new(floor: f32) -> Self {
        Self {
            floor,
            active: HashMap::new(),
        }
    }

    pub fn set_floor(&mut self, floor: f32) {
        self.floor = floor.clamp(0.0, 1.0);
    }

    pub fn phase(&self, id: &NodeId) -> DragPhase {
        if self.active.contains_key(id) {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    pub fn drag_start(&mut self, layout: &mut LayoutEngine, id: &NodeId) -> bool {
        if self.active.contains_key(id) {
            return false;
        }
        let Some(at) = layout.position(id) else {
            return false;
        };
        layout.reheat(self.floor);
        layout.pin(id, at);
        self.active.insert(id.clone(), at);
        tracing::trace!(node = %id, "drag start");
        true
    }

    pub fn drag_move(&mut self, layout: &mut LayoutEngine, id: &NodeId, to: Vec2) {
        let Some(pin) = self.active.get_mut(id) else {
            return;
        };
        *pin = to;
        layout.pin(id, to);
    }

    pub fn drag_end(&mut self, layout: &mut LayoutEngine, id: &NodeId) {
        if self.active.remove(id).is_none() {
            return;
        }
        layout.unpin(id);
        if self.active.is_empty() {
            layout.cool();
        }
        tracing::trace!(node = %id, "drag end");
    }

    /// Re-applies held pins after the layout was rebuilt. Gestures on ids the
    /// new layout does not contain are dropped.
    pub fn reapply(&mut self, layout: &mut LayoutEngine) {
        self.active.retain(|id, at| layout.pin(id, *at));
        if self.active.is_empty() {
            layout.cool();
        } else {
            layout.reheat(self.floor);
        }
    }
}
