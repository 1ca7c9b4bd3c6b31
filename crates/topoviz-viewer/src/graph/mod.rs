pub mod interaction;
pub mod layout;
pub mod model;
pub mod playback;
pub mod reconcile;
pub mod scene;
pub mod state;

pub use state::{GraphState, Notice, NoticeLevel, RenderSource};
