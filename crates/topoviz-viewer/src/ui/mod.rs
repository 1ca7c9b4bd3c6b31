pub mod help;
pub mod hud;
pub mod log;
pub mod panel;
pub mod shortcuts;
pub mod tooltips;
pub mod windows;

pub use help::help_overlay;
pub use hud::hud_overlay;
pub use log::log_panel;
pub use panel::ui_panel;
pub use shortcuts::handle_shortcuts;
pub use windows::{notice_windows, topology_windows};
