pub mod camera;
pub mod canvas;

pub use camera::setup_camera;
pub use canvas::draw_canvas;
