use bevy::prelude::*;

/// The canvas is painted by egui; the camera only gives the window a surface.
pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}
