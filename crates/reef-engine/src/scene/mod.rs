//! Scene description: camera and the fixed demo content.

mod camera;
mod config;

pub use camera::{Camera, CameraConfig, Viewport};
pub use config::{Material, SceneConfig};
