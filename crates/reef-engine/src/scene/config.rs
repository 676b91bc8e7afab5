use std::path::PathBuf;

use glam::Vec3;

use crate::resources::{Wave, DEFAULT_WAVES};
use crate::shader::EntryPoints;

use super::camera::CameraConfig;

/// Water shading coefficients and lighting.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub water_color: Vec3,
    /// Refraction distortion (`d`).
    pub distortion: f32,
    /// Specular sharpness (`s`).
    pub specular: f32,
    pub reflectivity: f32,
    pub transmittance: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            light_position: Vec3::new(0.0, 1.0, 0.0),
            light_color: Vec3::new(1.0, 1.0, 0.8),
            water_color: Vec3::new(0.0, 0.5, 1.0),
            distortion: 0.7,
            specular: 0.4,
            reflectivity: 0.3,
            transmittance: 0.9,
        }
    }
}

/// Everything the renderer draws, fixed at startup.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub shader_path: PathBuf,
    pub entry_points: EntryPoints,
    pub cubemap_path: PathBuf,

    /// Water patches along X and Z.
    pub grid: (u32, u32),
    pub waves: Vec<Wave>,
    /// Seconds per animation cycle.
    pub wave_interval: f32,
    pub crest_factor: f32,

    pub camera: CameraConfig,
    pub material: Material,
    pub clear_color: wgpu::Color,
    pub max_anisotropy: u16,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            shader_path: PathBuf::from("assets/reef.wgsl"),
            entry_points: EntryPoints::default(),
            cubemap_path: PathBuf::from("assets/reef.dds"),
            grid: (50, 50),
            waves: DEFAULT_WAVES.to_vec(),
            wave_interval: 4.0,
            crest_factor: 0.3,
            camera: CameraConfig::default(),
            material: Material::default(),
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.5,
                b: 1.0,
                a: 1.0,
            },
            max_anisotropy: 16,
        }
    }
}
