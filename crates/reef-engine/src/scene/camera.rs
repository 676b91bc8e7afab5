use glam::{Mat4, Vec3};

use crate::device::SurfaceSize;

/// Full-surface viewport in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn full(size: SurfaceSize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.width as f32,
            height: size.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Fixed camera placement and lens.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub look_to: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(-0.9, 0.03, -0.9),
            look_to: Vec3::new(0.707, 0.0, 0.707),
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4,
            z_near: 0.001,
            z_far: 100.0,
        }
    }
}

/// Left-handed view/projection pair.
///
/// The view is fixed; the projection and viewport follow the surface size.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    view: Mat4,
    projection: Mat4,
    viewport: Viewport,
}

impl Camera {
    pub fn new(config: CameraConfig, size: SurfaceSize) -> Self {
        let view = Mat4::look_to_lh(config.eye, config.look_to.normalize(), config.up.normalize());
        let mut camera = Self {
            config,
            view,
            projection: Mat4::IDENTITY,
            viewport: Viewport::full(size),
        };
        camera.resize(size);
        camera
    }

    /// Recomputes projection and viewport for `size`.
    ///
    /// An empty size keeps the previous projection.
    pub fn resize(&mut self, size: SurfaceSize) {
        let Some(aspect) = size.aspect_ratio() else {
            return;
        };
        self.projection = Mat4::perspective_lh(self.config.fov_y, aspect, self.config.z_near, self.config.z_far);
        self.viewport = Viewport::full(size);
    }

    pub fn eye(&self) -> Vec3 {
        self.config.eye
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// `world`, then view, then projection.
    pub fn world_view_projection(&self, world: Mat4) -> Mat4 {
        self.projection * self.view * world
    }
}
