use std::time::Instant;

use glam::Mat4;

use crate::device::SurfaceSize;
use crate::error::Result;
use crate::geometry::SKY_INDEX_COUNT;
use crate::resources::{PsParams, VsParams};
use crate::scene::{Camera, Material, SceneConfig};
use crate::shader::Pass;
use crate::time::{AnimationClock, FrameCounter};

use super::RenderBackend;

/// Progress through one frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameState {
    Idle,
    Cleared,
    SkyDrawn,
    WaterDrawn,
    Presented,
}

impl FrameState {
    fn can_enter(self, next: FrameState) -> bool {
        use FrameState::*;
        matches!(
            (self, next),
            (Idle, Cleared)
                | (Cleared, SkyDrawn)
                | (SkyDrawn, WaterDrawn)
                | (WaterDrawn, Presented)
                | (Idle, Presented)
                | (Presented, Idle)
        )
    }
}

/// Per-frame policy: animation time, parameter values and draw order.
pub struct FrameRenderer {
    camera: Camera,
    counter: FrameCounter,
    clock: AnimationClock,
    material: Material,
    crest_factor: f32,
    clear_color: wgpu::Color,
    water_world: Mat4,
    state: FrameState,
}

impl FrameRenderer {
    pub fn new(scene: &SceneConfig, camera: Camera, counter: FrameCounter) -> Self {
        Self {
            camera,
            counter,
            clock: AnimationClock::new(scene.wave_interval),
            material: scene.material,
            crest_factor: scene.crest_factor,
            clear_color: scene.clear_color,
            water_world: Mat4::IDENTITY,
            state: FrameState::Idle,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// State reached by the last tick.
    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.camera.resize(size);
    }

    /// Restarts frame timing so a pause does not count as frame time.
    pub fn resume(&mut self, now: Instant) {
        self.counter.reset(now);
    }

    /// Renders and presents one frame.
    ///
    /// While `paused`, nothing is drawn and the last frame is presented
    /// again. An empty surface skips the tick entirely.
    pub fn tick<B: RenderBackend>(&mut self, backend: &mut B, now: Instant, paused: bool) -> Result<FrameState> {
        if backend.surface_size().is_empty() {
            self.counter.reset(now);
            return Ok(self.state);
        }

        self.enter(FrameState::Idle);

        if paused {
            backend.present()?;
            self.enter(FrameState::Presented);
            return Ok(self.state);
        }

        let elapsed = self.counter.sample(now);
        let time = self.clock.advance(elapsed);

        backend.begin_frame(self.clear_color, self.camera.viewport())?;
        self.enter(FrameState::Cleared);

        let wave_count = backend.wave_count();

        let sky_world = Mat4::IDENTITY;
        backend.update_vs_params(&self.vs_params(sky_world, time, wave_count))?;
        backend.update_ps_params(&PsParams::new(self.camera.eye(), &self.material))?;
        backend.draw(Pass::Sky, SKY_INDEX_COUNT)?;
        self.enter(FrameState::SkyDrawn);

        // Pixel parameters carry over from the sky pass.
        backend.update_vs_params(&self.vs_params(self.water_world, time, wave_count))?;
        let water_indices = backend.index_count(Pass::Water);
        backend.draw(Pass::Water, water_indices)?;
        self.enter(FrameState::WaterDrawn);

        backend.present()?;
        self.enter(FrameState::Presented);

        Ok(self.state)
    }

    fn vs_params(&self, world: Mat4, time: f32, wave_count: u32) -> VsParams {
        VsParams::new(
            self.camera.world_view_projection(world),
            world,
            time,
            wave_count,
            self.crest_factor,
        )
    }

    fn enter(&mut self, next: FrameState) {
        if self.state == next {
            return;
        }
        debug_assert!(
            self.state.can_enter(next),
            "invalid frame transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::render::mock::{Call, RecordingBackend};
    use crate::scene::CameraConfig;

    fn renderer(t0: Instant) -> FrameRenderer {
        let size = SurfaceSize::new(800, 600);
        FrameRenderer::new(
            &SceneConfig::default(),
            Camera::new(CameraConfig::default(), size),
            FrameCounter::start(t0),
        )
    }

    #[test]
    fn first_tick_draws_sky_then_water_and_presents() {
        let t0 = Instant::now();
        let mut backend = RecordingBackend::new(SurfaceSize::new(800, 600), 15_000);
        let mut r = renderer(t0);

        let state = r.tick(&mut backend, t0 + Duration::from_millis(16), false).unwrap();
        assert_eq!(state, FrameState::Presented);

        assert_eq!(backend.draws(), vec![(Pass::Sky, 36), (Pass::Water, 15_000)]);
        assert_eq!(backend.count(|c| matches!(c, Call::Present)), 1);
    }

    #[test]
    fn parameter_pushes_precede_their_draws() {
        let t0 = Instant::now();
        let mut backend = RecordingBackend::new(SurfaceSize::new(800, 600), 6);
        let mut r = renderer(t0);
        r.tick(&mut backend, t0 + Duration::from_secs(1), false).unwrap();

        let kinds: Vec<&str> = backend.calls().iter().map(Call::kind).collect();
        assert_eq!(kinds, ["begin", "vs", "ps", "draw", "vs", "draw", "present"]);

        let vs: Vec<VsParams> = backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::UpdateVs(p) => Some(*p),
                _ => None,
            })
            .collect();
        // 1s of a 4s cycle.
        assert!((vs[0].time - 0.25).abs() < 1e-6);
        assert_eq!(vs[0].wave_count, 3);
        assert_eq!(vs[0].crest_factor, 0.3);
        assert_eq!(vs[1].world, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn paused_tick_only_presents() {
        let t0 = Instant::now();
        let mut backend = RecordingBackend::new(SurfaceSize::new(800, 600), 6);
        let mut r = renderer(t0);
        r.tick(&mut backend, t0 + Duration::from_millis(500), false).unwrap();
        let time = r.clock().time();
        backend.clear();

        let state = r.tick(&mut backend, t0 + Duration::from_secs(2), true).unwrap();
        assert_eq!(state, FrameState::Presented);
        assert_eq!(backend.calls(), vec![Call::Present]);
        assert_eq!(r.clock().time(), time);
    }

    #[test]
    fn empty_surface_skips_tick() {
        let t0 = Instant::now();
        let mut backend = RecordingBackend::new(SurfaceSize::new(0, 0), 6);
        let mut r = renderer(t0);
        r.tick(&mut backend, t0 + Duration::from_millis(16), false).unwrap();
        assert!(backend.calls().is_empty());
        assert_eq!(r.clock().time(), 0.0);
    }

    #[test]
    fn clock_wraps_across_ticks() {
        let t0 = Instant::now();
        let mut backend = RecordingBackend::new(SurfaceSize::new(800, 600), 6);
        let mut r = renderer(t0);
        r.tick(&mut backend, t0 + Duration::from_secs(3), false).unwrap();
        assert!((r.clock().time() - 0.75).abs() < 1e-6);
        r.tick(&mut backend, t0 + Duration::from_secs(4), false).unwrap();
        assert_eq!(r.clock().time(), 0.0);
    }
}
