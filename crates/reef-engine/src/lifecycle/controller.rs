use std::time::Instant;

use crate::device::SurfaceSize;
use crate::error::Result;
use crate::render::{FrameRenderer, RenderBackend};

/// Notifications delivered by the OS collaborator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceEvent {
    Resized(SurfaceSize),
    /// Interactive resize started.
    ResizeBegin,
    /// Interactive resize finished.
    ResizeEnd,
    Repaint,
    Quit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Owns the renderer and applies events to it.
///
/// While an interactive resize is in progress the controller is paused:
/// ticks re-present the last frame and size changes are held back until the
/// resize ends, when exactly one resize is applied.
pub struct Controller<B: RenderBackend> {
    backend: B,
    renderer: FrameRenderer,
    paused: bool,
    pending_size: Option<SurfaceSize>,
}

impl<B: RenderBackend> Controller<B> {
    pub fn new(backend: B, renderer: FrameRenderer) -> Self {
        Self {
            backend,
            renderer,
            paused: false,
            pending_size: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    pub fn handle(&mut self, event: SurfaceEvent, now: Instant) -> Result<LoopControl> {
        match event {
            SurfaceEvent::Resized(size) => {
                if self.paused {
                    log::trace!("resize to {}x{} deferred", size.width, size.height);
                    self.pending_size = Some(size);
                } else {
                    self.apply_resize(size)?;
                }
            }
            SurfaceEvent::ResizeBegin => {
                log::debug!("interactive resize started; pausing");
                self.paused = true;
            }
            SurfaceEvent::ResizeEnd => {
                self.paused = false;
                self.renderer.resume(now);
                let size = self
                    .pending_size
                    .take()
                    .unwrap_or_else(|| self.backend.surface_size());
                log::debug!("interactive resize finished at {}x{}", size.width, size.height);
                self.apply_resize(size)?;
            }
            SurfaceEvent::Repaint => self.tick(now)?,
            SurfaceEvent::Quit => return Ok(LoopControl::Exit),
        }
        Ok(LoopControl::Continue)
    }

    /// Tears down the renderer in reverse creation order.
    pub fn shutdown(self) {
        let Self { backend, .. } = self;
        backend.teardown();
        log::info!("renderer shut down");
    }

    fn tick(&mut self, now: Instant) -> Result<()> {
        self.renderer.tick(&mut self.backend, now, self.paused)?;
        Ok(())
    }

    fn apply_resize(&mut self, size: SurfaceSize) -> Result<()> {
        self.backend.resize(size)?;
        self.renderer.resize(size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::render::mock::{Call, RecordingBackend};
    use crate::resources::Wave;
    use crate::scene::{Camera, CameraConfig, SceneConfig};
    use crate::shader::Pass;
    use crate::time::FrameCounter;

    fn controller(t0: Instant) -> Controller<RecordingBackend> {
        let size = SurfaceSize::new(800, 600);
        let renderer = FrameRenderer::new(
            &SceneConfig::default(),
            Camera::new(CameraConfig::default(), size),
            FrameCounter::start(t0),
        );
        Controller::new(RecordingBackend::new(size, 15_000), renderer)
    }

    #[test]
    fn first_repaint_draws_both_passes() {
        let t0 = Instant::now();
        let mut c = controller(t0);
        c.handle(SurfaceEvent::Repaint, t0 + Duration::from_millis(16)).unwrap();

        assert_eq!(c.backend().draws(), vec![(Pass::Sky, 36), (Pass::Water, 15_000)]);
        assert_eq!(c.backend().count(|call| matches!(call, Call::Present)), 1);
    }

    #[test]
    fn resize_burst_applies_one_final_resize() {
        let t0 = Instant::now();
        let mut c = controller(t0);

        c.handle(SurfaceEvent::ResizeBegin, t0).unwrap();
        assert!(c.is_paused());
        for w in [810, 820, 830] {
            c.handle(SurfaceEvent::Resized(SurfaceSize::new(w, 600)), t0).unwrap();
        }
        assert_eq!(c.backend().count(|call| matches!(call, Call::Resize(_))), 0);

        c.handle(SurfaceEvent::ResizeEnd, t0).unwrap();
        assert!(!c.is_paused());
        let resizes: Vec<Call> = c
            .backend()
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Resize(_)))
            .collect();
        assert_eq!(resizes, vec![Call::Resize(SurfaceSize::new(830, 600))]);
        assert_eq!(c.renderer().camera().viewport().width, 830.0);
    }

    #[test]
    fn paused_ticks_do_not_touch_parameters() {
        let t0 = Instant::now();
        let mut c = controller(t0);
        c.handle(SurfaceEvent::Repaint, t0 + Duration::from_millis(100)).unwrap();
        let time = c.renderer().clock().time();
        c.backend().clear();

        c.handle(SurfaceEvent::ResizeBegin, t0).unwrap();
        c.handle(SurfaceEvent::Repaint, t0 + Duration::from_secs(1)).unwrap();
        c.handle(SurfaceEvent::Repaint, t0 + Duration::from_secs(2)).unwrap();

        assert_eq!(c.backend().calls(), vec![Call::Present, Call::Present]);
        assert_eq!(c.renderer().clock().time(), time);
    }

    #[test]
    fn resume_does_not_count_paused_time() {
        let t0 = Instant::now();
        let mut c = controller(t0);
        c.handle(SurfaceEvent::ResizeBegin, t0).unwrap();
        c.handle(SurfaceEvent::ResizeEnd, t0 + Duration::from_secs(3)).unwrap();
        c.handle(SurfaceEvent::Repaint, t0 + Duration::from_secs(3) + Duration::from_millis(400)).unwrap();

        // 0.4s of a 4s cycle, not 3.4s.
        assert!((c.renderer().clock().time() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn resize_when_not_paused_is_immediate() {
        let t0 = Instant::now();
        let mut c = controller(t0);
        c.handle(SurfaceEvent::Resized(SurfaceSize::new(640, 480)), t0).unwrap();
        assert_eq!(c.backend().calls(), vec![Call::Resize(SurfaceSize::new(640, 480))]);
    }

    #[test]
    fn wave_count_comes_from_buffer_descriptor() {
        let t0 = Instant::now();
        let size = SurfaceSize::new(800, 600);
        let waves = [Wave::new([1.0, 0.0], 0.5, 0.01); 5];
        let renderer = FrameRenderer::new(
            &SceneConfig::default(),
            Camera::new(CameraConfig::default(), size),
            FrameCounter::start(t0),
        );
        let mut c = Controller::new(RecordingBackend::new(size, 6).with_waves(&waves), renderer);
        c.handle(SurfaceEvent::Repaint, t0).unwrap();
        let counts: Vec<i32> = c
            .backend()
            .calls()
            .iter()
            .filter_map(|call| match call {
                Call::UpdateVs(p) => Some(p.wave_count),
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![5, 5]);
    }

    #[test]
    fn quit_exits_and_shutdown_tears_down() {
        let t0 = Instant::now();
        let mut c = controller(t0);
        let log = c.backend().log();
        assert_eq!(c.handle(SurfaceEvent::Quit, t0).unwrap(), LoopControl::Exit);
        c.shutdown();
        assert_eq!(log.borrow().last(), Some(&Call::Teardown));
    }
}
