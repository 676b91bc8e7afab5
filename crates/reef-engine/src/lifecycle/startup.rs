use std::sync::Arc;

use winit::window::Window;

use crate::device::{Gpu, GpuInit};
use crate::error::{FatalError, Result};
use crate::geometry::MeshStore;
use crate::resources::ResourceStore;
use crate::scene::{Camera, SceneConfig};
use crate::shader::ShaderPrograms;

/// Startup stages, in creation order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    Device,
    Camera,
    Shaders,
    Geometry,
    Resources,
}

/// Explicit, ordered release of a startup product.
pub trait Release {
    fn release(self);
}

impl Release for Gpu {
    fn release(self) {
        self.teardown();
    }
}

impl Release for ShaderPrograms {
    fn release(self) {
        ShaderPrograms::release(self);
    }
}

impl Release for MeshStore {
    fn release(self) {
        MeshStore::release(self);
    }
}

impl Release for ResourceStore {
    fn release(self) {
        ResourceStore::release(self);
    }
}

/// Creates each startup stage from the ones before it.
pub trait StartupSteps {
    type Device: Release;
    type Programs: Release;
    type Meshes: Release;
    type Resources: Release;

    fn device(&mut self) -> Result<Self::Device>;
    fn camera(&mut self, device: &Self::Device) -> Result<Camera>;
    fn programs(&mut self, device: &Self::Device) -> Result<Self::Programs>;
    fn meshes(&mut self, device: &Self::Device) -> Result<Self::Meshes>;
    fn resources(&mut self, device: &Self::Device, programs: &Self::Programs) -> Result<Self::Resources>;
}

/// All stages, fully created.
pub struct Started<S: StartupSteps> {
    pub device: S::Device,
    pub camera: Camera,
    pub programs: S::Programs,
    pub meshes: S::Meshes,
    pub resources: S::Resources,
}

/// Runs every stage in order. On failure, stages already created are
/// released in reverse order before the error is returned.
pub fn start<S: StartupSteps>(steps: &mut S) -> Result<Started<S>> {
    let device = steps.device().map_err(|e| failed(Stage::Device, e))?;

    let camera = match steps.camera(&device) {
        Ok(camera) => camera,
        Err(e) => {
            let e = failed(Stage::Camera, e);
            device.release();
            return Err(e);
        }
    };

    let programs = match steps.programs(&device) {
        Ok(programs) => programs,
        Err(e) => {
            let e = failed(Stage::Shaders, e);
            device.release();
            return Err(e);
        }
    };

    let meshes = match steps.meshes(&device) {
        Ok(meshes) => meshes,
        Err(e) => {
            let e = failed(Stage::Geometry, e);
            programs.release();
            device.release();
            return Err(e);
        }
    };

    let resources = match steps.resources(&device, &programs) {
        Ok(resources) => resources,
        Err(e) => {
            let e = failed(Stage::Resources, e);
            meshes.release();
            programs.release();
            device.release();
            return Err(e);
        }
    };

    Ok(Started {
        device,
        camera,
        programs,
        meshes,
        resources,
    })
}

fn failed(stage: Stage, err: FatalError) -> FatalError {
    log::error!("startup failed at {stage:?} stage");
    err
}

/// Startup against a real window and GPU.
pub struct GpuStartup<'a> {
    pub window: Arc<Window>,
    pub gpu: &'a GpuInit,
    pub scene: &'a SceneConfig,
}

impl StartupSteps for GpuStartup<'_> {
    type Device = Gpu;
    type Programs = ShaderPrograms;
    type Meshes = MeshStore;
    type Resources = ResourceStore;

    fn device(&mut self) -> Result<Gpu> {
        Gpu::new(Arc::clone(&self.window), self.gpu)
    }

    fn camera(&mut self, gpu: &Gpu) -> Result<Camera> {
        Ok(Camera::new(self.scene.camera, gpu.size()))
    }

    fn programs(&mut self, gpu: &Gpu) -> Result<ShaderPrograms> {
        ShaderPrograms::load(
            gpu.device(),
            gpu.surface_format(),
            &self.scene.shader_path,
            &self.scene.entry_points,
        )
    }

    fn meshes(&mut self, gpu: &Gpu) -> Result<MeshStore> {
        MeshStore::build(gpu.device(), self.scene.grid)
    }

    fn resources(&mut self, gpu: &Gpu, programs: &ShaderPrograms) -> Result<ResourceStore> {
        ResourceStore::build(gpu.device(), gpu.queue(), programs, self.scene)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::device::SurfaceSize;
    use crate::error::ErrorCode;
    use crate::scene::CameraConfig;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Stub {
        name: &'static str,
        log: Log,
    }

    impl Release for Stub {
        fn release(self) {
            self.log.borrow_mut().push(format!("release {}", self.name));
        }
    }

    struct FakeSteps {
        fail_at: Option<Stage>,
        log: Log,
    }

    impl FakeSteps {
        fn make(&self, stage: Stage, name: &'static str) -> Result<Stub> {
            self.check(stage)?;
            self.log.borrow_mut().push(format!("create {name}"));
            Ok(Stub {
                name,
                log: Rc::clone(&self.log),
            })
        }

        fn check(&self, stage: Stage) -> Result<()> {
            if self.fail_at == Some(stage) {
                return Err(FatalError::new(ErrorCode::Resource, format!("{stage:?} failed")));
            }
            Ok(())
        }
    }

    impl StartupSteps for FakeSteps {
        type Device = Stub;
        type Programs = Stub;
        type Meshes = Stub;
        type Resources = Stub;

        fn device(&mut self) -> Result<Stub> {
            self.make(Stage::Device, "device")
        }

        fn camera(&mut self, _: &Stub) -> Result<Camera> {
            self.check(Stage::Camera)?;
            Ok(Camera::new(CameraConfig::default(), SurfaceSize::new(800, 600)))
        }

        fn programs(&mut self, _: &Stub) -> Result<Stub> {
            self.make(Stage::Shaders, "programs")
        }

        fn meshes(&mut self, _: &Stub) -> Result<Stub> {
            self.make(Stage::Geometry, "meshes")
        }

        fn resources(&mut self, _: &Stub, _: &Stub) -> Result<Stub> {
            self.make(Stage::Resources, "resources")
        }
    }

    fn run(fail_at: Option<Stage>) -> (Result<Started<FakeSteps>>, Vec<String>) {
        let log = Log::default();
        let mut steps = FakeSteps {
            fail_at,
            log: Rc::clone(&log),
        };
        let result = start(&mut steps);
        let entries = log.borrow().clone();
        (result, entries)
    }

    #[test]
    fn all_stages_in_order() {
        let (result, log) = run(None);
        let started = result.unwrap();
        assert_eq!(started.device.name, "device");
        assert_eq!(
            log,
            ["create device", "create programs", "create meshes", "create resources"]
        );
    }

    #[test]
    fn failure_releases_created_stages_in_reverse() {
        let (result, log) = run(Some(Stage::Resources));
        let err = result.err().unwrap();
        assert_eq!(err.context(), "Resources failed");
        assert_eq!(
            log,
            [
                "create device",
                "create programs",
                "create meshes",
                "release meshes",
                "release programs",
                "release device",
            ]
        );
    }

    #[test]
    fn failure_before_anything_releases_nothing() {
        let (result, log) = run(Some(Stage::Device));
        assert!(result.is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn geometry_failure_releases_programs_then_device() {
        let (result, log) = run(Some(Stage::Geometry));
        assert_eq!(result.err().unwrap().context(), "Geometry failed");
        assert_eq!(
            log,
            ["create device", "create programs", "release programs", "release device"]
        );
    }

    #[test]
    fn shader_failure_releases_device_only() {
        let (result, log) = run(Some(Stage::Shaders));
        assert!(result.is_err());
        assert_eq!(log, ["create device", "release device"]);
    }

    #[test]
    fn camera_failure_releases_device_only() {
        let (result, log) = run(Some(Stage::Camera));
        assert!(result.is_err());
        assert_eq!(log, ["create device", "release device"]);
    }
}
