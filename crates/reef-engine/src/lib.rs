//! Reef engine crate.
//!
//! An animated water surface inside a skybox. The crate owns the GPU
//! resource lifecycle and the per-frame pipeline; `window` wires it to a
//! `winit` event loop.

pub mod device;
pub mod error;
pub mod geometry;
pub mod lifecycle;
pub mod logging;
pub mod render;
pub mod resources;
pub mod scene;
pub mod shader;
pub mod time;
pub mod window;

pub use error::{ErrorCode, FatalError, Result};

use device::GpuInit;
use logging::LoggingConfig;
use scene::SceneConfig;
use window::{Runtime, RuntimeConfig};

/// Top-level configuration. Every part has a usable `Default`.
#[derive(Debug, Clone, Default)]
pub struct ReefConfig {
    pub logging: LoggingConfig,
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub scene: SceneConfig,
}

/// Initializes logging and runs the demo to completion.
pub fn run(config: ReefConfig) -> Result<()> {
    logging::init_logging(config.logging.clone());
    Runtime::run(&config)
}
