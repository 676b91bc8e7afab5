//! Lifecycle: staged startup, event handling and teardown.

mod controller;
mod startup;

pub use controller::{Controller, LoopControl, SurfaceEvent};
pub use startup::{start, GpuStartup, Release, Stage, Started, StartupSteps};
