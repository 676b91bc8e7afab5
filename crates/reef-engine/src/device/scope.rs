use std::sync::{Arc, Mutex};

use crate::error::{ErrorCode, OrFatal, Result};

/// Runs `create` inside validation and out-of-memory error scopes.
///
/// Errors wgpu raises while `create` runs are returned as a fatal error
/// instead of reaching the device's uncaptured-error handler.
pub fn capture<T>(
    device: &wgpu::Device,
    code: ErrorCode,
    context: impl Into<String>,
    create: impl FnOnce() -> T,
) -> Result<T> {
    let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = create();

    // Scopes pop innermost first.
    let invalid = pollster::block_on(validation.pop());
    let exhausted = pollster::block_on(out_of_memory.pop());

    match invalid.or(exhausted) {
        Some(err) => Err(err).or_fatal(code, context),
        None => Ok(value),
    }
}

/// Collects errors wgpu reports outside of any error scope, such as those
/// raised while recording or submitting a frame.
///
/// The first error is kept until [`UncapturedErrors::check`] takes it; later
/// ones are only logged.
#[derive(Clone, Default)]
pub struct UncapturedErrors {
    first: Arc<Mutex<Option<wgpu::Error>>>,
}

impl UncapturedErrors {
    /// Installs a collector as `device`'s uncaptured-error handler.
    pub fn install(device: &wgpu::Device) -> Self {
        let errors = Self::default();
        let sink = errors.clone();
        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| sink.record(err)));
        errors
    }

    fn record(&self, err: wgpu::Error) {
        log::error!("wgpu error: {err}");
        let mut first = self.first.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if first.is_none() {
            *first = Some(err);
        }
    }

    /// Returns the first recorded error, if any, as a fatal one.
    pub fn check(&self, code: ErrorCode, context: &str) -> Result<()> {
        let taken = self
            .first
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match taken {
            Some(err) => Err(err).or_fatal(code, context),
            None => Ok(()),
        }
    }
}
