/// Adapter selection strategy, tried in order until one yields a device.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriverPreference {
    /// Discrete/integrated hardware adapter.
    Hardware,
    /// The platform's software fallback adapter (WARP, llvmpipe, ...).
    Software,
    /// Any adapter compatible with the surface, lowest power first.
    AnyCompatible,
}

impl DriverPreference {
    pub(crate) fn adapter_options<'a, 'w>(
        self,
        surface: &'a wgpu::Surface<'w>,
    ) -> wgpu::RequestAdapterOptions<'a, 'w> {
        let (power_preference, force_fallback_adapter) = match self {
            DriverPreference::Hardware => (wgpu::PowerPreference::HighPerformance, false),
            DriverPreference::Software => (wgpu::PowerPreference::None, true),
            DriverPreference::AnyCompatible => (wgpu::PowerPreference::LowPower, false),
        };

        wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(surface),
            force_fallback_adapter,
        }
    }
}

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Adapter strategies, tried in order.
    pub driver_preferences: Vec<DriverPreference>,

    /// Prefer an sRGB surface format when available.
    ///
    /// Off by default: shaders write display-ready values into an 8-bit
    /// linear target.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). Auto modes fall back to FIFO.
    pub present_mode: wgpu::PresentMode,

    /// Features the device must have.
    pub required_features: wgpu::Features,

    /// Features requested only when the adapter offers them.
    pub optional_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Number of frames the surface may queue. 2 is classic double buffering.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            driver_preferences: vec![
                DriverPreference::Hardware,
                DriverPreference::Software,
                DriverPreference::AnyCompatible,
            ],
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::AutoNoVsync,
            required_features: wgpu::Features::empty(),
            optional_features: wgpu::Features::TEXTURE_COMPRESSION_BC,
            required_limits: wgpu::Limits::downlevel_defaults(),
            desired_maximum_frame_latency: 2,
        }
    }
}
