use std::sync::Arc;

use winit::window::Window;

use crate::error::{ErrorCode, FatalError, OrFatal, Result};

use super::attachments::Attachments;
use super::scope::UncapturedErrors;
use super::surface::{choose_alpha_mode, choose_present_mode, choose_surface_format, PresentPath, SurfaceSize};
use super::{DriverPreference, GpuInit, SurfaceErrorAction};

/// Swap texture acquired for a frame drawn on the direct path.
struct SwapFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// Owns wgpu core objects, the surface configuration and the attachments.
///
/// This type is the device/surface manager:
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain)
/// - owns the render-target/depth-stencil pair and rebuilds it on resize
/// - gets finished frames into the swap texture and presents them
pub struct Gpu {
    /// Window the surface presents to. Kept alive for the surface's lifetime.
    window: Arc<Window>,

    /// wgpu instance used to create the adapter and surface.
    instance: wgpu::Instance,

    /// Surface bound to the window.
    surface: wgpu::Surface<'static>,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Errors raised outside of an error scope.
    errors: UncapturedErrors,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    present_path: PresentPath,

    /// Current drawable size in physical pixels. May be empty while minimized,
    /// in which case `config` keeps the last configured size.
    size: SurfaceSize,

    /// `None` only transiently inside `resize`.
    attachments: Option<Attachments>,

    /// Direct path only: the swap texture of the frame being drawn.
    frame: Option<SwapFrame>,
}

/// An adapter whose device was created and whose surface support is known.
struct Selected {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    caps: wgpu::SurfaceCapabilities,
    present_path: PresentPath,
}

impl Gpu {
    /// Creates the device, queue and surface for `window`.
    ///
    /// Driver preferences are tried in order; the first adapter that yields
    /// a device and can present to the surface wins.
    pub fn new(window: Arc<Window>, init: &GpuInit) -> Result<Self> {
        let size = SurfaceSize::from(window.inner_size());
        if size.is_empty() {
            return Err(FatalError::new(ErrorCode::Surface, "window has zero size"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .or_fatal(ErrorCode::Surface, "unable to create surface for window")?;

        let Selected {
            adapter,
            device,
            queue,
            caps,
            present_path,
        } = request_device(&instance, &surface, init)?;

        let errors = UncapturedErrors::install(&device);

        let format = choose_surface_format(&caps, init.prefer_srgb)
            .or_fatal(ErrorCode::Surface, "no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: present_path.surface_usage(),
            format,
            width: size.width,
            height: size.height,
            present_mode: choose_present_mode(&caps, init.present_mode),
            alpha_mode: choose_alpha_mode(&caps),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        errors.check(ErrorCode::Surface, "unable to configure swap chain")?;

        let attachments = Attachments::new(&device, format, size, present_path)
            .map_err(|e| e.while_doing("unable to create render target and depth-stencil views"))?;

        log::info!(
            "surface {}x{} format {:?} present mode {:?} ({present_path:?} present path)",
            size.width,
            size.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            window,
            instance,
            surface,
            adapter,
            device,
            queue,
            errors,
            config,
            present_path,
            size,
            attachments: Some(attachments),
            frame: None,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the current attachments.
    pub fn attachments(&self) -> Result<&Attachments> {
        self.attachments
            .as_ref()
            .or_fatal(ErrorCode::Frame, "render target is missing")
    }

    /// Colour view frames are drawn into.
    pub fn color_view(&self) -> Result<&wgpu::TextureView> {
        let view = match self.present_path {
            PresentPath::Copy => self.attachments()?.color_view(),
            PresentPath::Direct => self.frame.as_ref().map(|frame| &frame.view),
        };
        view.or_fatal(ErrorCode::Frame, "no render target view for this frame")
    }

    /// Resizes the swap surface and rebuilds the attachments.
    ///
    /// Attachments are released before the surface is reconfigured. An empty
    /// size is recorded but not applied; rendering is skipped until a
    /// non-empty size arrives.
    pub fn resize(&mut self, size: SurfaceSize) -> Result<()> {
        self.size = size;

        if size.is_empty() {
            log::debug!("surface resize to {}x{} deferred", size.width, size.height);
            return Ok(());
        }

        self.frame = None;
        if let Some(attachments) = self.attachments.take() {
            attachments.release();
        }

        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.errors
            .check(ErrorCode::Surface, "unable to resize swap chain")?;

        let attachments = Attachments::new(&self.device, self.config.format, size, self.present_path).map_err(|e| {
            e.while_doing("unable to recreate render target and depth-stencil views after resize")
        })?;
        self.attachments = Some(attachments);

        log::debug!("surface resized to {}x{}", size.width, size.height);
        Ok(())
    }

    pub(crate) fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Prepares the colour target for a new frame.
    ///
    /// On the direct path this acquires the swap texture. Returns `false` when
    /// it could not be acquired; the frame must then be skipped.
    pub fn begin_frame(&mut self) -> Result<bool> {
        match self.present_path {
            PresentPath::Copy => Ok(true),
            PresentPath::Direct => {
                self.frame = None;
                let Some(texture) = self.acquire()? else {
                    return Ok(false);
                };
                let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
                self.frame = Some(SwapFrame { texture, view });
                Ok(true)
            }
        }
    }

    /// Submits `encoder` and presents the frame.
    ///
    /// On the copy path the render target is copied into the acquired swap
    /// texture as part of the same submission, so calling this without new
    /// draws presents the last frame again. On the direct path the swap
    /// texture acquired by [`Gpu::begin_frame`] is presented; without one,
    /// nothing is presented.
    ///
    /// Returns `false` when presentation was skipped; recorded work is still
    /// submitted.
    pub fn present(&mut self, mut encoder: wgpu::CommandEncoder) -> Result<bool> {
        let swap = match self.present_path {
            PresentPath::Copy => {
                let swap = self.acquire()?;
                if let Some(swap) = &swap {
                    self.copy_render_target(&mut encoder, swap)?;
                }
                swap
            }
            PresentPath::Direct => self.frame.take().map(|frame| frame.texture),
        };

        self.queue.submit(std::iter::once(encoder.finish()));
        self.errors.check(ErrorCode::Frame, "unable to render frame")?;

        match swap {
            Some(swap) => {
                self.window.pre_present_notify();
                swap.present();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(err) => {
                match SurfaceErrorAction::for_error(&err) {
                    SurfaceErrorAction::Reconfigured => {
                        if !self.size.is_empty() {
                            self.surface.configure(&self.device, &self.config);
                        }
                        log::debug!("surface {err}; reconfigured, frame skipped");
                    }
                    SurfaceErrorAction::SkipFrame => log::debug!("surface {err}; frame skipped"),
                    SurfaceErrorAction::Fatal => {
                        return Err(err).or_fatal(ErrorCode::Frame, "unable to acquire swap chain buffer");
                    }
                }
                Ok(None)
            }
        }
    }

    fn copy_render_target(&self, encoder: &mut wgpu::CommandEncoder, swap: &wgpu::SurfaceTexture) -> Result<()> {
        let attachments = self.attachments()?;
        let color = attachments
            .color_texture()
            .or_fatal(ErrorCode::Frame, "render target is missing")?;

        let extent = attachments.size().extent();
        let swap_size = swap.texture.size();
        if swap_size.width == extent.width && swap_size.height == extent.height {
            encoder.copy_texture_to_texture(color.as_image_copy(), swap.texture.as_image_copy(), extent);
        } else {
            log::debug!(
                "swap texture {}x{} does not match render target {}x{}",
                swap_size.width,
                swap_size.height,
                extent.width,
                extent.height
            );
        }
        Ok(())
    }

    /// Releases attachments, surface, queue, device, adapter and instance, in
    /// that order.
    pub fn teardown(self) {
        let Self {
            window,
            instance,
            surface,
            adapter,
            device,
            queue,
            errors: _,
            config: _,
            present_path: _,
            size: _,
            attachments,
            frame,
        } = self;

        drop(frame);
        if let Some(attachments) = attachments {
            attachments.release();
        }
        drop(surface);
        drop(queue);
        drop(device);
        drop(adapter);
        drop(instance);
        drop(window);

        log::debug!("device and surface released");
    }
}

fn request_device(instance: &wgpu::Instance, surface: &wgpu::Surface<'static>, init: &GpuInit) -> Result<Selected> {
    let mut last_error = None;

    for &preference in &init.driver_preferences {
        match pollster::block_on(try_preference(instance, surface, init, preference)) {
            Ok(found) => return Ok(found),
            Err(e) => {
                log::warn!("driver preference {preference:?} unavailable: {e:#}");
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) => FatalError::with_source(ErrorCode::Device, "unable to create device and swap chain", e),
        None => FatalError::new(ErrorCode::Device, "unable to create device: no driver preferences configured"),
    })
}

async fn try_preference(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'static>,
    init: &GpuInit,
    preference: DriverPreference,
) -> anyhow::Result<Selected> {
    use anyhow::Context;

    let adapter = instance
        .request_adapter(&preference.adapter_options(surface))
        .await
        .context("failed to find a suitable GPU adapter")?;

    let info = adapter.get_info();

    // An adapter that cannot present to the surface is as good as none.
    let caps = surface.get_capabilities(&adapter);
    if caps.formats.is_empty() {
        anyhow::bail!("{} ({:?}) cannot present to the window surface", info.name, info.backend);
    }
    let present_path = PresentPath::for_usages(caps.usages).with_context(|| {
        format!(
            "{} ({:?}) surface cannot be a render target (usages {:?})",
            info.name, info.backend, caps.usages
        )
    })?;

    let required_features = init.required_features | (init.optional_features & adapter.features());

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("reef device"),
            required_features,
            // Texture size limits follow the adapter so large windows fit.
            required_limits: init.required_limits.clone().using_resolution(adapter.limits()),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .with_context(|| format!("failed to create device on {} ({:?})", info.name, info.backend))?;

    log::info!(
        "using {:?} adapter {} ({:?}, {:?})",
        preference,
        info.name,
        info.device_type,
        info.backend
    );

    Ok(Selected {
        adapter,
        device,
        queue,
        caps,
        present_path,
    })
}
