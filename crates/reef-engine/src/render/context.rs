use std::marker::PhantomData;
use std::rc::Rc;

use crate::device::{Gpu, SurfaceSize};
use crate::error::{ErrorCode, OrFatal, Result};
use crate::geometry::MeshStore;
use crate::resources::{PsParams, ResourceStore, VsParams};
use crate::scene::Viewport;
use crate::shader::{Pass, ShaderPrograms};

use super::recorder::{CommandSink, FrameRecorder};
use super::RenderBackend;

/// The wgpu renderer: device, programs, meshes and resources.
///
/// Emulates an immediate-mode context on top of command encoders through a
/// [`FrameRecorder`].
///
/// Owned by a single thread.
pub struct RendererContext {
    gpu: Gpu,
    programs: ShaderPrograms,
    meshes: MeshStore,
    resources: ResourceStore,

    recorder: FrameRecorder<wgpu::CommandEncoder>,
    viewport: Option<Viewport>,

    /// The swap texture for this frame could not be acquired; draws are
    /// dropped until the next present.
    frame_skipped: bool,

    _single_thread: PhantomData<Rc<()>>,
}

impl RendererContext {
    pub fn new(gpu: Gpu, programs: ShaderPrograms, meshes: MeshStore, resources: ResourceStore) -> Self {
        Self {
            gpu,
            programs,
            meshes,
            resources,
            recorder: FrameRecorder::new(),
            viewport: None,
            frame_skipped: false,
            _single_thread: PhantomData,
        }
    }
}

impl CommandSink for Gpu {
    type Encoder = wgpu::CommandEncoder;

    fn create_encoder(&self) -> wgpu::CommandEncoder {
        self.encoder("reef frame encoder")
    }

    fn submit(&self, encoder: wgpu::CommandEncoder) {
        self.queue().submit(std::iter::once(encoder.finish()));
    }
}

impl RenderBackend for RendererContext {
    fn surface_size(&self) -> SurfaceSize {
        self.gpu.size()
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<()> {
        // Nothing recorded against the old attachments may survive.
        drop(self.recorder.finish());
        self.frame_skipped = false;
        self.gpu.resize(size)
    }

    fn begin_frame(&mut self, clear: wgpu::Color, viewport: Viewport) -> Result<()> {
        drop(self.recorder.finish());
        self.frame_skipped = !self.gpu.begin_frame()?;
        if self.frame_skipped {
            return Ok(());
        }

        let attachments = self.gpu.attachments()?;
        let color_view = self.gpu.color_view()?;
        let mut encoder = self.gpu.encoder("reef frame encoder");

        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("reef clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: attachments.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.recorder.begin(encoder);
        self.viewport = Some(viewport);
        Ok(())
    }

    fn update_vs_params(&mut self, params: &VsParams) -> Result<()> {
        self.recorder.before_write(&self.gpu);
        self.resources.params().write_vs(self.gpu.queue(), params);
        Ok(())
    }

    fn update_ps_params(&mut self, params: &PsParams) -> Result<()> {
        self.recorder.before_write(&self.gpu);
        self.resources.params().write_ps(self.gpu.queue(), params);
        Ok(())
    }

    fn draw(&mut self, pass: Pass, index_count: u32) -> Result<()> {
        if self.frame_skipped {
            return Ok(());
        }

        let encoder = self
            .recorder
            .draw_encoder()
            .or_fatal(ErrorCode::Frame, format!("{} draw issued outside of a frame", pass.label()))?;
        let attachments = self.gpu.attachments()?;
        let color_view = self.gpu.color_view()?;
        let mesh = self.meshes.mesh(pass);
        let size = attachments.size();
        let viewport = self
            .viewport
            .unwrap_or_else(|| Viewport::full(size));

        let label = format!("reef {} pass", pass.label());
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: attachments.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(
            viewport.x,
            viewport.y,
            viewport.width.min(size.width as f32),
            viewport.height.min(size.height as f32),
            viewport.min_depth,
            viewport.max_depth,
        );
        rpass.set_pipeline(self.programs.pipeline(pass));
        rpass.set_bind_group(0, self.resources.bind_group(), &[]);
        rpass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
        rpass.set_index_buffer(mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..index_count, 0, 0..1);
        drop(rpass);

        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let encoder = match self.recorder.finish() {
            Some(encoder) => encoder,
            None => self.gpu.encoder("reef present encoder"),
        };
        self.viewport = None;
        self.frame_skipped = false;

        if !self.gpu.present(encoder)? {
            log::trace!("frame not presented");
        }
        Ok(())
    }

    fn index_count(&self, pass: Pass) -> u32 {
        self.meshes.mesh(pass).index_count()
    }

    fn wave_count(&self) -> u32 {
        self.resources.waves().desc().element_count
    }

    /// Releases resources, meshes, programs, then the device and surface.
    fn teardown(self) {
        let Self {
            gpu,
            programs,
            meshes,
            resources,
            mut recorder,
            ..
        } = self;

        drop(recorder.finish());
        resources.release();
        meshes.release();
        programs.release();
        gpu.teardown();
    }
}
