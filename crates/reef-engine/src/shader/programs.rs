use std::path::Path;

use crate::device::{capture, DEPTH_FORMAT};
use crate::error::{ErrorCode, Result};
use crate::geometry::Vertex;
use crate::resources::{PsParams, VsParams, Wave};

use super::source::{EntryPoints, ProgramSource, ProgramStage, ShaderProgram};

/// The two draws of a frame, in draw order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Pass {
    Sky,
    Water,
}

impl Pass {
    pub fn label(self) -> &'static str {
        match self {
            Pass::Sky => "sky",
            Pass::Water => "water",
        }
    }
}

/// Bind group slots shared by all programs.
pub(crate) mod binding {
    pub const VS_PARAMS: u32 = 0;
    pub const WAVES: u32 = 1;
    pub const PS_PARAMS: u32 = 2;
    pub const CUBEMAP: u32 = 3;
    pub const SAMPLER: u32 = 4;
}

/// Compiled programs and the pipelines built from them.
///
/// Built once at startup; immutable afterwards.
pub struct ShaderPrograms {
    programs: Vec<ShaderProgram>,
    module: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sky: wgpu::RenderPipeline,
    water: wgpu::RenderPipeline,
}

impl ShaderPrograms {
    /// Reads the source at `path` and builds both pipelines.
    pub fn load(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        path: &Path,
        entry_points: &EntryPoints,
    ) -> Result<Self> {
        let source = ProgramSource::load(path)?;
        Self::from_source(device, color_format, &source, entry_points)
    }

    pub fn from_source(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        source: &ProgramSource,
        entry_points: &EntryPoints,
    ) -> Result<Self> {
        let programs = vec![
            source.program(&entry_points.water_vs, ProgramStage::Vertex)?,
            source.program(&entry_points.sky_vs, ProgramStage::Vertex)?,
            source.program(&entry_points.water_ps, ProgramStage::Pixel)?,
            source.program(&entry_points.sky_ps, ProgramStage::Pixel)?,
        ];

        // Both meshes share one vertex format; derive it once from the water
        // program and hold the geometry to it.
        let input_layout = source.input_layout(&entry_points.water_vs)?;
        input_layout.ensure_matches(Vertex::STRIDE, &Vertex::ATTRS)?;

        let module = capture(device, ErrorCode::Shader, "unable to create shader module", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("reef shader module"),
                source: wgpu::ShaderSource::Wgsl(source.text().into()),
            })
        })?;

        let (bind_group_layout, pipeline_layout) =
            capture(device, ErrorCode::Shader, "unable to create pipeline layout", || {
                let bind_group_layout = create_bind_group_layout(device);
                let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("reef pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });
                (bind_group_layout, pipeline_layout)
            })?;

        let targets = PipelineTargets {
            layout: &pipeline_layout,
            module: &module,
            vertex_buffer: input_layout.buffer_layout(),
            color_format,
        };
        let sky = targets.create(device, Pass::Sky, &entry_points.sky_vs, &entry_points.sky_ps)?;
        let water = targets.create(device, Pass::Water, &entry_points.water_vs, &entry_points.water_ps)?;

        log::info!(
            "shader programs ready: {}",
            programs
                .iter()
                .map(ShaderProgram::entry_point)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            programs,
            module,
            bind_group_layout,
            pipeline_layout,
            sky,
            water,
        })
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn pipeline(&self, pass: Pass) -> &wgpu::RenderPipeline {
        match pass {
            Pass::Sky => &self.sky,
            Pass::Water => &self.water,
        }
    }

    pub fn release(self) {
        let Self {
            programs,
            module,
            bind_group_layout,
            pipeline_layout,
            sky,
            water,
        } = self;

        drop(water);
        drop(sky);
        drop(pipeline_layout);
        drop(bind_group_layout);
        drop(module);

        log::debug!("{} shader programs released", programs.len());
    }
}

struct PipelineTargets<'a> {
    layout: &'a wgpu::PipelineLayout,
    module: &'a wgpu::ShaderModule,
    vertex_buffer: wgpu::VertexBufferLayout<'a>,
    color_format: wgpu::TextureFormat,
}

impl PipelineTargets<'_> {
    /// Builds the pipeline for `pass`. Binding or interface mismatches between
    /// the programs and the layout are reported as shader errors.
    fn create(&self, device: &wgpu::Device, pass: Pass, vs: &str, ps: &str) -> Result<wgpu::RenderPipeline> {
        let label = format!("reef {} pipeline", pass.label());
        let context = format!("unable to create {} pipeline from `{vs}` and `{ps}`", pass.label());

        let descriptor = wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(self.layout),

            vertex: wgpu::VertexState {
                module: self.module,
                entry_point: Some(vs),
                compilation_options: Default::default(),
                buffers: std::slice::from_ref(&self.vertex_buffer),
            },

            fragment: Some(wgpu::FragmentState {
                module: self.module,
                entry_point: Some(ps),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            // Clockwise front faces with back-face culling; both meshes are
            // wound for it.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),

            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        };

        capture(device, ErrorCode::Shader, context, || device.create_render_pipeline(&descriptor))
    }
}

fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let buffer = |binding, visibility, ty, size: usize| wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("reef bind group layout"),
        entries: &[
            buffer(
                binding::VS_PARAMS,
                wgpu::ShaderStages::VERTEX,
                wgpu::BufferBindingType::Uniform,
                size_of::<VsParams>(),
            ),
            buffer(
                binding::WAVES,
                wgpu::ShaderStages::VERTEX,
                wgpu::BufferBindingType::Storage { read_only: true },
                size_of::<Wave>(),
            ),
            buffer(
                binding::PS_PARAMS,
                wgpu::ShaderStages::FRAGMENT,
                wgpu::BufferBindingType::Uniform,
                size_of::<PsParams>(),
            ),
            wgpu::BindGroupLayoutEntry {
                binding: binding::CUBEMAP,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::Cube,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: binding::SAMPLER,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::headless_device;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    #[test]
    fn shipped_shader_builds_both_pipelines() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/reef.wgsl");

        let programs = ShaderPrograms::load(&device, FORMAT, &path, &EntryPoints::default()).unwrap();
        programs.release();
    }

    #[test]
    fn binding_mismatch_is_a_shader_error() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };

        // Valid WGSL, but binding 1 is a read-only storage buffer in the layout.
        let text = "
            @group(0) @binding(1) var<uniform> waves: vec4<f32>;

            @vertex fn water_vs(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position, 1.0) + waves;
            }
            @vertex fn sky_vs(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position, 1.0);
            }
            @fragment fn water_ps() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0);
            }
            @fragment fn sky_ps() -> @location(0) vec4<f32> {
                return vec4<f32>(0.0);
            }
        ";
        let source = ProgramSource::compile(Path::new("mismatch.wgsl"), text.to_string()).unwrap();

        let err = ShaderPrograms::from_source(&device, FORMAT, &source, &EntryPoints::default())
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::Shader);
        assert!(
            err.context()
                .starts_with("unable to create water pipeline from `water_vs` and `water_ps`"),
            "{err}"
        );
    }
}
