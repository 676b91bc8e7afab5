use crate::error::{ErrorCode, FatalError, Result};

/// One vertex attribute expected by a vertex program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputAttribute {
    /// Argument or struct member name from the shader signature.
    pub semantic: String,
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub offset: u64,
}

/// Ordered vertex attributes of a single per-vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLayout {
    attributes: Vec<InputAttribute>,
    wgpu_attributes: Vec<wgpu::VertexAttribute>,
    stride: u64,
}

impl InputLayout {
    /// Packs attributes tightly in location order.
    pub fn packed(mut attributes: Vec<(String, u32, wgpu::VertexFormat)>) -> Self {
        attributes.sort_by_key(|(_, location, _)| *location);

        let mut offset = 0;
        let attributes: Vec<InputAttribute> = attributes
            .into_iter()
            .map(|(semantic, location, format)| {
                let attr = InputAttribute {
                    semantic,
                    location,
                    format,
                    offset,
                };
                offset += format.size();
                attr
            })
            .collect();

        let wgpu_attributes = attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: a.format,
                offset: a.offset,
                shader_location: a.location,
            })
            .collect();

        Self {
            attributes,
            wgpu_attributes,
            stride: offset,
        }
    }

    /// Derives the layout from a vertex entry point's input signature.
    ///
    /// Accepts location-bound arguments and location-bound members of struct
    /// arguments. Built-ins (`vertex_index`, ...) are skipped.
    pub fn from_entry_point(module: &naga::Module, entry_point: &naga::EntryPoint) -> Result<Self> {
        let mut attributes = Vec::new();

        for (index, arg) in entry_point.function.arguments.iter().enumerate() {
            let arg_name = arg.name.clone().unwrap_or_else(|| format!("arg{index}"));

            match (&arg.binding, &module.types[arg.ty].inner) {
                (Some(naga::Binding::Location { location, .. }), inner) => {
                    attributes.push((arg_name, *location, vertex_format(inner, &entry_point.name)?));
                }
                (Some(naga::Binding::BuiltIn(_)), _) => {}
                (None, naga::TypeInner::Struct { members, .. }) => {
                    for member in members {
                        if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                            let name = member
                                .name
                                .clone()
                                .unwrap_or_else(|| format!("{arg_name}.{location}"));
                            let inner = &module.types[member.ty].inner;
                            attributes.push((name, *location, vertex_format(inner, &entry_point.name)?));
                        }
                    }
                }
                (None, _) => {
                    return Err(FatalError::new(
                        ErrorCode::Shader,
                        format!("unbound input `{arg_name}` in `{}`", entry_point.name),
                    ));
                }
            }
        }

        Ok(Self::packed(attributes))
    }

    pub fn attributes(&self) -> &[InputAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Layout of the single per-vertex buffer slot.
    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.wgpu_attributes,
        }
    }

    /// Checks that a mesh vertex layout provides exactly these attributes.
    pub fn ensure_matches(&self, stride: u64, attributes: &[wgpu::VertexAttribute]) -> Result<()> {
        if self.stride == stride && self.wgpu_attributes.as_slice() == attributes {
            return Ok(());
        }
        Err(FatalError::new(
            ErrorCode::Geometry,
            format!(
                "mesh vertex layout (stride {stride}, {attributes:?}) does not match program input layout (stride {}, {:?})",
                self.stride, self.wgpu_attributes
            ),
        ))
    }
}

fn vertex_format(inner: &naga::TypeInner, entry_point: &str) -> Result<wgpu::VertexFormat> {
    use naga::{ScalarKind, TypeInner, VectorSize};
    use wgpu::VertexFormat as F;

    let format = match inner {
        TypeInner::Scalar(s) if s.width == 4 => match s.kind {
            ScalarKind::Float => Some(F::Float32),
            ScalarKind::Sint => Some(F::Sint32),
            ScalarKind::Uint => Some(F::Uint32),
            _ => None,
        },
        TypeInner::Vector { size, scalar } if scalar.width == 4 => match (scalar.kind, size) {
            (ScalarKind::Float, VectorSize::Bi) => Some(F::Float32x2),
            (ScalarKind::Float, VectorSize::Tri) => Some(F::Float32x3),
            (ScalarKind::Float, VectorSize::Quad) => Some(F::Float32x4),
            (ScalarKind::Sint, VectorSize::Bi) => Some(F::Sint32x2),
            (ScalarKind::Sint, VectorSize::Tri) => Some(F::Sint32x3),
            (ScalarKind::Sint, VectorSize::Quad) => Some(F::Sint32x4),
            (ScalarKind::Uint, VectorSize::Bi) => Some(F::Uint32x2),
            (ScalarKind::Uint, VectorSize::Tri) => Some(F::Uint32x3),
            (ScalarKind::Uint, VectorSize::Quad) => Some(F::Uint32x4),
            _ => None,
        },
        _ => None,
    };

    format.ok_or_else(|| {
        FatalError::new(
            ErrorCode::Shader,
            format!("unsupported vertex input type {inner:?} in `{entry_point}`"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_of(src: &str, entry: &str) -> Result<InputLayout> {
        let module = naga::front::wgsl::parse_str(src).expect("test shader parses");
        let ep = module
            .entry_points
            .iter()
            .find(|ep| ep.name == entry)
            .expect("entry point exists");
        InputLayout::from_entry_point(&module, ep)
    }

    #[test]
    fn single_position_argument() {
        let layout = layout_of(
            "@vertex fn vs(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position, 1.0);
            }",
            "vs",
        )
        .unwrap();

        assert_eq!(layout.stride(), 12);
        assert_eq!(
            layout.attributes(),
            &[InputAttribute {
                semantic: "position".into(),
                location: 0,
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
            }]
        );
        assert!(layout
            .ensure_matches(12, &wgpu::vertex_attr_array![0 => Float32x3])
            .is_ok());
    }

    #[test]
    fn struct_members_sorted_by_location() {
        let layout = layout_of(
            "struct In {
                @location(1) uv: vec2<f32>,
                @location(0) position: vec3<f32>,
                @builtin(vertex_index) index: u32,
            }
            @vertex fn vs(input: In) -> @builtin(position) vec4<f32> {
                return vec4<f32>(input.position + vec3<f32>(input.uv, 0.0), 1.0);
            }",
            "vs",
        )
        .unwrap();

        let names: Vec<_> = layout.attributes().iter().map(|a| a.semantic.as_str()).collect();
        assert_eq!(names, ["position", "uv"]);
        assert_eq!(layout.attributes()[1].offset, 12);
        assert_eq!(layout.stride(), 20);
    }

    #[test]
    fn mismatched_mesh_layout_is_rejected() {
        let layout = layout_of(
            "@vertex fn vs(@location(0) p: vec4<f32>) -> @builtin(position) vec4<f32> { return p; }",
            "vs",
        )
        .unwrap();
        let err = layout
            .ensure_matches(12, &wgpu::vertex_attr_array![0 => Float32x3])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Geometry);
    }
}
