use std::path::Path;

use ddsfile::{Caps2, D3DFormat, Dds, DxgiFormat, MiscFlag};
use wgpu::util::DeviceExt;

use crate::device::capture;
use crate::error::{ErrorCode, FatalError, OrFatal, Result};

const FACES: u32 = 6;

/// Decoded cube texture: six faces, each with a full mip chain, stored face
/// by face.
#[derive(Debug, Clone)]
pub struct CubemapData {
    pub format: wgpu::TextureFormat,
    pub size: u32,
    pub mip_level_count: u32,
    pub data: Vec<u8>,
}

impl CubemapData {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).or_fatal(ErrorCode::Asset, format!("unable to read {}", path.display()))?;
        Self::parse(&bytes)
    }

    /// Decodes a DDS cube texture with a legacy or DX10 header.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let dds = Dds::read(bytes).or_fatal(ErrorCode::Asset, "not a DDS file")?;

        let is_cube = dds.header.caps2.contains(Caps2::CUBEMAP)
            || dds
                .header10
                .as_ref()
                .is_some_and(|h| h.misc_flag.contains(MiscFlag::TEXTURECUBE));
        if !is_cube {
            return Err(FatalError::new(ErrorCode::Asset, "texture is not a cube map"));
        }
        if let Some(h10) = &dds.header10 {
            if h10.array_size > 1 {
                return Err(FatalError::new(
                    ErrorCode::Asset,
                    format!("cube map arrays are not supported ({} cubes)", h10.array_size),
                ));
            }
        }

        let (width, height) = (dds.header.width, dds.header.height);
        if width == 0 || width != height {
            return Err(FatalError::new(
                ErrorCode::Asset,
                format!("cube faces must be square and non-empty, got {width}x{height}"),
            ));
        }

        let format = texture_format(&dds)?;
        let mip_level_count = dds.get_num_mipmap_levels().max(1);

        let face_size = mip_chain_size(format, width, height, mip_level_count)
            .or_fatal(ErrorCode::Asset, format!("{format:?} has no defined copy size"))?;
        let expected = face_size * u64::from(FACES);
        let available = dds.data.len() as u64;
        if available < expected {
            return Err(FatalError::new(
                ErrorCode::Asset,
                format!("texture data is truncated: {available} of {expected} bytes"),
            ));
        }
        if available > expected {
            log::debug!("ignoring {} trailing bytes of texture data", available - expected);
        }

        let mut data = dds.data;
        data.truncate(expected as usize);

        Ok(Self {
            format,
            size: width,
            mip_level_count,
            data,
        })
    }
}

fn texture_format(dds: &Dds) -> Result<wgpu::TextureFormat> {
    use wgpu::TextureFormat as F;

    if dds.header10.is_none() {
        let d3d = dds
            .get_d3d_format()
            .or_fatal(ErrorCode::Asset, "unrecognised pixel format")?;
        return match d3d {
            D3DFormat::A8R8G8B8 => Ok(F::Bgra8Unorm),
            D3DFormat::A8B8G8R8 => Ok(F::Rgba8Unorm),
            D3DFormat::DXT1 => Ok(F::Bc1RgbaUnorm),
            D3DFormat::DXT3 => Ok(F::Bc2RgbaUnorm),
            D3DFormat::DXT5 => Ok(F::Bc3RgbaUnorm),
            other => Err(FatalError::new(
                ErrorCode::Asset,
                format!("unsupported pixel format {other:?}"),
            )),
        };
    }

    let dxgi = dds
        .get_dxgi_format()
        .or_fatal(ErrorCode::Asset, "unrecognised DXGI format")?;
    match dxgi {
        DxgiFormat::R8G8B8A8_UNorm => Ok(F::Rgba8Unorm),
        DxgiFormat::R8G8B8A8_UNorm_sRGB => Ok(F::Rgba8UnormSrgb),
        DxgiFormat::B8G8R8A8_UNorm => Ok(F::Bgra8Unorm),
        DxgiFormat::B8G8R8A8_UNorm_sRGB => Ok(F::Bgra8UnormSrgb),
        DxgiFormat::BC1_UNorm => Ok(F::Bc1RgbaUnorm),
        DxgiFormat::BC1_UNorm_sRGB => Ok(F::Bc1RgbaUnormSrgb),
        DxgiFormat::BC2_UNorm => Ok(F::Bc2RgbaUnorm),
        DxgiFormat::BC2_UNorm_sRGB => Ok(F::Bc2RgbaUnormSrgb),
        DxgiFormat::BC3_UNorm => Ok(F::Bc3RgbaUnorm),
        DxgiFormat::BC3_UNorm_sRGB => Ok(F::Bc3RgbaUnormSrgb),
        DxgiFormat::BC7_UNorm => Ok(F::Bc7RgbaUnorm),
        DxgiFormat::BC7_UNorm_sRGB => Ok(F::Bc7RgbaUnormSrgb),
        DxgiFormat::R16G16B16A16_Float => Ok(F::Rgba16Float),
        other => Err(FatalError::new(
            ErrorCode::Asset,
            format!("unsupported DXGI format {other:?}"),
        )),
    }
}

/// Byte size of one face with `levels` mips, tightly packed.
///
/// Returns `None` for formats without a single copy size (depth/stencil).
pub fn mip_chain_size(format: wgpu::TextureFormat, width: u32, height: u32, levels: u32) -> Option<u64> {
    let (block_w, block_h) = format.block_dimensions();
    let block_bytes = u64::from(format.block_copy_size(None)?);

    let mut total = 0;
    for level in 0..levels {
        let w = (width >> level).max(1);
        let h = (height >> level).max(1);
        let blocks = u64::from(w.div_ceil(block_w)) * u64::from(h.div_ceil(block_h));
        total += blocks * block_bytes;
    }
    Some(total)
}

/// GPU cube texture and its cube view.
pub struct Cubemap {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Cubemap {
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self> {
        CubemapData::read(path)
            .and_then(|data| Self::upload(device, queue, &data))
            .map_err(|e| e.while_doing(format!("unable to load skybox texture {}", path.display())))
    }

    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, data: &CubemapData) -> Result<Self> {
        let required = data.format.required_features();
        if !device.features().contains(required) {
            return Err(FatalError::new(
                ErrorCode::Asset,
                format!("{:?} requires device features {required:?}", data.format),
            ));
        }

        let (block_w, _) = data.format.block_dimensions();
        if data.size % block_w != 0 {
            return Err(FatalError::new(
                ErrorCode::Asset,
                format!("cube face size {} is not a multiple of the {block_w}px block size", data.size),
            ));
        }

        let max = device.limits().max_texture_dimension_2d;
        if data.size > max {
            return Err(FatalError::new(
                ErrorCode::Asset,
                format!("cube face size {} exceeds the device limit of {max}", data.size),
            ));
        }

        let descriptor = wgpu::TextureDescriptor {
            label: Some("reef skybox"),
            size: wgpu::Extent3d {
                width: data.size,
                height: data.size,
                depth_or_array_layers: FACES,
            },
            mip_level_count: data.mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: data.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };
        let texture = capture(device, ErrorCode::Asset, "unable to create skybox texture", || {
            device.create_texture_with_data(queue, &descriptor, wgpu::util::TextureDataOrder::LayerMajor, &data.data)
        })?;

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("reef skybox view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        log::info!(
            "skybox {}x{} {:?}, {} mips",
            data.size,
            data.size,
            data.format,
            data.mip_level_count
        );

        Ok(Self { texture, view })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn release(self) {
        let Self { texture, view } = self;
        drop(view);
        drop(texture);
    }
}
