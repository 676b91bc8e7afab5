use crate::error::{ErrorCode, FatalError, Result};

use super::{capture, PresentPath, SurfaceSize};

/// Single-component float depth, no stencil.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Render-target and depth-stencil attachments sized to the surface.
///
/// On the [`PresentPath::Copy`] path the colour target is an owned texture in
/// the surface format; presenting copies it into the acquired swap texture.
/// Holding the last frame here lets a paused loop present it again without
/// redrawing. On the [`PresentPath::Direct`] path only the depth buffer is
/// owned and frames are drawn into the swap texture.
pub struct Attachments {
    size: SurfaceSize,
    color: Option<(wgpu::Texture, wgpu::TextureView)>,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl Attachments {
    /// Creates the attachments `path` needs at `size`.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: SurfaceSize, path: PresentPath) -> Result<Self> {
        let max = device.limits().max_texture_dimension_2d;
        check_size(size, max)?;

        let color = match path {
            PresentPath::Copy => {
                let texture = capture(device, ErrorCode::Resource, "unable to create render target", || {
                    device.create_texture(&wgpu::TextureDescriptor {
                        label: Some("reef render target"),
                        size: size.extent(),
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format,
                        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                        view_formats: &[],
                    })
                })?;
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                Some((texture, view))
            }
            PresentPath::Direct => None,
        };

        let depth_texture = capture(device, ErrorCode::Resource, "unable to create depth buffer", || {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("reef depth buffer"),
                size: size.extent(),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        })?;
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("attachments created at {}x{} ({path:?})", size.width, size.height);

        Ok(Self {
            size,
            color,
            depth_texture,
            depth_view,
        })
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Owned colour target; `None` on the direct path.
    pub fn color_texture(&self) -> Option<&wgpu::Texture> {
        self.color.as_ref().map(|(texture, _)| texture)
    }

    pub fn color_view(&self) -> Option<&wgpu::TextureView> {
        self.color.as_ref().map(|(_, view)| view)
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Releases the depth buffer, depth view, render-target view and colour
    /// texture, in that order.
    pub fn release(self) {
        let Self {
            size,
            color,
            depth_texture,
            depth_view,
        } = self;

        drop(depth_texture);
        drop(depth_view);
        if let Some((color_texture, color_view)) = color {
            drop(color_view);
            drop(color_texture);
        }

        log::debug!("attachments released ({}x{})", size.width, size.height);
    }
}

fn check_size(size: SurfaceSize, max_dimension: u32) -> Result<()> {
    if size.is_empty() {
        return Err(FatalError::new(
            ErrorCode::Resource,
            format!(
                "unable to create attachments for empty surface {}x{}",
                size.width, size.height
            ),
        ));
    }
    if size.width > max_dimension || size.height > max_dimension {
        return Err(FatalError::new(
            ErrorCode::Resource,
            format!(
                "surface {}x{} exceeds the device texture limit of {max_dimension}",
                size.width, size.height
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(check_size(SurfaceSize::new(0, 10), 2048).is_err());
        let err = check_size(SurfaceSize::new(4096, 10), 2048).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Resource);
        assert!(check_size(SurfaceSize::new(2048, 2048), 2048).is_ok());
    }

    #[test]
    fn direct_path_owns_depth_only() {
        let Some((device, _queue)) = crate::device::headless_device() else {
            return;
        };
        let size = SurfaceSize::new(64, 32);
        let format = wgpu::TextureFormat::Rgba8Unorm;

        let direct = Attachments::new(&device, format, size, PresentPath::Direct).unwrap();
        assert!(direct.color_view().is_none());
        direct.release();

        let copy = Attachments::new(&device, format, size, PresentPath::Copy).unwrap();
        let color = copy.color_texture().unwrap();
        assert_eq!((color.width(), color.height()), (64, 32));
        assert!(color.usage().contains(wgpu::TextureUsages::COPY_SRC));
        copy.release();
    }
}
