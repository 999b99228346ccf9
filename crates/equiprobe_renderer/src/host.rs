use glam::UVec2;

use crate::{error::RenderError, readback};

/// The drawable a host exposes to the renderer. The per-frame view is
/// borrowed at draw time and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceTarget {
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl SurfaceTarget {
    pub fn new(format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
        }
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }
}

/// A view capable of hosting a GPU drawable and receiving pointer events.
pub trait HostView {
    fn surface_target(&self) -> SurfaceTarget;

    /// Asks the host to schedule another frame.
    fn request_redraw(&self);
}

/// A host without a window: the preview lands in a texture that can be read
/// back. Used for batch runs and tests.
pub struct OffscreenHost {
    target: SurfaceTarget,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl OffscreenHost {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let target = SurfaceTarget::new(Self::FORMAT, width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Host Surface"),
            size: wgpu::Extent3d {
                width: target.width,
                height: target.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            target,
            texture,
            view,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Tightly packed RGBA8 rows of whatever was last drawn.
    pub fn read_pixels(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<u8>, RenderError> {
        readback::read_texture_tight(device, queue, &self.texture, 4)
    }
}

impl HostView for OffscreenHost {
    fn surface_target(&self) -> SurfaceTarget {
        self.target
    }

    fn request_redraw(&self) {}
}
