use equiprobe_core::{HdrImage, ProbeMapping};
use glam::UVec2;
use wgpu::{
    Device, Extent3d, Queue, Texture, TextureDescriptor, TextureDimension, TextureFormat,
    TextureUsages,
};

use crate::{compositor::BakePath, error::RenderError};

pub struct TextureHelper;

impl TextureHelper {
    /// Linear HDR storage for the baked image. Not filterable, so readers use
    /// `textureLoad`.
    pub const TARGET_FORMAT: TextureFormat = TextureFormat::Rgba32Float;
    /// Probe upload format. Full floats keep every radiance the image holds;
    /// the passes filter it by hand.
    pub const PROBE_FORMAT: TextureFormat = TextureFormat::Rgba32Float;

    pub fn create_target_texture(
        device: &Device,
        size: UVec2,
        path: BakePath,
        label: &str,
    ) -> Texture {
        let desc = TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: Self::TARGET_FORMAT,
            usage: path.target_usage() | TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_SRC,
            view_formats: &[],
        };

        device.create_texture(&desc)
    }

    /// Formats a probe may arrive in: anything a `texture_2d<f32>` reads as
    /// linear radiance.
    pub fn is_probe_format(format: TextureFormat) -> bool {
        matches!(
            format,
            TextureFormat::Rgba32Float
                | TextureFormat::Rgba16Float
                | TextureFormat::Rg11b10Ufloat
                | TextureFormat::Rgb9e5Ufloat
        )
    }
}

/// The baked equirect image and the view readers bind.
pub struct EquirectTarget {
    pub texture: Texture,
    pub view: wgpu::TextureView,
    size: UVec2,
}

impl EquirectTarget {
    pub fn new(device: &Device, size: UVec2, path: BakePath) -> Self {
        let texture = TextureHelper::create_target_texture(device, size, path, "Equirect Target");
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size,
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }
}

/// A light probe on the GPU plus the projection it was captured with.
/// Read-only to the renderer.
#[derive(Clone)]
pub struct ProbeTexture {
    texture: Texture,
    view: wgpu::TextureView,
    size: UVec2,
    mapping: ProbeMapping,
}

impl ProbeTexture {
    /// Uploads a CPU image.
    pub fn from_image(
        device: &Device,
        queue: &Queue,
        image: &HdrImage,
        mapping: ProbeMapping,
        label: Option<&str>,
    ) -> Result<Self, RenderError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RenderError::EmptyProbe {
                width: image.width(),
                height: image.height(),
            });
        }
        mapping.validate()?;

        let size = Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&TextureDescriptor {
            label: label.or(Some("Light Probe")),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureHelper::PROBE_FORMAT,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(image.pixels()),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width() * 16),
                rows_per_image: Some(image.height()),
            },
            size,
        );

        log::debug!(
            "Uploaded {}x{} {} probe",
            image.width(),
            image.height(),
            mapping.kind
        );
        Self::from_texture(texture, mapping)
    }

    // --- DEFAULT PROBE (1x1 Black Pixel) ---
    /// Bound by the preview until the host supplies a real probe.
    pub fn placeholder(device: &Device, queue: &Queue) -> Result<Self, RenderError> {
        let image = HdrImage::uniform(1, 1, [0.0, 0.0, 0.0, 1.0]);
        Self::from_image(
            device,
            queue,
            &image,
            ProbeMapping::default(),
            Some("Placeholder Probe"),
        )
    }

    /// Wraps a texture the host already owns.
    pub fn from_texture(texture: Texture, mapping: ProbeMapping) -> Result<Self, RenderError> {
        let size = UVec2::new(texture.width(), texture.height());
        if size.x == 0 || size.y == 0 {
            return Err(RenderError::EmptyProbe {
                width: size.x,
                height: size.y,
            });
        }
        let format = texture.format();
        if !TextureHelper::is_probe_format(format)
            || !texture.usage().contains(TextureUsages::TEXTURE_BINDING)
        {
            return Err(RenderError::UnsupportedProbeFormat(format));
        }
        mapping.validate()?;

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            size,
            mapping,
        })
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn mapping(&self) -> ProbeMapping {
        self.mapping
    }

    /// Retags the probe. Validation happens when the next bake starts.
    pub fn set_mapping(&mut self, mapping: ProbeMapping) {
        self.mapping = mapping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TextureFormat::Rgba32Float, true)]
    #[case(TextureFormat::Rgba16Float, true)]
    #[case(TextureFormat::Rg11b10Ufloat, true)]
    #[case(TextureFormat::Rgb9e5Ufloat, true)]
    #[case(TextureFormat::Rgba8Unorm, false)]
    #[case(TextureFormat::R32Float, false)]
    fn probe_formats(#[case] format: TextureFormat, #[case] accepted: bool) {
        assert_eq!(TextureHelper::is_probe_format(format), accepted);
    }

    #[test]
    fn probe_upload_keeps_full_precision() {
        assert_eq!(TextureHelper::PROBE_FORMAT, TextureFormat::Rgba32Float);
        let image = HdrImage::uniform(1, 1, [1.0e5, 7.0e4, 1.0001, 1.0]);
        let bytes: &[u8] = bytemuck::cast_slice(image.pixels());
        let texels: Vec<f32> = bytemuck::pod_collect_to_vec(bytes);
        assert_eq!(texels, [1.0e5, 7.0e4, 1.0001, 1.0]);
    }
}
