//! Texture to CPU copies with row padding stripped.

use std::sync::mpsc;

use equiprobe_core::HdrImage;

use crate::{error::RenderError, texture::TextureHelper};

/// Align number to WebGPU's copy row alignment (256 bytes).
pub fn align_bpr(value: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    value.div_ceil(align) * align
}

/// Copies mip 0 of `texture` into tightly packed rows. Blocks until the GPU
/// has finished every earlier submission.
pub fn read_texture_tight(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    bytes_per_pixel: u32,
) -> Result<Vec<u8>, RenderError> {
    let (width, height) = (texture.width(), texture.height());
    if width == 0 || height == 0 {
        return Err(RenderError::Readback("texture has no texels".into()));
    }
    if texture.sample_count() != 1 {
        return Err(RenderError::Readback(format!(
            "cannot read back a texture with {} samples",
            texture.sample_count()
        )));
    }

    let tight_bpr = bytes_per_pixel * width;
    let padded_bpr = align_bpr(tight_bpr);
    let buffer_size = padded_bpr as wgpu::BufferAddress * height as wgpu::BufferAddress;

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Staging"),
        size: buffer_size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Readback Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bpr),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|err| RenderError::Readback(err.to_string()))?;

    receiver
        .recv()
        .map_err(|_| RenderError::Readback("map_async callback was dropped".into()))?
        .map_err(|err| RenderError::Readback(err.to_string()))?;

    let data = slice.get_mapped_range();
    let mut tight = Vec::with_capacity((tight_bpr * height) as usize);
    for row in data.chunks_exact(padded_bpr as usize) {
        tight.extend_from_slice(&row[..tight_bpr as usize]);
    }
    drop(data);
    staging.unmap();

    Ok(tight)
}

/// Reads an `Rgba32Float` texture back as an [`HdrImage`].
pub fn read_rgba32f(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
) -> Result<HdrImage, RenderError> {
    if texture.format() != TextureHelper::TARGET_FORMAT {
        return Err(RenderError::Readback(format!(
            "expected {:?}, found {:?}",
            TextureHelper::TARGET_FORMAT,
            texture.format()
        )));
    }
    let bytes = read_texture_tight(device, queue, texture, 16)?;
    let floats = decode_f32_texels(&bytes);
    Ok(HdrImage::from_rgba_f32(
        texture.width(),
        texture.height(),
        &floats,
    )?)
}

/// Byte buffers carry no f32 alignment, so copy out in native order.
fn decode_f32_texels(bytes: &[u8]) -> Vec<f32> {
    bytemuck::pod_collect_to_vec(bytes)
}
