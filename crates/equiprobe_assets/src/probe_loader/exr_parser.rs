use std::path::Path;

use equiprobe_core::HdrImage;
use exr::prelude::read_first_rgba_layer_from_file;

use crate::error::AssetError;

struct HdrBuffer {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 4]>,
}

/// First RGBA layer at full resolution. A missing alpha channel reads as 1.
pub fn parse_exr(path: &Path) -> Result<HdrImage, AssetError> {
    let image = read_first_rgba_layer_from_file(
        path,
        |resolution, _| {
            let width = resolution.width();
            let height = resolution.height();
            HdrBuffer {
                width, // Store width so we can index rows later
                height,
                pixels: vec![[0.0; 4]; width * height],
            }
        },
        |buffer, position, (r, g, b, a): (f32, f32, f32, f32)| {
            buffer.pixels[position.y() * buffer.width + position.x()] = [r, g, b, a];
        },
    )
    .map_err(|err| match err {
        exr::error::Error::Io(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => AssetError::Exr {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })?;

    // Image { layer_data: Layer { channel_data: SpecificChannels { pixels: T } } }
    let buffer = image.layer_data.channel_data.pixels;
    Ok(HdrImage::new(
        buffer.width as u32,
        buffer.height as u32,
        buffer.pixels,
    )?)
}
