use std::path::Path;

use equiprobe_core::HdrImage;

use crate::error::AssetError;

/// Anything the `image` crate can open. Radiance files keep their full range;
/// 8-bit formats land in [0, 1] without linearisation.
pub fn parse_image(path: &Path) -> Result<HdrImage, AssetError> {
    let decoded = image::open(path).map_err(|err| match err {
        image::ImageError::IoError(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => AssetError::Image {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let rgba = decoded.into_rgba32f();
    let (width, height) = rgba.dimensions();
    Ok(HdrImage::from_rgba_f32(width, height, rgba.as_raw())?)
}
