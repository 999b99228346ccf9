mod exr_parser;
mod image_parser;

use std::path::Path;

use equiprobe_core::HdrImage;

use crate::error::AssetError;

/// Decoder picked for a probe file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeFileKind {
    OpenExr,
    /// Radiance `.hdr` and every other format the `image` crate reads.
    Image,
}

impl ProbeFileKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("exr") => ProbeFileKind::OpenExr,
            _ => ProbeFileKind::Image,
        }
    }
}

/// Reads a light probe image into linear floating point RGBA.
pub fn load_probe(path: impl AsRef<Path>) -> Result<HdrImage, AssetError> {
    let path = path.as_ref();
    let image = match ProbeFileKind::from_path(path) {
        ProbeFileKind::OpenExr => exr_parser::parse_exr(path)?,
        ProbeFileKind::Image => image_parser::parse_image(path)?,
    };

    if image.is_empty() {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }

    log::info!(
        "Loaded {}x{} probe from {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, codecs::hdr::HdrEncoder};
    use rstest::rstest;

    #[rstest]
    #[case("probe.exr", ProbeFileKind::OpenExr)]
    #[case("probe.EXR", ProbeFileKind::OpenExr)]
    #[case("probe.hdr", ProbeFileKind::Image)]
    #[case("probe.png", ProbeFileKind::Image)]
    #[case("probe", ProbeFileKind::Image)]
    fn decoder_follows_extension(#[case] name: &str, #[case] kind: ProbeFileKind) {
        assert_eq!(ProbeFileKind::from_path(Path::new(name)), kind);
    }

    #[test]
    fn reads_radiance_above_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.hdr");
        let pixels = vec![Rgb([16.0f32, 1.0, 0.5]); 8 * 2];
        let file = std::fs::File::create(&path).unwrap();
        HdrEncoder::new(file).encode(&pixels, 8, 2).unwrap();

        let image = load_probe(&path).unwrap();
        assert_eq!((image.width(), image.height()), (8, 2));
        assert!(image.pixels().iter().all(|p| *p == [16.0, 1.0, 0.5, 1.0]));
    }

    #[test]
    fn reads_openexr_rows_top_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.exr");
        exr::prelude::write_rgba_file(&path, 4, 3, |x, y| {
            (x as f32, y as f32 * 100.0, 0.25f32, 1.0f32)
        })
        .unwrap();

        let image = load_probe(&path).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(image.pixel(0, 0), Some([0.0, 0.0, 0.25, 1.0]));
        assert_eq!(image.pixel(3, 2), Some([3.0, 200.0, 0.25, 1.0]));
    }

    #[test]
    fn eight_bit_images_are_normalised() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 255, 255]))
            .save(&path)
            .unwrap();

        let image = load_probe(&path).unwrap();
        assert_eq!(image.pixel(1, 1), Some([1.0, 0.0, 1.0, 1.0]));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["nope.hdr", "nope.exr"] {
            let err = load_probe(dir.path().join(name)).unwrap_err();
            assert!(matches!(err, AssetError::Io { .. }), "{name}: {err}");
        }
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.hdr");
        std::fs::write(&path, b"definitely not radiance").unwrap();
        let err = load_probe(&path).unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }), "{err}");
    }
}
